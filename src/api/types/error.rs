//! Error envelope returned by every failing endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

const LOGIN_FAILED_MESSAGE: &str = "Invalid username or password";
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Machine-readable failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    ValidationError,
    DuplicateIdentity,
    NotFound,
    AuthenticationFailed,
    JsonParseError,
    InternalError,
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValidationError => write!(f, "validation_error"),
            Self::DuplicateIdentity => write!(f, "duplicate_identity"),
            Self::NotFound => write!(f, "not_found"),
            Self::AuthenticationFailed => write!(f, "authentication_failed"),
            Self::JsonParseError => write!(f, "json_parse_error"),
            Self::InternalError => write!(f, "internal_error"),
        }
    }
}

/// `{ "status": false, "message": ..., "code": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ApiErrorCode>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                status: false,
                message: message.into(),
                code: Some(code),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorCode::ValidationError, message)
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorCode::DuplicateIdentity, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ApiErrorCode::AuthenticationFailed,
            LOGIN_FAILED_MESSAGE,
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorCode::NotFound, message)
    }

    /// Internal server error; the detail never reaches the client
    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorCode::InternalError,
            INTERNAL_ERROR_MESSAGE,
        )
    }

    pub fn message(&self) -> &str {
        &self.response.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        if err.is_server_fault() {
            tracing::error!(error = %err, "Request failed with server error");
            return Self::internal();
        }

        match err {
            DomainError::Validation { message } | DomainError::InvalidId { message } => {
                Self::bad_request(message)
            }
            DomainError::DuplicateIdentity { message, .. } => Self::duplicate(message),
            DomainError::DuplicateKey { field } => {
                Self::duplicate(format!("User already exists with: {}", field))
            }
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Authentication { .. } => Self::unauthorized(),
            DomainError::Configuration { .. }
            | DomainError::Internal { .. }
            | DomainError::Storage { .. } => Self::internal(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.response.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthFailure, IdentityField};

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: ApiError = DomainError::validation("email is required").into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "email is required");
        assert_eq!(err.response.code, Some(ApiErrorCode::ValidationError));
    }

    #[test]
    fn test_duplicate_identity_keeps_message() {
        let err: ApiError = DomainError::duplicate_identity(
            vec![IdentityField::Email],
            "User already exists with: email a@b.co",
        )
        .into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "User already exists with: email a@b.co");
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = DomainError::not_found("User 'x' not found").into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_authentication_failures_are_indistinguishable() {
        let missing: ApiError = DomainError::authentication(AuthFailure::UserNotFound).into();
        let wrong: ApiError = DomainError::authentication(AuthFailure::InvalidCredentials).into();

        assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
        assert_eq!(missing.message(), wrong.message());
        assert_eq!(missing.message(), "Invalid username or password");
    }

    #[test]
    fn test_server_faults_hide_detail() {
        let err: ApiError = DomainError::storage("password authentication failed for db").into();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal server error");
    }

    #[test]
    fn test_status_follows_server_fault_classification() {
        let errors = vec![
            DomainError::configuration("bad params"),
            DomainError::internal("task panicked"),
            DomainError::storage("pool closed"),
            DomainError::validation("gpa out of range"),
            DomainError::invalid_id("too long"),
            DomainError::duplicate_key(IdentityField::Username),
            DomainError::not_found("gone"),
            DomainError::authentication(AuthFailure::UserNotFound),
        ];

        for error in errors {
            let server_fault = error.is_server_fault();
            let api: ApiError = error.into();

            assert_eq!(
                api.status == StatusCode::INTERNAL_SERVER_ERROR,
                server_fault,
                "unexpected status {} for {}",
                api.status,
                api.message()
            );
        }
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::not_found("User 'x' not found");
        let json = serde_json::to_value(&err.response).unwrap();

        assert_eq!(json["status"], false);
        assert_eq!(json["message"], "User 'x' not found");
        assert_eq!(json["code"], "not_found");
    }
}
