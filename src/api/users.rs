//! User account endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{PublicUser, UserDetails, UserProfile};
use crate::domain::DomainError;
use crate::infrastructure::user::{RegisterRequest, UpdateProfileRequest};

pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(list_users).post(register).delete(delete_without_id),
        )
        .route(
            "/users/{id}",
            get(get_user_details)
                .patch(update_profile)
                .delete(delete_profile),
        )
        .route("/users/details/{id}", get(get_user_details))
        .route("/user/admin", get(bootstrap_admin))
}

/// Accept `mobileNo` as either a JSON string or a JSON number
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_number(deserializer).map(Some)
}

/// Registration body; missing fields are reported by the service
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterApiRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub mobile_no: String,
    #[serde(default, alias = "userName")]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

impl From<RegisterApiRequest> for RegisterRequest {
    fn from(request: RegisterApiRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            mobile_no: request.mobile_no,
            username: request.username,
            password: request.password,
            role: request.role,
            profile: request.profile,
        }
    }
}

/// Partial update body
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileApiRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub mobile_no: Option<String>,
    #[serde(alias = "userName")]
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub academic_year: Option<String>,
    pub gpa: Option<f64>,
    pub skills: Option<Vec<String>>,
    pub interests: Option<Vec<String>>,
    pub achievements: Option<Vec<String>>,
}

impl From<UpdateProfileApiRequest> for UpdateProfileRequest {
    fn from(request: UpdateProfileApiRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            mobile_no: request.mobile_no,
            username: request.username,
            password: request.password,
            role: request.role,
            department: request.department,
            academic_year: request.academic_year,
            gpa: request.gpa,
            skills: request.skills,
            interests: request.interests,
            achievements: request.achievements,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}

/// `{ "status": true, "user": ..., "message": ... }`
#[derive(Debug, Serialize)]
pub struct UserEnvelope<T> {
    pub status: bool,
    pub user: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> UserEnvelope<T> {
    pub fn new(user: T) -> Self {
        Self {
            status: true,
            user,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// `{ "status": true, "message": ... }`
#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub status: bool,
    pub message: String,
}

/// GET /api/users?role=
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    debug!(role = ?query.role, "Listing users");

    let users = state
        .account_service
        .list_users(query.role.as_deref())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(users))
}

/// POST /api/users
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterApiRequest>,
) -> Result<(StatusCode, Json<UserEnvelope<PublicUser>>), ApiError> {
    debug!(username = %request.username, role = %request.role, "Registering user");

    let user = state
        .account_service
        .register(request.into())
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope::new(user).with_message("User created successfully")),
    ))
}

/// GET /api/users/{id} and GET /api/users/details/{id}
pub async fn get_user_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserEnvelope<UserDetails>>, ApiError> {
    debug!(user_id = %id, "Getting user details");

    let details = state
        .account_service
        .get_user_details(&id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(UserEnvelope::new(details)))
}

/// PATCH /api/users/{id}
///
/// A missing record answers 400 here rather than 404.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProfileApiRequest>,
) -> Result<Json<UserEnvelope<PublicUser>>, ApiError> {
    debug!(user_id = %id, "Updating user profile");

    let user = state
        .account_service
        .update_profile(&id, request.into())
        .await
        .map_err(|e| match e {
            DomainError::NotFound { message } => ApiError::bad_request(message),
            other => ApiError::from(other),
        })?;

    Ok(Json(
        UserEnvelope::new(user).with_message("User updated successfully"),
    ))
}

/// DELETE /api/users/{id}
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageEnvelope>, ApiError> {
    debug!(user_id = %id, "Deleting user");

    let confirmation = state
        .account_service
        .delete_profile(&id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(MessageEnvelope {
        status: true,
        message: confirmation.message,
    }))
}

/// DELETE /api/users
pub async fn delete_without_id() -> ApiError {
    ApiError::bad_request("User id is required")
}

/// GET /api/user/admin
pub async fn bootstrap_admin(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<UserEnvelope<PublicUser>>), ApiError> {
    debug!("Bootstrapping admin account");

    let admin = state
        .account_service
        .bootstrap_admin()
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope::new(admin).with_message("Admin created successfully")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_accepts_numeric_mobile_and_alias() {
        let request: RegisterApiRequest = serde_json::from_str(
            r#"{
                "name": "Alice",
                "email": "alice@example.com",
                "mobileNo": 9876543210,
                "userName": "alice",
                "password": "correct-pw",
                "role": "user",
                "department": "Physics",
                "skills": ["rust"]
            }"#,
        )
        .unwrap();

        assert_eq!(request.mobile_no, "9876543210");
        assert_eq!(request.username, "alice");
        assert_eq!(request.profile.department.as_deref(), Some("Physics"));
        assert_eq!(request.profile.skills, vec!["rust".to_string()]);
    }

    #[test]
    fn test_register_request_missing_fields_default_empty() {
        let request: RegisterApiRequest =
            serde_json::from_str(r#"{"name": "Alice", "mobileNo": "9876543210"}"#).unwrap();

        assert_eq!(request.mobile_no, "9876543210");
        assert!(request.email.is_empty());
        assert!(request.profile.gpa.is_none());
    }

    #[test]
    fn test_update_request_partial() {
        let request: UpdateProfileApiRequest =
            serde_json::from_str(r#"{"password": "new", "mobileNo": 1112223334}"#).unwrap();

        assert_eq!(request.password.as_deref(), Some("new"));
        assert_eq!(request.mobile_no.as_deref(), Some("1112223334"));
        assert!(request.name.is_none());
        assert!(request.gpa.is_none());
    }

    #[test]
    fn test_user_envelope_serialization() {
        let envelope = UserEnvelope::new("payload").with_message("done");
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["status"], true);
        assert_eq!(json["user"], "payload");
        assert_eq!(json["message"], "done");

        let bare = serde_json::to_value(UserEnvelope::new(1)).unwrap();
        assert!(bare.get("message").is_none());
    }
}
