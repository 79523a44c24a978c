use std::fmt;

use thiserror::Error;

use crate::domain::user::IdentityField;

/// Why a login attempt was refused
///
/// Kept for internal classification only; callers outside the service see
/// a single uniform message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No account exists for the username/role pair
    UserNotFound,
    /// The account exists but the password did not verify
    InvalidCredentials,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserNotFound => write!(f, "user not found"),
            Self::InvalidCredentials => write!(f, "invalid credentials"),
        }
    }
}

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid ID format: {message}")]
    InvalidId { message: String },

    #[error("{message}")]
    DuplicateIdentity {
        fields: Vec<IdentityField>,
        message: String,
    },

    /// Raised by repositories when a unique constraint rejects a write
    #[error("Unique constraint violated on {field}")]
    DuplicateKey { field: IdentityField },

    #[error("Authentication failed: {kind}")]
    Authentication { kind: AuthFailure },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_id(message: impl Into<String>) -> Self {
        Self::InvalidId {
            message: message.into(),
        }
    }

    pub fn duplicate_identity(fields: Vec<IdentityField>, message: impl Into<String>) -> Self {
        Self::DuplicateIdentity {
            fields,
            message: message.into(),
        }
    }

    pub fn duplicate_key(field: IdentityField) -> Self {
        Self::DuplicateKey { field }
    }

    pub fn authentication(kind: AuthFailure) -> Self {
        Self::Authentication { kind }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// True for faults the caller cannot correct (backend, config, bugs)
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::Internal { .. } | Self::Storage { .. }
        )
    }
}
