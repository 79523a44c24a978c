//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("Name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Invalid email address: '{0}'")]
    InvalidEmail(String),

    #[error("Mobile number must be exactly {0} digits")]
    InvalidMobileNo(usize),

    #[error("Username is too short. Minimum length is {0} characters")]
    UsernameTooShort(usize),

    #[error("Username exceeds maximum length of {0} characters")]
    UsernameTooLong(usize),

    #[error("Username contains invalid character: '{0}'. Only alphanumeric characters, dots, underscores, and hyphens are allowed")]
    InvalidUsernameCharacter(char),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),

    #[error("Role exceeds maximum length of {0} characters")]
    RoleTooLong(usize),

    #[error("Role contains invalid character: '{0}'. Only lowercase letters, digits, underscores, and hyphens are allowed")]
    InvalidRoleCharacter(char),

    #[error("GPA must be between {min} and {max}")]
    GpaOutOfRange { min: f64, max: f64 },
}

const MAX_USER_ID_LENGTH: usize = 64;
const MAX_NAME_LENGTH: usize = 100;
const MOBILE_NO_LENGTH: usize = 10;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 50;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_ROLE_LENGTH: usize = 32;
const MIN_GPA: f64 = 0.0;
const MAX_GPA: f64 = 10.0;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Check that a required text field is present and not blank
pub fn validate_required(field: &'static str, value: &str) -> Result<(), UserValidationError> {
    if value.trim().is_empty() {
        return Err(UserValidationError::MissingField(field));
    }

    Ok(())
}

/// Validate an opaque user ID (non-blank, bounded length)
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.trim().is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    if id.len() > MAX_USER_ID_LENGTH {
        return Err(UserValidationError::IdTooLong(MAX_USER_ID_LENGTH));
    }

    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), UserValidationError> {
    validate_required("name", name)?;

    if name.trim().chars().count() > MAX_NAME_LENGTH {
        return Err(UserValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    validate_required("email", email)?;

    if !EMAIL_PATTERN.is_match(email.trim()) {
        return Err(UserValidationError::InvalidEmail(email.trim().to_string()));
    }

    Ok(())
}

/// Validate a mobile number
///
/// Rules:
/// - Exactly 10 characters
/// - ASCII digits only
pub fn validate_mobile_no(mobile_no: &str) -> Result<(), UserValidationError> {
    validate_required("mobileNo", mobile_no)?;

    let mobile_no = mobile_no.trim();

    if mobile_no.len() != MOBILE_NO_LENGTH || !mobile_no.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UserValidationError::InvalidMobileNo(MOBILE_NO_LENGTH));
    }

    Ok(())
}

/// Validate a username
///
/// Rules:
/// - Minimum 3 characters
/// - Maximum 50 characters
/// - Only alphanumeric characters, dots, underscores, and hyphens
pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
    validate_required("username", username)?;

    let username = username.trim();

    if username.len() < MIN_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooShort(MIN_USERNAME_LENGTH));
    }

    if username.len() > MAX_USERNAME_LENGTH {
        return Err(UserValidationError::UsernameTooLong(MAX_USERNAME_LENGTH));
    }

    for c in username.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' && c != '-' && c != '.' {
            return Err(UserValidationError::InvalidUsernameCharacter(c));
        }
    }

    Ok(())
}

/// Validate a plaintext password before hashing
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::MissingField("password"));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Validate a role name (already trimmed and lowercased)
pub fn validate_role(role: &str) -> Result<(), UserValidationError> {
    if role.is_empty() {
        return Err(UserValidationError::MissingField("role"));
    }

    if role.len() > MAX_ROLE_LENGTH {
        return Err(UserValidationError::RoleTooLong(MAX_ROLE_LENGTH));
    }

    for c in role.chars() {
        if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '_' && c != '-' {
            return Err(UserValidationError::InvalidRoleCharacter(c));
        }
    }

    Ok(())
}

/// Validate a grade point average
pub fn validate_gpa(gpa: f64) -> Result<(), UserValidationError> {
    if !(MIN_GPA..=MAX_GPA).contains(&gpa) {
        return Err(UserValidationError::GpaOutOfRange {
            min: MIN_GPA,
            max: MAX_GPA,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field() {
        assert!(validate_required("name", "Alice").is_ok());
        assert_eq!(
            validate_required("name", "   "),
            Err(UserValidationError::MissingField("name"))
        );
        assert_eq!(
            UserValidationError::MissingField("name").to_string(),
            "name is required"
        );
    }

    #[test]
    fn test_user_id() {
        assert!(validate_user_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert_eq!(validate_user_id(" "), Err(UserValidationError::EmptyId));
        assert_eq!(
            validate_user_id(&"a".repeat(65)),
            Err(UserValidationError::IdTooLong(64))
        );
    }

    #[test]
    fn test_name() {
        assert!(validate_name("Alice Example").is_ok());
        assert_eq!(
            validate_name(""),
            Err(UserValidationError::MissingField("name"))
        );
        assert_eq!(
            validate_name(&"x".repeat(101)),
            Err(UserValidationError::NameTooLong(100))
        );
    }

    #[test]
    fn test_valid_emails() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+c@uni.ac.in").is_ok());
    }

    #[test]
    fn test_invalid_emails() {
        assert!(matches!(
            validate_email("alice"),
            Err(UserValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("alice@example"),
            Err(UserValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("al ice@example.com"),
            Err(UserValidationError::InvalidEmail(_))
        ));
        assert_eq!(
            validate_email(""),
            Err(UserValidationError::MissingField("email"))
        );
    }

    #[test]
    fn test_mobile_no() {
        assert!(validate_mobile_no("9876543210").is_ok());
        assert_eq!(
            validate_mobile_no("98765"),
            Err(UserValidationError::InvalidMobileNo(10))
        );
        assert_eq!(
            validate_mobile_no("98765432ab"),
            Err(UserValidationError::InvalidMobileNo(10))
        );
        assert_eq!(
            validate_mobile_no("98765432100"),
            Err(UserValidationError::InvalidMobileNo(10))
        );
    }

    #[test]
    fn test_valid_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("alice_b").is_ok());
        assert!(validate_username("alice.b-2").is_ok());
    }

    #[test]
    fn test_invalid_usernames() {
        assert_eq!(
            validate_username("al"),
            Err(UserValidationError::UsernameTooShort(3))
        );
        assert_eq!(
            validate_username(&"a".repeat(51)),
            Err(UserValidationError::UsernameTooLong(50))
        );
        assert_eq!(
            validate_username("alice@home"),
            Err(UserValidationError::InvalidUsernameCharacter('@'))
        );
    }

    #[test]
    fn test_password() {
        assert!(validate_password("new").is_ok());
        assert_eq!(
            validate_password(""),
            Err(UserValidationError::MissingField("password"))
        );
        assert_eq!(
            validate_password(&"p".repeat(129)),
            Err(UserValidationError::PasswordTooLong(128))
        );
    }

    #[test]
    fn test_role() {
        assert!(validate_role("user").is_ok());
        assert!(validate_role("post-graduate").is_ok());
        assert_eq!(
            validate_role(""),
            Err(UserValidationError::MissingField("role"))
        );
        assert_eq!(
            validate_role("Admin"),
            Err(UserValidationError::InvalidRoleCharacter('A'))
        );
        assert_eq!(
            validate_role(&"r".repeat(33)),
            Err(UserValidationError::RoleTooLong(32))
        );
    }

    #[test]
    fn test_gpa() {
        assert!(validate_gpa(0.0).is_ok());
        assert!(validate_gpa(8.7).is_ok());
        assert!(validate_gpa(10.0).is_ok());
        assert!(validate_gpa(-0.1).is_err());
        assert!(validate_gpa(10.5).is_err());
    }
}
