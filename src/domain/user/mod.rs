//! User accounts domain
//!
//! Entities, validation rules and the repository contract for
//! scholarship-finder accounts.

mod entity;
mod repository;
mod validation;

pub use entity::{
    IdentityField, NewUser, PublicUser, UniqueFieldsQuery, User, UserChanges, UserDetails, UserId,
    UserProfile, UserRole,
};
pub use repository::UserRepository;
pub use validation::{
    validate_email, validate_gpa, validate_mobile_no, validate_name, validate_password,
    validate_required, validate_role, validate_user_id, validate_username, UserValidationError,
};

#[cfg(test)]
pub use repository::MockUserRepository;
