//! Domain layer - account entities, rules and repository contracts

pub mod error;
pub mod user;

pub use error::{AuthFailure, DomainError};
pub use user::{
    IdentityField, NewUser, PublicUser, UniqueFieldsQuery, User, UserChanges, UserDetails, UserId,
    UserProfile, UserRepository, UserRole, UserValidationError,
};
