//! User account infrastructure
//!
//! Argon2 password hashing, in-memory and PostgreSQL repositories, and the
//! account service that ties them together.

mod password;
mod postgres_repository;
mod repository;
mod service;

pub use password::{Argon2Hasher, PasswordHasher};
pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{
    BootstrapAdmin, Confirmation, LoginRequest, RegisterRequest, UpdateProfileRequest,
    UserAccountService,
};
