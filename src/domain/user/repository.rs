//! User repository trait

use async_trait::async_trait;

use super::entity::{NewUser, UniqueFieldsQuery, User, UserChanges, UserId, UserRole};
use crate::domain::error::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository for account persistence
///
/// Implementations must enforce uniqueness of email, mobile number and the
/// (username, role) pair, reporting a violated constraint as
/// [`DomainError::DuplicateKey`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Finds the first user matching any supplied identity field
    async fn find_by_unique_fields(
        &self,
        query: &UniqueFieldsQuery,
    ) -> Result<Option<User>, DomainError>;

    /// Finds a user by username within a role (for login)
    async fn find_by_credentials(
        &self,
        username: &str,
        role: &UserRole,
    ) -> Result<Option<User>, DomainError>;

    /// Finds a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Lists non-admin users in creation order, optionally filtered by role
    async fn list(&self, role: Option<UserRole>) -> Result<Vec<User>, DomainError>;

    /// Stores a new user and assigns its ID
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Applies changes to an existing user and returns the stored state
    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, DomainError>;

    /// Deletes a user, failing with NotFound when absent
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;

    /// Cheap round trip proving the store is reachable
    async fn ping(&self) -> Result<(), DomainError>;
}
