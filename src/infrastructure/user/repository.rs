//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{
    IdentityField, NewUser, UniqueFieldsQuery, User, UserChanges, UserId, UserRepository,
    UserRole,
};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository
///
/// Enforces the same unique constraints as the PostgreSQL schema so the two
/// backends are interchangeable.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

/// First unique constraint `candidate` would violate among `users`
fn find_violation<'a>(
    users: impl Iterator<Item = &'a User>,
    candidate: &User,
) -> Option<IdentityField> {
    for other in users {
        if other.id() == candidate.id() {
            continue;
        }

        if other.email() == candidate.email() {
            return Some(IdentityField::Email);
        }

        if other.mobile_no() == candidate.mobile_no() {
            return Some(IdentityField::MobileNo);
        }

        if other.username() == candidate.username() && other.role() == candidate.role() {
            return Some(IdentityField::Username);
        }
    }

    None
}

fn sorted_by_creation(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().as_str().cmp(b.id().as_str()))
    });
    users
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_unique_fields(
        &self,
        query: &UniqueFieldsQuery,
    ) -> Result<Option<User>, DomainError> {
        if query.is_empty() {
            return Ok(None);
        }

        let users = self.users.read().await;
        let matches: Vec<User> = users.values().filter(|u| query.matches(u)).cloned().collect();

        Ok(sorted_by_creation(matches).into_iter().next())
    }

    async fn find_by_credentials(
        &self,
        username: &str,
        role: &UserRole,
    ) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;

        Ok(users
            .values()
            .find(|u| u.username() == username && u.role() == role)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(id.as_str()).cloned())
    }

    async fn list(&self, role: Option<UserRole>) -> Result<Vec<User>, DomainError> {
        let users = self.users.read().await;

        let result: Vec<User> = users
            .values()
            .filter(|u| !u.role().is_admin())
            .filter(|u| role.as_ref().is_none_or(|r| u.role() == r))
            .cloned()
            .collect();

        Ok(sorted_by_creation(result))
    }

    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let user = User::new(UserId::generate(), user);

        if let Some(field) = find_violation(users.values(), &user) {
            return Err(DomainError::duplicate_key(field));
        }

        users.insert(user.id().as_str().to_string(), user.clone());

        Ok(user)
    }

    async fn update(&self, id: &UserId, changes: UserChanges) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        let mut updated = users
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        updated.apply(changes);

        if let Some(field) = find_violation(users.values(), &updated) {
            return Err(DomainError::duplicate_key(field));
        }

        users.insert(id.as_str().to_string(), updated.clone());

        Ok(updated)
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let mut users = self.users.write().await;

        match users.remove(id.as_str()) {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(format!("User '{}' not found", id))),
        }
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
