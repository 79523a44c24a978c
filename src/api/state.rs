//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::{PublicUser, UserDetails, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::user::{
    Confirmation, LoginRequest, PasswordHasher, RegisterRequest, UpdateProfileRequest,
    UserAccountService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountServiceTrait>,
}

impl AppState {
    pub fn new(account_service: Arc<dyn AccountServiceTrait>) -> Self {
        Self { account_service }
    }
}

/// Trait for account service operations
#[async_trait::async_trait]
pub trait AccountServiceTrait: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<PublicUser, DomainError>;
    async fn login(&self, request: LoginRequest) -> Result<PublicUser, DomainError>;
    async fn update_profile(
        &self,
        id: &str,
        request: UpdateProfileRequest,
    ) -> Result<PublicUser, DomainError>;
    async fn delete_profile(&self, id: &str) -> Result<Confirmation, DomainError>;
    async fn list_users(&self, role: Option<&str>) -> Result<Vec<PublicUser>, DomainError>;
    async fn get_user_details(&self, id: &str) -> Result<UserDetails, DomainError>;
    async fn bootstrap_admin(&self) -> Result<PublicUser, DomainError>;
    async fn check_store(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R, H> AccountServiceTrait for UserAccountService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(&self, request: RegisterRequest) -> Result<PublicUser, DomainError> {
        UserAccountService::register(self, request).await
    }

    async fn login(&self, request: LoginRequest) -> Result<PublicUser, DomainError> {
        UserAccountService::login(self, request).await
    }

    async fn update_profile(
        &self,
        id: &str,
        request: UpdateProfileRequest,
    ) -> Result<PublicUser, DomainError> {
        UserAccountService::update_profile(self, id, request).await
    }

    async fn delete_profile(&self, id: &str) -> Result<Confirmation, DomainError> {
        UserAccountService::delete_profile(self, id).await
    }

    async fn list_users(&self, role: Option<&str>) -> Result<Vec<PublicUser>, DomainError> {
        UserAccountService::list_users(self, role).await
    }

    async fn get_user_details(&self, id: &str) -> Result<UserDetails, DomainError> {
        UserAccountService::get_user_details(self, id).await
    }

    async fn bootstrap_admin(&self) -> Result<PublicUser, DomainError> {
        UserAccountService::bootstrap_admin(self).await
    }

    async fn check_store(&self) -> Result<(), DomainError> {
        UserAccountService::check_store(self).await
    }
}
