//! Scholarship Finder accounts API
//!
//! User accounts for a scholarship-finder application:
//! - Registration with duplicate-identity detection
//! - Role-scoped login with Argon2id password hashing
//! - Profile update, deletion, listing and details lookup
//! - Idempotent bootstrap of the default admin
//! - In-memory or PostgreSQL storage

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::{AccountServiceTrait, AppState};
use config::StorageBackend;
use infrastructure::storage::{connect_pool, run_account_migrations};
use infrastructure::user::{
    Argon2Hasher, BootstrapAdmin, InMemoryUserRepository, PostgresUserRepository,
    UserAccountService,
};
use tracing::info;

/// Create the application state for the configured storage backend
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let account_service = create_account_service(config).await?;
    Ok(AppState::new(account_service))
}

/// Build the account service over the configured repository
pub async fn create_account_service(
    config: &AppConfig,
) -> anyhow::Result<Arc<dyn AccountServiceTrait>> {
    let hasher = Arc::new(Argon2Hasher::from_config(&config.hashing)?);
    let admin = BootstrapAdmin::from(&config.admin);

    info!("Storage backend: {:?}", config.storage.backend);

    let service: Arc<dyn AccountServiceTrait> = match config.storage.backend {
        StorageBackend::Memory => {
            let repository = Arc::new(InMemoryUserRepository::new());
            Arc::new(UserAccountService::new(repository, hasher).with_admin(admin))
        }
        StorageBackend::Postgres => {
            let pool = connect_pool(&config.database).await?;

            if config.database.run_migrations {
                info!("Running pending migrations");
                run_account_migrations(&pool).await?;
            }

            let repository = Arc::new(PostgresUserRepository::new(pool));
            Arc::new(UserAccountService::new(repository, hasher).with_admin(admin))
        }
    };

    Ok(service)
}
