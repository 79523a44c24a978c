//! PostgreSQL connection pooling

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// Open a connection pool from the database configuration
///
/// The pool is owned by the repository that receives it; connections are
/// acquired per query and returned on every path.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let url = config.resolve_url().ok_or_else(|| {
        DomainError::configuration("database.url (or DATABASE_URL) is required for postgres storage")
    })?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&url)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

    info!(
        max_connections = config.max_connections,
        "Connected to PostgreSQL"
    );

    Ok(pool)
}
