//! Bootstrap-admin command - creates the default admin account once

use anyhow::bail;
use tracing::info;

use crate::config::{AppConfig, StorageBackend};

/// Create the configured admin account and print its id
pub async fn run() -> anyhow::Result<()> {
    let config = super::prepare()?;
    ensure_persistent_store(&config)?;

    let state = crate::create_app_state_with_config(&config).await?;
    let admin = state.account_service.bootstrap_admin().await?;

    info!(user_id = %admin.id, username = %admin.username, "Admin account created");
    println!("{}", admin.id);

    Ok(())
}

/// The in-memory store dies with this process, so an admin created there is lost
pub(crate) fn ensure_persistent_store(config: &AppConfig) -> anyhow::Result<()> {
    if config.storage.backend == StorageBackend::Memory {
        bail!(
            "bootstrap-admin needs a persistent store; set storage.backend = \"postgres\" \
             (or APP__STORAGE__BACKEND=postgres) and configure database.url"
        );
    }

    Ok(())
}
