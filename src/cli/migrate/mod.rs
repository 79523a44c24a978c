//! Migrate command - applies or reverts the accounts schema

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::{connect_pool, Migrator, PostgresMigrator};

#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Revert the latest applied migration instead of applying
    #[arg(long)]
    pub revert: bool,
}

/// Connect to the configured database and run the migrator
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::prepare()?;

    let pool = connect_pool(&config.database).await?;
    let migrator = PostgresMigrator::new(pool);

    if args.revert {
        migrator.revert().await?;
    } else {
        migrator.run().await?;
    }

    let version = migrator.version().await?;
    info!(version = ?version, "Schema is at version");
    println!(
        "Schema version: {}",
        version.map_or_else(|| "none".to_string(), |v| v.to_string())
    );

    Ok(())
}
