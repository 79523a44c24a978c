//! CLI module for the scholarship accounts service
//!
//! - `serve`: run the HTTP API
//! - `migrate`: apply or revert PostgreSQL migrations
//! - `bootstrap-admin`: create the default admin account once

pub mod admin;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Scholarship Finder accounts API
#[derive(Parser)]
#[command(name = "scholarship-accounts")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Apply pending PostgreSQL migrations
    Migrate(migrate::MigrateArgs),

    /// Create the default admin account
    BootstrapAdmin,
}

/// Load `.env` and configuration, then install logging
pub(crate) fn prepare() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
