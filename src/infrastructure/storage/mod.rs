//! Storage infrastructure - PostgreSQL pooling and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{run_account_migrations, Migration, Migrator, PostgresMigrator};
pub use postgres::connect_pool;
