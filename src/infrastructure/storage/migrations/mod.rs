//! Database migrations infrastructure

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// Trait for running database migrations
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Runs all pending migrations
    async fn run(&self) -> Result<(), DomainError>;

    /// Reverts the last applied migration
    async fn revert(&self) -> Result<(), DomainError>;

    /// Returns the current migration version
    async fn version(&self) -> Result<Option<i64>, DomainError>;
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    /// SQL to run when applying; may hold several statements
    pub up: String,
    /// SQL to run when reverting
    pub down: String,
}

impl Migration {
    pub fn new(
        version: i64,
        description: impl Into<String>,
        up: impl Into<String>,
        down: impl Into<String>,
    ) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
            down: down.into(),
        }
    }
}

/// Migrations for the accounts schema, in ascending version order
pub fn account_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create users table",
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(64) PRIMARY KEY,
                name VARCHAR(100) NOT NULL,
                email VARCHAR(255) NOT NULL,
                mobile_no CHAR(10) NOT NULL,
                username VARCHAR(50) NOT NULL,
                password_hash TEXT NOT NULL,
                role VARCHAR(32) NOT NULL,
                department TEXT,
                academic_year TEXT,
                gpa DOUBLE PRECISION CHECK (gpa IS NULL OR (gpa >= 0 AND gpa <= 10)),
                skills TEXT[] NOT NULL DEFAULT '{}',
                interests TEXT[] NOT NULL DEFAULT '{}',
                achievements TEXT[] NOT NULL DEFAULT '{}',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users(email);
            CREATE UNIQUE INDEX IF NOT EXISTS users_mobile_no_key ON users(mobile_no);
            CREATE UNIQUE INDEX IF NOT EXISTS users_username_role_key ON users(username, role);
            "#,
            r#"
            DROP TABLE IF EXISTS users;
            "#,
        ),
        Migration::new(
            2,
            "Index users by role and creation time",
            r#"
            CREATE INDEX IF NOT EXISTS idx_users_role_created_at ON users(role, created_at);
            "#,
            r#"
            DROP INDEX IF EXISTS idx_users_role_created_at;
            "#,
        ),
    ]
}

/// PostgreSQL migrator tracking applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    /// Create a migrator for the accounts schema
    pub fn new(pool: PgPool) -> Self {
        Self::with_migrations(pool, account_migrations())
    }

    pub fn with_migrations(pool: PgPool, mut migrations: Vec<Migration>) -> Self {
        migrations.sort_by_key(|m| m.version);
        Self { pool, migrations }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, DomainError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
            .bind(version)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check migration status: {}", e)))
    }

    /// Applies a single migration unless already recorded
    pub async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        if self.is_applied(migration.version).await? {
            return Ok(false);
        }

        sqlx::raw_sql(&migration.up)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        info!(
            version = migration.version,
            description = %migration.description,
            "Applied migration"
        );

        Ok(true)
    }

    /// Reverts a single migration if it is recorded
    pub async fn revert_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        if !self.is_applied(migration.version).await? {
            return Ok(false);
        }

        sqlx::raw_sql(&migration.down)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to revert migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        info!(version = migration.version, "Reverted migration");

        Ok(true)
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<(), DomainError> {
        self.ensure_migrations_table().await?;

        for migration in &self.migrations {
            self.run_migration(migration).await?;
        }

        Ok(())
    }

    async fn revert(&self) -> Result<(), DomainError> {
        let Some(current) = self.version().await? else {
            info!("No migrations to revert");
            return Ok(());
        };

        let migration = self
            .migrations
            .iter()
            .find(|m| m.version == current)
            .ok_or_else(|| {
                DomainError::internal(format!("Applied migration {} is unknown", current))
            })?;

        self.revert_migration(migration).await?;

        Ok(())
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

/// Runs all pending account migrations
pub async fn run_account_migrations(pool: &PgPool) -> Result<(), DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}
