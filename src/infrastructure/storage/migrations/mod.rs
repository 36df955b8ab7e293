//! Database schema migrations

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

/// PostgreSQL migrator tracking applied versions in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
    migrations: Vec<Migration>,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            migrations: schema_migrations(),
        }
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
        self.ensure_migrations_table().await?;

        if self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin migration: {}", e)))?;

        for statement in Migration::statements(&migration.up) {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::storage(format!(
                        "Failed to run migration {}: {}",
                        migration.version, e
                    ))
                })?;
        }

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit migration: {}", e)))?;

        info!(version = migration.version, description = %migration.description, "Applied migration");
        Ok(true)
    }

    /// Reverts a single migration if it was recorded
    pub async fn revert_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        self.ensure_migrations_table().await?;

        if !self.is_applied(migration.version).await? {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin revert: {}", e)))?;

        for statement in Migration::statements(&migration.down) {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::storage(format!(
                        "Failed to revert migration {}: {}",
                        migration.version, e
                    ))
                })?;
        }

        sqlx::query("DELETE FROM _migrations WHERE version = $1")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to remove migration record {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit revert: {}", e)))?;

        info!(version = migration.version, "Reverted migration");
        Ok(true)
    }
}

#[async_trait]
impl Migrator for PostgresMigrator {
    async fn run(&self) -> Result<(), DomainError> {
        for migration in &self.migrations {
            self.run_migration(migration).await?;
        }

        Ok(())
    }

    async fn revert(&self) -> Result<(), DomainError> {
        let Some(version) = self.version().await? else {
            return Ok(());
        };

        match self.migrations.iter().find(|m| m.version == version) {
            Some(migration) => {
                self.revert_migration(migration).await?;
                Ok(())
            }
            None => Err(DomainError::storage(format!(
                "Applied migration {} is unknown to this build",
                version
            ))),
        }
    }

    async fn version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }
}

/// Represents a database migration
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    /// SQL to run when applying the migration
    pub up: String,
    /// SQL to run when reverting the migration
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

    /// Single statements of a script, since prepared queries take one at a time.
    /// Scripts must not carry `;` inside literals.
    pub fn statements(script: &str) -> Vec<&str> {
        script
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Schema for accounts, the usage ledger and text history
pub fn schema_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Create accounts table",
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id VARCHAR(255) PRIMARY KEY,
                email VARCHAR(320) NOT NULL,
                tier VARCHAR(32) NOT NULL DEFAULT 'free',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_email ON accounts(email);
            "#,
            r#"
            DROP TABLE IF EXISTS accounts;
            "#,
        ),
        Migration::new(
            2,
            "Create usage ledger table",
            r#"
            CREATE TABLE IF NOT EXISTS usage_ledger (
                id UUID PRIMARY KEY,
                account_id VARCHAR(255) NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                words_processed BIGINT NOT NULL CHECK (words_processed > 0),
                cost_micros BIGINT NOT NULL CHECK (cost_micros >= 0),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_usage_ledger_account_created
                ON usage_ledger(account_id, created_at);
            "#,
            r#"
            DROP TABLE IF EXISTS usage_ledger;
            "#,
        ),
        Migration::new(
            3,
            "Create humanized texts table",
            r#"
            CREATE TABLE IF NOT EXISTS humanized_texts (
                id UUID PRIMARY KEY,
                account_id VARCHAR(255) NOT NULL REFERENCES accounts(id) ON DELETE CASCADE,
                original_text TEXT NOT NULL,
                humanized_text TEXT NOT NULL,
                word_count BIGINT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            );
            CREATE INDEX IF NOT EXISTS idx_humanized_texts_account_created
                ON humanized_texts(account_id, created_at DESC);
            "#,
            r#"
            DROP TABLE IF EXISTS humanized_texts;
            "#,
        ),
    ]
}

/// Runs all pending schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), DomainError> {
    PostgresMigrator::new(pool.clone()).run().await
}
