//! PostgreSQL usage ledger implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::account::AccountId;
use crate::domain::usage::{UsageLedgerEntry, UsageLedgerRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of UsageLedgerRepository
#[derive(Debug, Clone)]
pub struct PostgresUsageLedgerRepository {
    pool: PgPool,
}

impl PostgresUsageLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageLedgerRepository for PostgresUsageLedgerRepository {
    async fn append(&self, entry: UsageLedgerEntry) -> Result<UsageLedgerEntry, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO usage_ledger (id, account_id, words_processed, cost_micros, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id())
        .bind(entry.account_id().as_str())
        .bind(i64::from(entry.words_processed()))
        .bind(entry.cost_micros())
        .bind(entry.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("Usage entry '{}' already exists", entry.id()))
            } else {
                DomainError::storage(format!("Failed to append usage: {}", e))
            }
        })?;

        Ok(entry)
    }

    async fn sum_words_since(
        &self,
        account_id: &AccountId,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(words_processed), 0)::BIGINT
            FROM usage_ledger
            WHERE account_id = $1 AND created_at >= $2
            "#,
        )
        .bind(account_id.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to aggregate usage: {}", e)))?;

        Ok(total.max(0) as u64)
    }
}
