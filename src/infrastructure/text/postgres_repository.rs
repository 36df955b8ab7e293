//! PostgreSQL text history implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::account::AccountId;
use crate::domain::text::{HumanizedText, Page, PageRequest, TextRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of TextRepository
#[derive(Debug, Clone)]
pub struct PostgresTextRepository {
    pool: PgPool,
}

impl PostgresTextRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_text(row: &sqlx::postgres::PgRow) -> Result<HumanizedText, DomainError> {
        let account_id: String = row.get("account_id");
        let word_count: i64 = row.get("word_count");
        let created_at: DateTime<Utc> = row.get("created_at");

        Ok(HumanizedText::restore(
            row.get("id"),
            AccountId::new(account_id)?,
            row.get("original_text"),
            row.get("humanized_text"),
            u32::try_from(word_count).unwrap_or(u32::MAX),
            created_at,
        ))
    }
}

#[async_trait]
impl TextRepository for PostgresTextRepository {
    async fn create(&self, text: HumanizedText) -> Result<HumanizedText, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO humanized_texts (id, account_id, original_text, humanized_text, word_count, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(text.id())
        .bind(text.account_id().as_str())
        .bind(text.original_text())
        .bind(text.humanized_text())
        .bind(i64::from(text.word_count()))
        .bind(text.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("Text '{}' already exists", text.id()))
            } else {
                DomainError::storage(format!("Failed to save text: {}", e))
            }
        })?;

        Ok(text)
    }

    async fn get(&self, id: Uuid) -> Result<Option<HumanizedText>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, original_text, humanized_text, word_count, created_at
            FROM humanized_texts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get text: {}", e)))?;

        row.as_ref().map(Self::row_to_text).transpose()
    }

    async fn list_for_account(
        &self,
        account_id: &AccountId,
        page: PageRequest,
    ) -> Result<Page<HumanizedText>, DomainError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM humanized_texts WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to count texts: {}", e)))?;

        let rows = sqlx::query(
            r#"
            SELECT id, account_id, original_text, humanized_text, word_count, created_at
            FROM humanized_texts
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id.as_str())
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list texts: {}", e)))?;

        let items = rows
            .iter()
            .map(Self::row_to_text)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            page: page.page,
            limit: page.limit,
            total: total.max(0) as u64,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM humanized_texts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete text: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}
