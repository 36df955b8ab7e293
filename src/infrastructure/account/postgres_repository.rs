//! PostgreSQL account repository implementation

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::account::{Account, AccountId, AccountRepository};
use crate::domain::DomainError;

/// PostgreSQL implementation of AccountRepository
#[derive(Debug, Clone)]
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, tier, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get account: {}", e)))?;

        row.map(|row| row_to_account(&row)).transpose()
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, tier, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get account by email: {}", e)))?;

        row.map(|row| row_to_account(&row)).transpose()
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, tier, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account.id().as_str())
        .bind(account.email())
        .bind(account.raw_tier())
        .bind(account.created_at())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("Account '{}' already exists", account.id()))
            } else {
                DomainError::storage(format!("Failed to create account: {}", e))
            }
        })?;

        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2, tier = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(account.id().as_str())
        .bind(account.email())
        .bind(account.raw_tier())
        .bind(account.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("Email '{}' already exists", account.email()))
            } else {
                DomainError::storage(format!("Failed to update account: {}", e))
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            )));
        }

        Ok(account.clone())
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Result<Account, DomainError> {
    let id: String = row.get("id");
    let email: String = row.get("email");
    let tier: String = row.get("tier");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    let id = AccountId::new(id)
        .map_err(|e| DomainError::storage(format!("Invalid account ID in database: {}", e)))?;

    Ok(Account::restore(id, email, tier, created_at, updated_at))
}
