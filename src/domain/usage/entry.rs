//! Usage ledger entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::AccountId;
use crate::domain::DomainError;

/// Immutable record of words consumed and their cost
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageLedgerEntry {
    id: Uuid,
    account_id: AccountId,
    words_processed: u32,
    /// Cost in USD (micro-dollars, rounded to 4 decimal places)
    cost_micros: i64,
    created_at: DateTime<Utc>,
}

impl UsageLedgerEntry {
    pub fn new(account_id: AccountId, words_processed: u32, cost_micros: i64) -> Result<Self, DomainError> {
        Self::recorded_at(account_id, words_processed, cost_micros, Utc::now())
    }

    pub fn recorded_at(
        account_id: AccountId,
        words_processed: u32,
        cost_micros: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if words_processed == 0 {
            return Err(DomainError::validation(
                "Usage entry must record at least one word",
            ));
        }

        if cost_micros < 0 {
            return Err(DomainError::validation("Usage cost cannot be negative"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            words_processed,
            cost_micros,
            created_at,
        })
    }

    /// Rebuild an entry from persisted values
    pub fn restore(
        id: Uuid,
        account_id: AccountId,
        words_processed: u32,
        cost_micros: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            words_processed,
            cost_micros,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn words_processed(&self) -> u32 {
        self.words_processed
    }

    pub fn cost_micros(&self) -> i64 {
        self.cost_micros
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
