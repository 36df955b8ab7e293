//! In-memory usage ledger

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::account::AccountId;
use crate::domain::usage::{UsageLedgerEntry, UsageLedgerRepository};
use crate::domain::DomainError;

/// In-memory, append-only usage ledger
#[derive(Debug, Default)]
pub struct InMemoryUsageLedgerRepository {
    entries: RwLock<Vec<UsageLedgerEntry>>,
}

impl InMemoryUsageLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UsageLedgerRepository for InMemoryUsageLedgerRepository {
    async fn append(&self, entry: UsageLedgerEntry) -> Result<UsageLedgerEntry, DomainError> {
        let mut entries = self.entries.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        if entries.iter().any(|e| e.id() == entry.id()) {
            return Err(DomainError::conflict(format!(
                "Usage entry '{}' already exists",
                entry.id()
            )));
        }

        entries.push(entry.clone());
        Ok(entry)
    }

    async fn sum_words_since(
        &self,
        account_id: &AccountId,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(entries
            .iter()
            .filter(|e| e.account_id() == account_id && e.created_at() >= since)
            .map(|e| u64::from(e.words_processed()))
            .sum())
    }
}
