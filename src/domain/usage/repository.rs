//! Usage ledger repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entry::UsageLedgerEntry;
use crate::domain::account::AccountId;
use crate::domain::DomainError;

/// Append-only store of usage entries
#[async_trait]
pub trait UsageLedgerRepository: Send + Sync + Debug {
    /// Insert one immutable entry
    async fn append(&self, entry: UsageLedgerEntry) -> Result<UsageLedgerEntry, DomainError>;

    /// Sum of words recorded for `account_id` at or after `since`
    async fn sum_words_since(
        &self,
        account_id: &AccountId,
        since: DateTime<Utc>,
    ) -> Result<u64, DomainError>;
}
