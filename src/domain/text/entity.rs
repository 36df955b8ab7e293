//! Humanized text history entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::AccountId;

/// An original/humanized text pair owned by one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanizedText {
    id: Uuid,
    account_id: AccountId,
    original_text: String,
    humanized_text: String,
    word_count: u32,
    created_at: DateTime<Utc>,
}

impl HumanizedText {
    pub fn new(
        account_id: AccountId,
        original_text: impl Into<String>,
        humanized_text: impl Into<String>,
        word_count: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            original_text: original_text.into(),
            humanized_text: humanized_text.into(),
            word_count,
            created_at: Utc::now(),
        }
    }

    /// Rebuild a record from persisted values
    pub fn restore(
        id: Uuid,
        account_id: AccountId,
        original_text: String,
        humanized_text: String,
        word_count: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            account_id,
            original_text,
            humanized_text,
            word_count,
            created_at,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn humanized_text(&self) -> &str {
        &self.humanized_text
    }

    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_owned_by(&self, account_id: &AccountId) -> bool {
        &self.account_id == account_id
    }
}

/// Page request for history listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 10;
    pub const MAX_LIMIT: u32 = 50;

    /// Page is at least 1; limit is kept within `1..=MAX_LIMIT`
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results with pagination info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.max(1)))
    }
}
