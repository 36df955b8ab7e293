//! Humanized text repository trait

use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

use super::entity::{HumanizedText, Page, PageRequest};
use crate::domain::account::AccountId;
use crate::domain::DomainError;

/// Repository trait for humanized text history
#[async_trait]
pub trait TextRepository: Send + Sync + Debug {
    async fn create(&self, text: HumanizedText) -> Result<HumanizedText, DomainError>;

    async fn get(&self, id: Uuid) -> Result<Option<HumanizedText>, DomainError>;

    /// Newest first
    async fn list_for_account(
        &self,
        account_id: &AccountId,
        page: PageRequest,
    ) -> Result<Page<HumanizedText>, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
