//! In-memory text history repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::account::AccountId;
use crate::domain::text::{HumanizedText, Page, PageRequest, TextRepository};
use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct InMemoryTextRepository {
    texts: RwLock<HashMap<Uuid, HumanizedText>>,
}

impl InMemoryTextRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TextRepository for InMemoryTextRepository {
    async fn create(&self, text: HumanizedText) -> Result<HumanizedText, DomainError> {
        let mut texts = self.texts.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        if texts.contains_key(&text.id()) {
            return Err(DomainError::conflict(format!(
                "Text '{}' already exists",
                text.id()
            )));
        }

        texts.insert(text.id(), text.clone());
        Ok(text)
    }

    async fn get(&self, id: Uuid) -> Result<Option<HumanizedText>, DomainError> {
        let texts = self.texts.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(texts.get(&id).cloned())
    }

    async fn list_for_account(
        &self,
        account_id: &AccountId,
        page: PageRequest,
    ) -> Result<Page<HumanizedText>, DomainError> {
        let texts = self.texts.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut owned: Vec<&HumanizedText> =
            texts.values().filter(|t| t.is_owned_by(account_id)).collect();
        owned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let total = owned.len() as u64;
        let items = owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            page: page.page,
            limit: page.limit,
            total,
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut texts = self.texts.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        Ok(texts.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let repo = InMemoryTextRepository::new();
        let alice = AccountId::new("alice").unwrap();
        let bob = AccountId::new("bob").unwrap();
        let base = Utc::now();

        for i in 0..12 {
            let text = HumanizedText::new(alice.clone(), format!("in {}", i), format!("out {}", i), 2)
                .with_created_at(base + Duration::seconds(i));
            repo.create(text).await.unwrap();
        }
        repo.create(HumanizedText::new(bob.clone(), "x", "y", 1))
            .await
            .unwrap();

        let first = repo
            .list_for_account(&alice, PageRequest::new(Some(1), Some(5)))
            .await
            .unwrap();
        assert_eq!(first.total, 12);
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.items[0].original_text(), "in 11");
        assert_eq!(first.total_pages(), 3);

        let last = repo
            .list_for_account(&alice, PageRequest::new(Some(3), Some(5)))
            .await
            .unwrap();
        assert_eq!(last.items.len(), 2);
        assert_eq!(last.items[1].original_text(), "in 0");

        let beyond = repo
            .list_for_account(&alice, PageRequest::new(Some(9), Some(5)))
            .await
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 12);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let repo = InMemoryTextRepository::new();
        let text = repo
            .create(HumanizedText::new(AccountId::new("alice").unwrap(), "a", "b", 1))
            .await
            .unwrap();

        assert!(repo.get(text.id()).await.unwrap().is_some());
        assert!(repo.delete(text.id()).await.unwrap());
        assert!(!repo.delete(text.id()).await.unwrap());
        assert!(repo.get(text.id()).await.unwrap().is_none());
    }
}
