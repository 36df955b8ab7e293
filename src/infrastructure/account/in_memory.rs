//! In-memory account repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::account::{Account, AccountId, AccountRepository};
use crate::domain::DomainError;

/// In-memory account repository.
///
/// Id and email uniqueness are checked under the same write lock as the
/// insert, so racing creators see exactly one winner.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> Result<usize, DomainError> {
        let accounts = self.accounts.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(accounts.len())
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(accounts.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().map_err(|e| {
            DomainError::internal(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(accounts.values().find(|a| a.email() == email).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        if accounts.contains_key(account.id()) {
            return Err(DomainError::conflict(format!(
                "Account with ID '{}' already exists",
                account.id()
            )));
        }

        if accounts.values().any(|a| a.email() == account.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                account.email()
            )));
        }

        accounts.insert(account.id().clone(), account.clone());
        Ok(account)
    }

    async fn update(&self, account: &Account) -> Result<Account, DomainError> {
        let mut accounts = self.accounts.write().map_err(|e| {
            DomainError::internal(format!("Failed to acquire write lock: {}", e))
        })?;

        if !accounts.contains_key(account.id()) {
            return Err(DomainError::not_found(format!(
                "Account '{}' not found",
                account.id()
            )));
        }

        let email_taken = accounts
            .values()
            .any(|a| a.email() == account.email() && a.id() != account.id());

        if email_taken {
            return Err(DomainError::conflict(format!(
                "Email '{}' already exists",
                account.email()
            )));
        }

        accounts.insert(account.id().clone(), account.clone());
        Ok(account.clone())
    }
}
