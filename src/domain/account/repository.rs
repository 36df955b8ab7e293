//! Account repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Account, AccountId};
use crate::domain::DomainError;

/// Repository trait for account storage.
///
/// Implementations must reject a second account with the same id or email
/// with [`DomainError::Conflict`].
#[async_trait]
pub trait AccountRepository: Send + Sync + Debug {
    async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    async fn create(&self, account: Account) -> Result<Account, DomainError>;

    async fn update(&self, account: &Account) -> Result<Account, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock account repository for testing
    #[derive(Debug, Default)]
    pub struct MockAccountRepository {
        accounts: Arc<RwLock<HashMap<String, Account>>>,
        failures: Arc<RwLock<Option<(u32, String)>>>,
        calls: AtomicU32,
    }

    impl MockAccountRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn with_account(self, account: Account) -> Self {
            self.accounts
                .write()
                .await
                .insert(account.id().as_str().to_string(), account);
            self
        }

        /// Fail the next `times` calls with a storage error carrying `message`
        pub async fn fail_next(&self, times: u32, message: impl Into<String>) {
            *self.failures.write().await = Some((times, message.into()));
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        pub async fn count(&self) -> usize {
            self.accounts.read().await.len()
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut failures = self.failures.write().await;

            if let Some((remaining, message)) = failures.as_mut() {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(DomainError::storage(message.clone()));
                }
            }

            Ok(())
        }
    }

    #[async_trait]
    impl AccountRepository for MockAccountRepository {
        async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
            self.check_should_fail().await?;
            Ok(self.accounts.read().await.get(id.as_str()).cloned())
        }

        async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
            self.check_should_fail().await?;
            let accounts = self.accounts.read().await;
            Ok(accounts.values().find(|a| a.email() == email).cloned())
        }

        async fn create(&self, account: Account) -> Result<Account, DomainError> {
            self.check_should_fail().await?;
            let mut accounts = self.accounts.write().await;

            if accounts.contains_key(account.id().as_str())
                || accounts.values().any(|a| a.email() == account.email())
            {
                return Err(DomainError::conflict(format!(
                    "Account '{}' already exists",
                    account.id()
                )));
            }

            accounts.insert(account.id().as_str().to_string(), account.clone());
            Ok(account)
        }

        async fn update(&self, account: &Account) -> Result<Account, DomainError> {
            self.check_should_fail().await?;
            let mut accounts = self.accounts.write().await;

            if !accounts.contains_key(account.id().as_str()) {
                return Err(DomainError::not_found(format!(
                    "Account '{}' not found",
                    account.id()
                )));
            }

            accounts.insert(account.id().as_str().to_string(), account.clone());
            Ok(account.clone())
        }
    }
}
