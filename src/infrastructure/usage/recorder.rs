//! Lazy account creation and post-success usage writes

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::account::{normalize_email, Account, AccountId, AccountRepository};
use crate::domain::resilience::{ResilientInvoker, RetryPolicy};
use crate::domain::text::{HumanizedText, TextRepository};
use crate::domain::tier::Tier;
use crate::domain::usage::{UsageLedgerEntry, UsageLedgerRepository};
use crate::domain::DomainError;

/// Owns every write the request path makes: account provisioning, ledger
/// entries and history records. All writes go through a [`ResilientInvoker`].
#[derive(Debug, Clone)]
pub struct UsageRecorder {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn UsageLedgerRepository>,
    texts: Arc<dyn TextRepository>,
    account_invoker: ResilientInvoker,
    write_invoker: ResilientInvoker,
}

impl UsageRecorder {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<dyn UsageLedgerRepository>,
        texts: Arc<dyn TextRepository>,
    ) -> Self {
        Self {
            accounts,
            ledger,
            texts,
            account_invoker: ResilientInvoker::new(RetryPolicy::account()),
            write_invoker: ResilientInvoker::default(),
        }
    }

    pub fn with_invokers(mut self, account: ResilientInvoker, write: ResilientInvoker) -> Self {
        self.account_invoker = account;
        self.write_invoker = write;
        self
    }

    /// Return the account for `id`, creating it on first sight.
    ///
    /// A stored email that differs from the normalized caller email is repaired.
    /// When no account has this id but one already owns the email, that account
    /// is returned unchanged.
    pub async fn ensure_account(
        &self,
        id: &AccountId,
        email: Option<&str>,
    ) -> Result<Account, DomainError> {
        let email = normalize_email(id, email);

        self.account_invoker
            .invoke("ensure_account", || self.find_or_create(id, &email))
            .await
    }

    /// Set the tier of the caller's account, creating the account if needed
    pub async fn set_tier(
        &self,
        id: &AccountId,
        email: Option<&str>,
        tier: Tier,
    ) -> Result<Account, DomainError> {
        let email = normalize_email(id, email);

        self.account_invoker
            .invoke("set_tier", || self.upsert_tier(id, &email, tier))
            .await
    }

    /// Append one ledger entry. Entries keep their id across retries, so a
    /// retried insert whose first attempt already landed reports a duplicate
    /// of this same entry, which counts as recorded.
    pub async fn append(
        &self,
        account_id: &AccountId,
        words: u32,
        cost_micros: i64,
    ) -> Result<UsageLedgerEntry, DomainError> {
        let entry = UsageLedgerEntry::new(account_id.clone(), words, cost_micros)?;

        let entry = match self
            .write_invoker
            .invoke("usage_append", || self.ledger.append(entry.clone()))
            .await
        {
            Ok(entry) => entry,
            Err(DomainError::Conflict { .. }) => {
                debug!(entry_id = %entry.id(), "Usage entry already recorded by an earlier attempt");
                entry
            }
            Err(e) => return Err(e),
        };

        debug!(
            account_id = %account_id,
            words,
            cost_micros,
            "Appended usage entry"
        );

        Ok(entry)
    }

    /// Persist the original/humanized pair to the caller's history
    pub async fn record_text(
        &self,
        account_id: &AccountId,
        original: &str,
        humanized: &str,
        words: u32,
    ) -> Result<HumanizedText, DomainError> {
        let text = HumanizedText::new(account_id.clone(), original, humanized, words);

        match self
            .write_invoker
            .invoke("record_text", || self.texts.create(text.clone()))
            .await
        {
            Err(DomainError::Conflict { .. }) => {
                debug!(text_id = %text.id(), "Text already recorded by an earlier attempt");
                Ok(text)
            }
            result => result,
        }
    }

    async fn find_or_create(&self, id: &AccountId, email: &str) -> Result<Account, DomainError> {
        if let Some(mut account) = self.accounts.get(id).await? {
            if account.email() == email {
                return Ok(account);
            }

            let stored = account.clone();
            account.set_email(email);

            return match self.accounts.update(&account).await {
                Ok(updated) => {
                    info!(account_id = %id, "Repaired stale account email");
                    Ok(updated)
                }
                Err(DomainError::Conflict { message }) => {
                    warn!(account_id = %id, error = %message, "Email owned by another account, keeping stored email");
                    Ok(stored)
                }
                Err(e) => Err(e),
            };
        }

        if let Some(account) = self.accounts.get_by_email(email).await? {
            debug!(account_id = %id, existing = %account.id(), "Email already registered, reusing account");
            return Ok(account);
        }

        match self.accounts.create(Account::new(id.clone(), email)).await {
            Ok(account) => {
                info!(account_id = %id, tier = %account.tier(), "Created account");
                Ok(account)
            }
            Err(DomainError::Conflict { .. }) => self.reread_after_conflict(id, email).await,
            Err(e) => Err(e),
        }
    }

    async fn upsert_tier(
        &self,
        id: &AccountId,
        email: &str,
        tier: Tier,
    ) -> Result<Account, DomainError> {
        let existing = match self.accounts.get(id).await? {
            Some(account) => account,
            None => match self
                .accounts
                .create(Account::new(id.clone(), email).with_tier(tier))
                .await
            {
                Ok(account) => return Ok(account),
                // Same canonical account that ensure_account resolves to
                Err(DomainError::Conflict { .. }) => {
                    self.reread_after_conflict(id, email).await?
                }
                Err(e) => return Err(e),
            },
        };

        let mut account = existing.clone();
        account.set_email(email);
        account.set_tier(tier);

        match self.accounts.update(&account).await {
            Err(DomainError::Conflict { message }) => {
                warn!(account_id = %id, error = %message, "Email owned by another account, updating tier only");
                let mut account = existing;
                account.set_tier(tier);
                self.accounts.update(&account).await
            }
            result => result,
        }
    }

    /// A concurrent creator won; adopt whatever it stored
    async fn reread_after_conflict(
        &self,
        id: &AccountId,
        email: &str,
    ) -> Result<Account, DomainError> {
        if let Some(account) = self.accounts.get(id).await? {
            return Ok(account);
        }

        if let Some(account) = self.accounts.get_by_email(email).await? {
            return Ok(account);
        }

        Err(DomainError::conflict(format!(
            "Account '{}' conflicted but could not be re-read",
            id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::MockAccountRepository;
    use crate::domain::resilience::FixedJitter;
    use crate::domain::text::MockTextRepository;
    use crate::domain::usage::MockUsageLedgerRepository;
    use crate::infrastructure::account::InMemoryAccountRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Barrier;

    fn fast(policy: RetryPolicy) -> ResilientInvoker {
        ResilientInvoker::new(policy).with_jitter_source(Arc::new(FixedJitter(0.0)))
    }

    fn recorder(
        accounts: Arc<dyn AccountRepository>,
        ledger: Arc<MockUsageLedgerRepository>,
        texts: Arc<MockTextRepository>,
    ) -> UsageRecorder {
        UsageRecorder::new(accounts, ledger, texts)
            .with_invokers(fast(RetryPolicy::account()), fast(RetryPolicy::default()))
    }

    fn id(value: &str) -> AccountId {
        AccountId::new(value).unwrap()
    }

    /// Holds the first two email lookups until both callers reach them
    #[derive(Debug)]
    struct RacingRepository {
        inner: InMemoryAccountRepository,
        barrier: Barrier,
        lookups: AtomicU32,
    }

    #[async_trait]
    impl AccountRepository for RacingRepository {
        async fn get(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
            self.inner.get(id).await
        }

        async fn get_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
            let result = self.inner.get_by_email(email).await;
            if self.lookups.fetch_add(1, Ordering::SeqCst) < 2 {
                self.barrier.wait().await;
            }
            result
        }

        async fn create(&self, account: Account) -> Result<Account, DomainError> {
            self.inner.create(account).await
        }

        async fn update(&self, account: &Account) -> Result<Account, DomainError> {
            self.inner.update(account).await
        }
    }

    #[tokio::test]
    async fn test_ensure_account_creates_free_account() {
        let accounts = Arc::new(MockAccountRepository::new());
        let recorder = recorder(
            accounts.clone(),
            Arc::new(MockUsageLedgerRepository::new()),
            Arc::new(MockTextRepository::new()),
        );

        let account = recorder
            .ensure_account(&id("user-1"), Some("  Alice@Example.COM "))
            .await
            .unwrap();

        assert_eq!(account.email(), "alice@example.com");
        assert_eq!(account.tier(), Tier::Free);
        assert_eq!(accounts.count().await, 1);
    }

    #[tokio::test]
    async fn test_ensure_account_without_email_uses_placeholder() {
        let recorder = recorder(
            Arc::new(MockAccountRepository::new()),
            Arc::new(MockUsageLedgerRepository::new()),
            Arc::new(MockTextRepository::new()),
        );

        let account = recorder.ensure_account(&id("user-2"), None).await.unwrap();
        assert_eq!(account.email(), "user-2@no-email.local");

        let again = recorder.ensure_account(&id("user-2"), Some("not-an-email")).await.unwrap();
        assert_eq!(again.email(), "user-2@no-email.local");
        assert_eq!(again.created_at(), account.created_at());
    }

    #[tokio::test]
    async fn test_ensure_account_repairs_stale_email() {
        let stored = Account::new(id("user-1"), "old@example.com").with_tier(Tier::Pro);
        let accounts = Arc::new(MockAccountRepository::new().with_account(stored).await);
        let recorder = recorder(
            accounts.clone(),
            Arc::new(MockUsageLedgerRepository::new()),
            Arc::new(MockTextRepository::new()),
        );

        let account = recorder
            .ensure_account(&id("user-1"), Some("new@example.com"))
            .await
            .unwrap();

        assert_eq!(account.email(), "new@example.com");
        assert_eq!(account.tier(), Tier::Pro);
        assert_eq!(accounts.count().await, 1);
    }

    #[tokio::test]
    async fn test_ensure_account_reuses_account_owning_email() {
        let stored = Account::new(id("legacy-id"), "shared@example.com").with_tier(Tier::Basic);
        let accounts = Arc::new(MockAccountRepository::new().with_account(stored).await);
        let recorder = recorder(
            accounts.clone(),
            Arc::new(MockUsageLedgerRepository::new()),
            Arc::new(MockTextRepository::new()),
        );

        let account = recorder
            .ensure_account(&id("new-id"), Some("shared@example.com"))
            .await
            .unwrap();

        assert_eq!(account.id().as_str(), "legacy-id");
        assert_eq!(account.tier(), Tier::Basic);
        assert_eq!(accounts.count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_yield_one_account() {
        let accounts = Arc::new(RacingRepository {
            inner: InMemoryAccountRepository::new(),
            barrier: Barrier::new(2),
            lookups: AtomicU32::new(0),
        });
        let recorder = recorder(
            accounts.clone(),
            Arc::new(MockUsageLedgerRepository::new()),
            Arc::new(MockTextRepository::new()),
        );
        let user = id("user-1");

        let (first, second) = tokio::join!(
            recorder.ensure_account(&user, Some("a@example.com")),
            recorder.ensure_account(&user, Some("a@example.com")),
        );

        let first = first.unwrap();
        let second = second.unwrap();
        assert_eq!(first.id(), second.id());
        assert_eq!(first.created_at(), second.created_at());
        assert_eq!(accounts.inner.count().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_account_retries_transient_failures() {
        let accounts = Arc::new(MockAccountRepository::new());
        accounts.fail_next(2, "Connection terminated unexpectedly").await;
        let recorder = recorder(
            accounts.clone(),
            Arc::new(MockUsageLedgerRepository::new()),
            Arc::new(MockTextRepository::new()),
        );

        let account = recorder.ensure_account(&id("user-1"), None).await.unwrap();

        assert_eq!(account.id().as_str(), "user-1");
        assert_eq!(accounts.count().await, 1);
    }

    #[tokio::test]
    async fn test_ensure_account_fatal_failure_is_not_retried() {
        let accounts = Arc::new(MockAccountRepository::new());
        accounts.fail_next(1, "permission denied for table accounts").await;
        let recorder = recorder(
            accounts.clone(),
            Arc::new(MockUsageLedgerRepository::new()),
            Arc::new(MockTextRepository::new()),
        );

        let result = recorder.ensure_account(&id("user-1"), None).await;

        assert!(matches!(result, Err(DomainError::Storage { .. })));
        assert_eq!(accounts.calls(), 1);
    }

    #[tokio::test]
    async fn test_set_tier_creates_or_updates() {
        let accounts = Arc::new(MockAccountRepository::new());
        let recorder = recorder(
            accounts.clone(),
            Arc::new(MockUsageLedgerRepository::new()),
            Arc::new(MockTextRepository::new()),
        );
        let user = id("user-1");

        let created = recorder.set_tier(&user, None, Tier::Basic).await.unwrap();
        assert_eq!(created.tier(), Tier::Basic);

        let updated = recorder
            .set_tier(&user, Some("a@example.com"), Tier::Pro)
            .await
            .unwrap();
        assert_eq!(updated.tier(), Tier::Pro);
        assert_eq!(updated.email(), "a@example.com");
        assert_eq!(accounts.count().await, 1);
    }

    #[tokio::test]
    async fn test_set_tier_targets_account_owning_email() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        accounts
            .create(Account::new(id("legacy-id"), "shared@example.com"))
            .await
            .unwrap();
        let recorder = recorder(
            accounts.clone(),
            Arc::new(MockUsageLedgerRepository::new()),
            Arc::new(MockTextRepository::new()),
        );

        let account = recorder
            .set_tier(&id("new-id"), Some("shared@example.com"), Tier::Pro)
            .await
            .unwrap();

        assert_eq!(account.id().as_str(), "legacy-id");
        assert_eq!(account.tier(), Tier::Pro);
        assert_eq!(accounts.count().unwrap(), 1);

        let resolved = recorder
            .ensure_account(&id("new-id"), Some("shared@example.com"))
            .await
            .unwrap();
        assert_eq!(resolved.tier(), Tier::Pro);
    }

    #[tokio::test]
    async fn test_append_rejects_zero_words() {
        let ledger = Arc::new(MockUsageLedgerRepository::new());
        let recorder = recorder(
            Arc::new(MockAccountRepository::new()),
            ledger.clone(),
            Arc::new(MockTextRepository::new()),
        );

        let result = recorder.append(&id("user-1"), 0, 0).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(ledger.append_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_retries_transient_failures() {
        let ledger = Arc::new(MockUsageLedgerRepository::new());
        ledger.fail_next(1, "could not serialize access due to concurrent update").await;
        let recorder = recorder(
            Arc::new(MockAccountRepository::new()),
            ledger.clone(),
            Arc::new(MockTextRepository::new()),
        );

        let entry = recorder.append(&id("user-1"), 150, 180_000).await.unwrap();

        assert_eq!(entry.words_processed(), 150);
        assert_eq!(ledger.entries().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_counts_committed_attempt_once() {
        let ledger = Arc::new(MockUsageLedgerRepository::new());
        ledger.lose_next_ack("Connection terminated unexpectedly").await;
        let recorder = recorder(
            Arc::new(MockAccountRepository::new()),
            ledger.clone(),
            Arc::new(MockTextRepository::new()),
        );

        let entry = recorder.append(&id("user-1"), 150, 180_000).await.unwrap();

        let entries = ledger.entries().await;
        assert_eq!(ledger.append_calls(), 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), entry.id());
    }

    #[tokio::test]
    async fn test_record_text() {
        let texts = Arc::new(MockTextRepository::new());
        let recorder = recorder(
            Arc::new(MockAccountRepository::new()),
            Arc::new(MockUsageLedgerRepository::new()),
            texts.clone(),
        );

        let saved = recorder
            .record_text(&id("user-1"), "hello world", "Hello, world.", 2)
            .await
            .unwrap();

        assert_eq!(saved.word_count(), 2);
        assert_eq!(texts.texts().await.len(), 1);
    }
}
