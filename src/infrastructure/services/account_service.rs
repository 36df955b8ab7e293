//! Usage summary, tier changes and text history for the calling account

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::domain::text::{HumanizedText, Page, PageRequest, TextRepository};
use crate::domain::usage::QuotaGuard;
use crate::domain::{Account, DomainError, Identity, Tier};
use crate::infrastructure::usage::UsageRecorder;

/// Word usage of one account in the current period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageSummary {
    pub tier: Tier,
    pub words_used: u64,
    pub words_limit: u32,
    pub words_remaining: u64,
    pub percentage_used: u64,
    pub resets_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct AccountService {
    recorder: Arc<UsageRecorder>,
    quota: QuotaGuard,
    texts: Arc<dyn TextRepository>,
}

impl AccountService {
    pub fn new(
        recorder: Arc<UsageRecorder>,
        quota: QuotaGuard,
        texts: Arc<dyn TextRepository>,
    ) -> Self {
        Self {
            recorder,
            quota,
            texts,
        }
    }

    pub async fn summary(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<UsageSummary, DomainError> {
        let account = self.resolve(identity).await?;
        let tier = account.tier();
        let limit = tier.config().monthly_word_budget;

        let used = self.quota.used_in_period(account.id(), now).await?;
        let period = self.quota.period(now)?;

        Ok(UsageSummary {
            tier,
            words_used: used,
            words_limit: limit,
            words_remaining: u64::from(limit).saturating_sub(used),
            percentage_used: percentage(used, limit),
            resets_at: period.end,
        })
    }

    /// Change the caller's tier. Unknown values become `free`.
    pub async fn update_tier(
        &self,
        identity: &Identity,
        requested: Option<&str>,
    ) -> Result<Account, DomainError> {
        let tier = Tier::clamp(requested.unwrap_or_default());

        let account = self
            .recorder
            .set_tier(&identity.account_id, identity.email.as_deref(), tier)
            .await?;

        info!(account_id = %account.id(), tier = %tier, "Updated account tier");
        Ok(account)
    }

    pub async fn history(
        &self,
        identity: &Identity,
        page: PageRequest,
    ) -> Result<Page<HumanizedText>, DomainError> {
        let account = self.resolve(identity).await?;
        self.texts.list_for_account(account.id(), page).await
    }

    pub async fn delete_text(&self, identity: &Identity, text_id: Uuid) -> Result<(), DomainError> {
        let account = self.resolve(identity).await?;
        let text = self
            .texts
            .get(text_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Text not found"))?;

        if !text.is_owned_by(account.id()) {
            return Err(DomainError::forbidden("Forbidden"));
        }

        self.texts.delete(text_id).await?;
        info!(account_id = %account.id(), text_id = %text_id, "Deleted text");

        Ok(())
    }

    /// The stored account that owns usage and history for this caller
    async fn resolve(&self, identity: &Identity) -> Result<Account, DomainError> {
        self.recorder
            .ensure_account(&identity.account_id, identity.email.as_deref())
            .await
    }
}

/// `used / limit` as a whole percentage, rounded half up
fn percentage(used: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }

    let limit = u64::from(limit);
    (used.saturating_mul(100) + limit / 2) / limit
}
