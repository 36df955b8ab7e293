//! Read-time enforcement of per-request and monthly word budgets

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;
use tracing::debug;

use super::period::Period;
use super::repository::UsageLedgerRepository;
use crate::domain::account::AccountId;
use crate::domain::resilience::{ResilientInvoker, RetryPolicy};
use crate::domain::tier::Tier;
use crate::domain::DomainError;

/// Which budget a rejected request would break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotaRejection {
    PerRequestExceeded,
    MonthlyExceeded,
}

impl QuotaRejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::PerRequestExceeded => "PER_REQUEST_EXCEEDED",
            Self::MonthlyExceeded => "MONTHLY_EXCEEDED",
        }
    }
}

/// Admission decision for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    Admit { used: u64, remaining_after: u64 },
    Reject { kind: QuotaRejection, limit: u32 },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit { .. })
    }
}

/// Checks a request against its tier's budgets without writing anything.
///
/// The check and the later ledger write are not atomic: concurrent requests
/// from one account can each be admitted against the same usage snapshot.
#[derive(Debug, Clone)]
pub struct QuotaGuard {
    ledger: Arc<dyn UsageLedgerRepository>,
    invoker: ResilientInvoker,
    zone: FixedOffset,
}

impl QuotaGuard {
    pub fn new(ledger: Arc<dyn UsageLedgerRepository>) -> Self {
        Self {
            ledger,
            invoker: ResilientInvoker::new(RetryPolicy::aggregate()),
            zone: Utc.fix(),
        }
    }

    /// Reference zone for month boundaries
    pub fn with_zone(mut self, zone: FixedOffset) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_invoker(mut self, invoker: ResilientInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub fn period(&self, now: DateTime<Utc>) -> Result<Period, DomainError> {
        Period::containing(now, self.zone)
    }

    /// Words recorded for the account in the period containing `now`
    pub async fn used_in_period(
        &self,
        account_id: &AccountId,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let period = self.period(now)?;

        self.invoker
            .invoke("usage_aggregate", || {
                self.ledger.sum_words_since(account_id, period.start)
            })
            .await
    }

    pub async fn check_and_admit(
        &self,
        account_id: &AccountId,
        tier: Tier,
        request_words: u32,
        now: DateTime<Utc>,
    ) -> Result<Admission, DomainError> {
        let config = tier.config();

        if request_words > config.per_request_word_budget {
            return Ok(Admission::Reject {
                kind: QuotaRejection::PerRequestExceeded,
                limit: config.per_request_word_budget,
            });
        }

        let used = self.used_in_period(account_id, now).await?;
        let monthly = u64::from(config.monthly_word_budget);
        let after = used + u64::from(request_words);

        debug!(
            account_id = %account_id,
            tier = %tier,
            used,
            request_words,
            monthly_budget = monthly,
            "Checked monthly usage"
        );

        if after > monthly {
            return Ok(Admission::Reject {
                kind: QuotaRejection::MonthlyExceeded,
                limit: config.monthly_word_budget,
            });
        }

        Ok(Admission::Admit {
            used,
            remaining_after: monthly - after,
        })
    }
}
