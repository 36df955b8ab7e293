//! Request orchestration for humanize calls

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::domain::resilience::{ConcurrencyGate, ResilientInvoker, TimeoutGuard};
use crate::domain::tier::micros_to_usd;
use crate::domain::usage::{Admission, QuotaGuard};
use crate::domain::{word_count, DomainError, GenerationEngine, Identity, Tier};
use crate::infrastructure::observability::{
    record_admission, record_gate_in_use, record_gate_wait, record_generation,
    record_usage_write_failure, GenerationMetricParams,
};
use crate::infrastructure::usage::UsageRecorder;

/// Result of a successful humanize call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HumanizeOutcome {
    pub humanized_text: String,
    pub words: u32,
    pub cost_micros: i64,
    pub tier: Tier,
}

/// Sequences account provisioning, quota admission, the guarded engine call
/// and the usage writes for one request.
#[derive(Debug)]
pub struct HumanizeService {
    recorder: Arc<UsageRecorder>,
    quota: QuotaGuard,
    gate: Arc<ConcurrencyGate>,
    engine: Arc<dyn GenerationEngine>,
    invoker: ResilientInvoker,
    model_override: Option<String>,
}

impl HumanizeService {
    pub fn new(
        recorder: Arc<UsageRecorder>,
        quota: QuotaGuard,
        gate: Arc<ConcurrencyGate>,
        engine: Arc<dyn GenerationEngine>,
    ) -> Self {
        Self {
            recorder,
            quota,
            gate,
            engine,
            invoker: ResilientInvoker::default(),
            model_override: None,
        }
    }

    pub fn with_invoker(mut self, invoker: ResilientInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    /// Use `model` for every tier instead of the tier's own model
    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        self.model_override = model;
        self
    }

    pub fn gate(&self) -> &ConcurrencyGate {
        &self.gate
    }

    pub async fn handle(
        &self,
        identity: Option<&Identity>,
        text: &str,
    ) -> Result<HumanizeOutcome, DomainError> {
        let identity = identity.ok_or_else(|| DomainError::unauthenticated("Unauthorized"))?;

        if text.trim().is_empty() {
            return Err(DomainError::validation("Invalid input text"));
        }

        let account = self
            .recorder
            .ensure_account(&identity.account_id, identity.email.as_deref())
            .await?;
        let tier = account.tier();
        let config = tier.config();
        let words = word_count(text);

        // Rejected requests never take a gate slot
        match self
            .quota
            .check_and_admit(account.id(), tier, words, Utc::now())
            .await?
        {
            Admission::Reject { kind, limit } => {
                record_admission(tier.as_str(), kind.code());
                info!(
                    account_id = %account.id(),
                    tier = %tier,
                    words,
                    limit,
                    code = kind.code(),
                    "Request rejected by quota"
                );
                return Err(DomainError::quota_exceeded(kind, limit, tier.as_str()));
            }
            Admission::Admit {
                used,
                remaining_after,
            } => {
                record_admission(tier.as_str(), "admitted");
                debug!(
                    account_id = %account.id(),
                    words,
                    used,
                    remaining_after,
                    "Request admitted"
                );
            }
        }

        let model = self.model_override.as_deref().unwrap_or(config.model);
        let humanized_text = self.generate(text, model, config.timeout(), words).await?;

        let cost_micros = config.cost_for(words);

        if let Err(e) = self.recorder.append(account.id(), words, cost_micros).await {
            record_usage_write_failure("ledger");
            error!(
                account_id = %account.id(),
                words,
                cost_micros,
                error = %e,
                "Failed to record usage"
            );
        }

        if let Err(e) = self
            .recorder
            .record_text(account.id(), text, &humanized_text, words)
            .await
        {
            record_usage_write_failure("history");
            error!(account_id = %account.id(), error = %e, "Failed to save humanized text");
        }

        info!(
            account_id = %account.id(),
            tier = %tier,
            model,
            words,
            cost_usd = micros_to_usd(cost_micros),
            "Humanized text"
        );

        Ok(HumanizeOutcome {
            humanized_text,
            words,
            cost_micros,
            tier,
        })
    }

    /// One engine call inside a gate slot, retried and bounded by `deadline`
    async fn generate(
        &self,
        text: &str,
        model: &str,
        deadline: Duration,
        words: u32,
    ) -> Result<String, DomainError> {
        let waited = Instant::now();
        let permit = self.gate.acquire().await?;
        record_gate_wait(waited.elapsed(), self.gate.in_use());

        let started = Instant::now();
        let result = TimeoutGuard::new(deadline)
            .run(
                self.invoker
                    .invoke("generate", || self.engine.generate(text, model)),
            )
            .await;

        debug!(held_ms = permit.held_for().as_millis() as u64, "Releasing gate slot");
        self.gate.release(permit);
        record_gate_in_use(self.gate.in_use());

        record_generation(GenerationMetricParams {
            engine: self.engine.engine_name(),
            model,
            duration: started.elapsed(),
            success: result.is_ok(),
            words,
        });

        if let Err(e) = &result {
            warn!(model, error = %e, "Generation failed");
        }

        result
    }
}
