//! Retry orchestration with exponential backoff and symmetric jitter

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use rand::Rng;
use tracing::{debug, warn};

use crate::domain::DomainError;

/// Attempt budget and backoff shape for a retried operation
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub attempts: u32,
    /// Delay before the second attempt
    pub base_delay_ms: u64,
    /// Upper bound for the un-jittered delay
    pub max_delay_ms: u64,
    /// Fraction of the delay randomly added or removed
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 4,
            base_delay_ms: 400,
            max_delay_ms: 5000,
            jitter: 0.25,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts,
            ..Default::default()
        }
    }

    /// Account lookups and repairs
    pub fn account() -> Self {
        Self::new(4).with_base_delay(300).with_max_delay(4000)
    }

    /// Usage aggregate reads
    pub fn aggregate() -> Self {
        Self::new(3).with_base_delay(250).with_max_delay(3000)
    }

    pub fn with_base_delay(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    pub fn with_max_delay(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    /// Un-jittered delay after the given failed attempt (1-based)
    pub fn base_delay_for_attempt(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(32);

        self.base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_delay_ms)
    }

    /// Delay after the given failed attempt, with `unit` drawn from [-1, 1]
    pub fn delay_for_attempt(&self, attempt: u32, unit: f64) -> Duration {
        let raw = self.base_delay_for_attempt(attempt) as f64;
        let jittered = (raw + raw * self.jitter * unit.clamp(-1.0, 1.0)).floor();

        Duration::from_millis(jittered.max(0.0) as u64)
    }
}

/// Source of uniformly distributed values in [-1, 1]
pub trait JitterSource: Send + Sync + Debug {
    fn sample(&self) -> f64;
}

/// Jitter drawn from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl JitterSource for RandomJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(-1.0..=1.0)
    }
}

/// Constant jitter, mostly for deterministic tests
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

/// Runs an operation under a [`RetryPolicy`], retrying transient failures only
#[derive(Debug, Clone)]
pub struct ResilientInvoker {
    policy: RetryPolicy,
    jitter: Arc<dyn JitterSource>,
}

impl Default for ResilientInvoker {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl ResilientInvoker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            jitter: Arc::new(RandomJitter),
        }
    }

    pub fn with_jitter_source(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `operation` until it succeeds, fails fatally, or the attempt budget runs out.
    ///
    /// A fatal failure, or any failure on the final attempt, is returned immediately
    /// without sleeping.
    pub async fn invoke<T, F, Fut>(&self, tag: &str, mut operation: F) -> Result<T, DomainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DomainError>>,
    {
        let max_attempts = self.policy.attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation = tag, attempt, "Succeeded after retry");
                    }

                    return Ok(value);
                }
                Err(err) => {
                    if attempt >= max_attempts || !err.is_retryable() {
                        return Err(err);
                    }

                    let delay = self.policy.delay_for_attempt(attempt, self.jitter.sample());

                    warn!(
                        operation = tag,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient failure, retrying"
                    );
                    counter!("humanizer_retries_total", "operation" => tag.to_string())
                        .increment(1);

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
