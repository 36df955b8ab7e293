//! Deadline enforcement for a single operation

use std::future::Future;
use std::time::Duration;

use crate::domain::DomainError;

/// Races an operation against a deadline.
///
/// When the deadline fires first the operation future is dropped and
/// [`DomainError::Timeout`] is returned. Work already handed to a remote
/// engine is not cancelled there; only the local result is discarded.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutGuard {
    deadline: Duration,
}

impl TimeoutGuard {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn run<T, F>(&self, operation: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        match tokio::time::timeout(self.deadline, operation).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::timeout(self.deadline.as_millis() as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_operation_finishing_in_time() {
        let guard = TimeoutGuard::from_millis(500);

        let result = guard
            .run(async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, DomainError>("fast")
            })
            .await;

        assert_eq!(result.unwrap(), "fast");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires_first() {
        let guard = TimeoutGuard::from_millis(500);

        let result = guard
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, DomainError>("slow")
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, DomainError::Timeout { deadline_ms: 500 }));
        assert_eq!(err.to_string(), "Timeout after 500ms");
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_error_passes_through() {
        let guard = TimeoutGuard::new(Duration::from_secs(1));

        let result: Result<(), _> = guard
            .run(async { Err(DomainError::validation("bad input")) })
            .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
