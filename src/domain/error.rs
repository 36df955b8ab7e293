use thiserror::Error;

use super::resilience::{classify, FailureClass};
use super::usage::QuotaRejection;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("{}", quota_message(.kind, .limit, .tier))]
    QuotaExceeded {
        kind: QuotaRejection,
        limit: u32,
        tier: String,
    },

    #[error("Timeout after {deadline_ms}ms")]
    Timeout { deadline_ms: u64 },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn quota_exceeded(kind: QuotaRejection, limit: u32, tier: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            kind,
            limit,
            tier: tier.into(),
        }
    }

    pub fn timeout(deadline_ms: u64) -> Self {
        Self::Timeout { deadline_ms }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Whether a retry may succeed, judged from the rendered message
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Validation { .. }
            | Self::Unauthenticated { .. }
            | Self::Forbidden { .. }
            | Self::QuotaExceeded { .. }
            | Self::NotFound { .. } => false,
            Self::Timeout { .. } => true,
            _ => classify(&self.to_string()) == FailureClass::Retryable,
        }
    }
}

fn quota_message(kind: &QuotaRejection, limit: &u32, tier: &str) -> String {
    match kind {
        QuotaRejection::PerRequestExceeded => {
            format!("Max {} words per request for {} tier", limit, tier)
        }
        QuotaRejection::MonthlyExceeded => {
            format!("Monthly limit ({} words) exceeded. Upgrade your tier.", limit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Text 'abc' not found");
        assert_eq!(error.to_string(), "Not found: Text 'abc' not found");
    }

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input text");
        assert_eq!(error.to_string(), "Validation error: Invalid input text");
    }

    #[test]
    fn test_timeout_message() {
        let error = DomainError::timeout(35000);
        assert_eq!(error.to_string(), "Timeout after 35000ms");
        assert!(error.is_retryable());
    }

    #[test]
    fn test_quota_messages() {
        let per_request = DomainError::quota_exceeded(QuotaRejection::PerRequestExceeded, 500, "free");
        assert_eq!(
            per_request.to_string(),
            "Max 500 words per request for free tier"
        );

        let monthly = DomainError::quota_exceeded(QuotaRejection::MonthlyExceeded, 5000, "free");
        assert_eq!(
            monthly.to_string(),
            "Monthly limit (5000 words) exceeded. Upgrade your tier."
        );
        assert!(!monthly.is_retryable());
    }

    #[test]
    fn test_provider_rate_limit_is_retryable() {
        let error = DomainError::provider("anthropic", "HTTP 429 Too Many Requests: slow down");
        assert!(error.is_retryable());

        let error = DomainError::provider("anthropic", "HTTP 400 Bad Request: invalid model");
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_storage_deadlock_is_retryable() {
        let error = DomainError::storage("Failed to append usage: deadlock detected");
        assert!(error.is_retryable());
    }
}
