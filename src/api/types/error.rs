//! JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

pub const GENERIC_FAILURE_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Failure body: `{ "success": false, "error": ..., "code": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                success: false,
                error: message.into(),
                code: None,
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.code = Some(code.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message).with_code("VALIDATION_ERROR")
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized").with_code("UNAUTHORIZED")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message).with_code("FORBIDDEN")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message).with_code("TEXT_NOT_FOUND")
    }

    /// Internal failure; the details stay in the logs
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE_MESSAGE)
            .with_code("SERVER_ERROR")
    }

    pub fn code(&self) -> Option<&str> {
        self.response.code.as_deref()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::QuotaExceeded { kind, .. } => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string()).with_code(kind.code())
            }
            DomainError::Unauthenticated { .. } => Self::unauthorized(),
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Timeout { .. }
            | DomainError::Provider { .. }
            | DomainError::Configuration { .. }
            | DomainError::Conflict { .. }
            | DomainError::Internal { .. }
            | DomainError::Storage { .. } => {
                error!(error = %err, "Request failed");
                Self::internal()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status.as_u16(), self.response.error)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuotaRejection;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let api_err: ApiError = DomainError::validation("Invalid input text").into();

        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_err.response.error, "Invalid input text");
        assert_eq!(api_err.code(), Some("VALIDATION_ERROR"));
    }

    #[test]
    fn test_quota_rejections_keep_message_and_code() {
        let api_err: ApiError =
            DomainError::quota_exceeded(QuotaRejection::PerRequestExceeded, 500, "free").into();

        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_err.response.error, "Max 500 words per request for free tier");
        assert_eq!(api_err.code(), Some("PER_REQUEST_EXCEEDED"));

        let api_err: ApiError =
            DomainError::quota_exceeded(QuotaRejection::MonthlyExceeded, 5_000, "free").into();

        assert_eq!(
            api_err.response.error,
            "Monthly limit (5000 words) exceeded. Upgrade your tier."
        );
        assert_eq!(api_err.code(), Some("MONTHLY_EXCEEDED"));
    }

    #[test]
    fn test_access_errors() {
        let api_err: ApiError = DomainError::unauthenticated("bad token").into();
        assert_eq!(api_err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api_err.response.error, "Unauthorized");

        let api_err: ApiError = DomainError::forbidden("Forbidden").into();
        assert_eq!(api_err.status, StatusCode::FORBIDDEN);

        let api_err: ApiError = DomainError::not_found("Text not found").into();
        assert_eq!(api_err.status, StatusCode::NOT_FOUND);
        assert_eq!(api_err.code(), Some("TEXT_NOT_FOUND"));
    }

    #[test]
    fn test_internal_failures_are_generic() {
        for err in [
            DomainError::timeout(35_000),
            DomainError::provider("anthropic", "HTTP 529: overloaded"),
            DomainError::storage("connection reset by peer"),
            DomainError::configuration("missing key"),
        ] {
            let api_err: ApiError = err.into();

            assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(api_err.response.error, GENERIC_FAILURE_MESSAGE);
            assert_eq!(api_err.code(), Some("SERVER_ERROR"));
        }
    }

    #[test]
    fn test_error_serialization() {
        let json = serde_json::to_value(&ApiError::unauthorized().response).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Unauthorized", "code": "UNAUTHORIZED"})
        );
    }
}
