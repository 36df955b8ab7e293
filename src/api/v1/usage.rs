//! Usage meter for the calling account

use axum::extract::State;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::api::middleware::RequireIdentity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::services::UsageSummary;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub success: bool,
    pub tier: String,
    pub words_used: u64,
    pub words_limit: u32,
    pub words_remaining: u64,
    pub percentage_used: u64,
    /// Start of the next period, ISO 8601 with milliseconds
    pub resets: String,
}

impl From<UsageSummary> for UsageResponse {
    fn from(summary: UsageSummary) -> Self {
        Self {
            success: true,
            tier: summary.tier.as_str().to_string(),
            words_used: summary.words_used,
            words_limit: summary.words_limit,
            words_remaining: summary.words_remaining,
            percentage_used: summary.percentage_used,
            resets: summary
                .resets_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// GET /v1/usage
pub async fn get_usage(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<UsageResponse>, ApiError> {
    let summary = state
        .account_service
        .summary(&identity, Utc::now())
        .await?;

    Ok(Json(UsageResponse::from(summary)))
}
