//! Tier selection for the calling account

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::middleware::RequireIdentity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

#[derive(Debug, Deserialize)]
pub struct UpdateTierRequest {
    #[serde(default)]
    pub tier: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct UpdateTierResponse {
    pub success: bool,
    pub tier: String,
    pub message: String,
}

/// PATCH /v1/account/tier
///
/// Anything other than a known tier name selects `free`.
pub async fn update_tier(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(request): Json<UpdateTierRequest>,
) -> Result<Json<UpdateTierResponse>, ApiError> {
    let requested = request.tier.as_ref().and_then(Value::as_str);

    let account = state
        .account_service
        .update_tier(&identity, requested)
        .await?;

    Ok(Json(UpdateTierResponse {
        success: true,
        tier: account.tier().as_str().to_string(),
        message: "Tier updated successfully".to_string(),
    }))
}
