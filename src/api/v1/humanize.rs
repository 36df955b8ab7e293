//! Humanize endpoint

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::middleware::RequireIdentity;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};

/// `text` is loosely typed so a non-string value gets the same
/// validation message as a blank one.
#[derive(Debug, Deserialize)]
pub struct HumanizeRequest {
    #[serde(default)]
    pub text: Option<Value>,
}

impl HumanizeRequest {
    fn text(&self) -> &str {
        self.text.as_ref().and_then(Value::as_str).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeResponse {
    pub success: bool,
    pub humanized_text: String,
}

/// POST /v1/humanize
pub async fn humanize(
    State(state): State<AppState>,
    RequireIdentity(identity): RequireIdentity,
    Json(request): Json<HumanizeRequest>,
) -> Result<Json<HumanizeResponse>, ApiError> {
    let outcome = state
        .humanize_service
        .handle(Some(&identity), request.text())
        .await?;

    Ok(Json(HumanizeResponse {
        success: true,
        humanized_text: outcome.humanized_text,
    }))
}
