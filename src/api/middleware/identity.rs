//! Caller identity from a bearer session token

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::Identity;

/// Extractor that requires `Authorization: Bearer <jwt>` with a valid session
#[derive(Debug, Clone)]
pub struct RequireIdentity(pub Identity);

impl FromRequestParts<AppState> for RequireIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;

        let identity = state.identity_verifier.verify(&token).map_err(|e| {
            debug!(error = %e, "Rejected session token");
            ApiError::unauthorized()
        })?;

        Ok(RequireIdentity(identity))
    }
}

/// Bearer token from the Authorization header, if present
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
