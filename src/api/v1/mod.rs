//! v1 API endpoints

pub mod account;
pub mod history;
pub mod humanize;
pub mod usage;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/humanize", post(humanize::humanize))
        .route("/usage", get(usage::get_usage))
        .route("/account/tier", patch(account::update_tier))
        .route("/history", get(history::list_history))
        .route("/history/{text_id}", delete(history::delete_text))
}
