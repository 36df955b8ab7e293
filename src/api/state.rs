//! Application state for shared services

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::IdentityVerifier;
use crate::infrastructure::services::{AccountService, HumanizeService};

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub humanize_service: Arc<HumanizeService>,
    pub account_service: Arc<AccountService>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    /// Present only when PostgreSQL storage is configured
    pub db_pool: Option<PgPool>,
    pub engine_configured: bool,
}

impl AppState {
    pub fn new(
        humanize_service: Arc<HumanizeService>,
        account_service: Arc<AccountService>,
        identity_verifier: Arc<dyn IdentityVerifier>,
    ) -> Self {
        Self {
            humanize_service,
            account_service,
            identity_verifier,
            db_pool: None,
            engine_configured: true,
        }
    }

    pub fn with_db_pool(mut self, pool: PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    pub fn with_engine_configured(mut self, configured: bool) -> Self {
        self.engine_configured = configured;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("humanize_service", &self.humanize_service)
            .field("account_service", &self.account_service)
            .field("database", &self.db_pool.is_some())
            .field("engine_configured", &self.engine_configured)
            .finish()
    }
}
