//! Humanizer Gateway
//!
//! Tiered, quota-enforced access to a text rewriting engine:
//! - per-request and monthly word budgets per account tier
//! - a process-wide bound on concurrent generation calls
//! - retries with backoff and a hard per-request deadline
//! - usage ledger and text history in PostgreSQL or in memory

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::usage::offset_from_minutes;
use domain::{
    AccountRepository, ConcurrencyGate, GenerationEngine, IdentityVerifier, QuotaGuard,
    TextRepository, UsageLedgerRepository,
};
use infrastructure::{
    account::{InMemoryAccountRepository, PostgresAccountRepository},
    auth::{JwtConfig, JwtIdentityVerifier},
    generation::{AnthropicEngine, HttpClient},
    services::{AccountService, HumanizeService},
    storage::{connect_pool, run_migrations, PostgresConfig},
    text::{InMemoryTextRepository, PostgresTextRepository},
    usage::{InMemoryUsageLedgerRepository, PostgresUsageLedgerRepository, UsageRecorder},
};
use rand::Rng;
use sqlx::PgPool;
use tracing::{info, warn};

/// Repositories backing accounts, the usage ledger and history
struct Stores {
    accounts: Arc<dyn AccountRepository>,
    ledger: Arc<dyn UsageLedgerRepository>,
    texts: Arc<dyn TextRepository>,
    pool: Option<PgPool>,
}

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let stores = create_stores(config).await?;

    let zone = offset_from_minutes(config.quota.utc_offset_minutes)?;
    let quota = QuotaGuard::new(stores.ledger.clone()).with_zone(zone);

    let gate = Arc::new(ConcurrencyGate::new(config.gate.capacity)?);
    info!(capacity = gate.capacity(), "Concurrency gate ready");

    let engine_configured = !config.generation.api_key.is_empty();
    if !engine_configured {
        warn!("No generation API key configured (set ANTHROPIC_API_KEY). Humanize requests will fail.");
    }
    let engine = create_engine(config)?;

    let recorder = Arc::new(UsageRecorder::new(
        stores.accounts.clone(),
        stores.ledger.clone(),
        stores.texts.clone(),
    ));

    let humanize_service = HumanizeService::new(recorder.clone(), quota.clone(), gate, engine)
        .with_model_override(config.generation.model_override.clone());
    let account_service = AccountService::new(recorder, quota, stores.texts.clone());

    let identity_verifier = create_identity_verifier(config)?;

    let mut state = AppState::new(
        Arc::new(humanize_service),
        Arc::new(account_service),
        identity_verifier,
    )
    .with_engine_configured(engine_configured);

    if let Some(pool) = stores.pool {
        state = state.with_db_pool(pool);
    }

    Ok(state)
}

async fn create_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    if config.database.url.is_empty() {
        info!("Using in-memory storage");
        return Ok(Stores {
            accounts: Arc::new(InMemoryAccountRepository::new()),
            ledger: Arc::new(InMemoryUsageLedgerRepository::new()),
            texts: Arc::new(InMemoryTextRepository::new()),
            pool: None,
        });
    }

    info!("Connecting to PostgreSQL...");
    let pool = connect_pool(
        &PostgresConfig::new(config.database.url.clone())
            .with_max_connections(config.database.max_connections),
    )
    .await?;

    run_migrations(&pool).await?;
    info!("Using PostgreSQL storage");

    Ok(Stores {
        accounts: Arc::new(PostgresAccountRepository::new(pool.clone())),
        ledger: Arc::new(PostgresUsageLedgerRepository::new(pool.clone())),
        texts: Arc::new(PostgresTextRepository::new(pool.clone())),
        pool: Some(pool),
    })
}

fn create_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn GenerationEngine>> {
    let client = HttpClient::with_timeout(Duration::from_millis(config.generation.http_timeout_ms))?;

    Ok(Arc::new(AnthropicEngine::with_base_url(
        client,
        config.generation.api_key.clone(),
        config.generation.base_url.clone(),
    )))
}

/// Session verifier from the configured secret, or a random one
fn create_identity_verifier(config: &AppConfig) -> anyhow::Result<Arc<dyn IdentityVerifier>> {
    let secret = if config.auth.jwt_secret.is_empty() {
        warn!(
            "No JWT_SECRET configured. Generating random secret. \
            Tokens from the session provider will NOT verify."
        );
        generate_random_secret()
    } else {
        config.auth.jwt_secret.clone()
    };

    Ok(Arc::new(JwtIdentityVerifier::new(&JwtConfig::new(secret))?))
}

fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
