//! Migrate command - applies schema migrations against `database.url`

use clap::Args;
use tracing::info;

use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::migrations::Migrator;
use crate::infrastructure::storage::{connect_pool, PostgresConfig, PostgresMigrator};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead
    #[arg(long)]
    pub revert: bool,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;
    init_logging(&config.logging);

    if config.database.url.is_empty() {
        anyhow::bail!("database.url (or DATABASE_URL) is required to run migrations");
    }

    let pool = connect_pool(
        &PostgresConfig::new(config.database.url.clone()).with_max_connections(1),
    )
    .await?;
    let migrator = PostgresMigrator::new(pool);

    if args.revert {
        migrator.revert().await?;
    } else {
        migrator.run().await?;
    }

    let version = migrator.version().await?;
    info!(version = ?version, "Schema is up to date");

    Ok(())
}
