//! CLI module for Humanizer Gateway
//!
//! Subcommands:
//! - `serve`: run the HTTP server
//! - `migrate`: apply (or revert) PostgreSQL schema migrations
//! - `issue-token`: mint a session token for local testing

pub mod migrate;
pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

/// Humanizer Gateway - tiered, quota-enforced text rewriting
#[derive(Parser)]
#[command(name = "humanizer-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Apply pending schema migrations and exit
    Migrate(migrate::MigrateArgs),

    /// Print a signed session token for an account
    IssueToken(token::IssueTokenArgs),
}

/// Environment file, then layered configuration
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    Ok(AppConfig::load()?)
}
