//! Issue-token command - signs a session token with `auth.jwt_secret`

use clap::Args;

use crate::domain::{AccountId, Identity};
use crate::infrastructure::auth::{JwtConfig, JwtIdentityVerifier};

#[derive(Debug, Args)]
pub struct IssueTokenArgs {
    /// Account id placed in the `sub` claim
    #[arg(long)]
    pub account_id: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long, default_value_t = 24)]
    pub ttl_hours: u64,
}

pub async fn run(args: IssueTokenArgs) -> anyhow::Result<()> {
    let config = super::load_config()?;

    let verifier = JwtIdentityVerifier::new(&JwtConfig::new(config.auth.jwt_secret))?;
    let identity = Identity::new(AccountId::new(args.account_id)?, args.email);

    println!("{}", verifier.issue(&identity, args.ttl_hours)?);
    Ok(())
}
