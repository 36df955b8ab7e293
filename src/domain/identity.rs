//! Caller identity supplied by the session provider

use std::fmt::Debug;

use super::account::AccountId;
use super::DomainError;

/// Authenticated caller: external account id plus an optional email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: AccountId,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(account_id: AccountId, email: Option<String>) -> Self {
        Self { account_id, email }
    }
}

/// Resolves a bearer credential into an [`Identity`]
pub trait IdentityVerifier: Send + Sync + Debug {
    fn verify(&self, token: &str) -> Result<Identity, DomainError>;
}
