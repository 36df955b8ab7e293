//! Session token validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::{AccountId, DomainError, Identity, IdentityVerifier};

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (external account id)
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(identity: &Identity, ttl_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(ttl_hours as i64);

        Self {
            sub: identity.account_id.as_str().to_string(),
            email: identity.email.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// Configuration for session token validation
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret
    pub secret: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

/// Verifies session JWTs and turns their claims into an [`Identity`]
#[derive(Clone)]
pub struct JwtIdentityVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtIdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityVerifier")
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl JwtIdentityVerifier {
    pub fn new(config: &JwtConfig) -> Result<Self, DomainError> {
        if config.secret.is_empty() {
            return Err(DomainError::configuration("JWT secret must not be empty"));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        })
    }

    /// Mint a token for `identity`, used by local tooling and tests
    pub fn issue(&self, identity: &Identity, ttl_hours: u64) -> Result<String, DomainError> {
        let claims = SessionClaims::new(identity, ttl_hours);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, token: &str) -> Result<Identity, DomainError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| DomainError::unauthenticated(format!("Invalid session token: {}", e)))?;

        let claims = token_data.claims;
        let account_id = AccountId::new(claims.sub)
            .map_err(|e| DomainError::unauthenticated(format!("Invalid subject: {}", e)))?;

        Ok(Identity::new(account_id, claims.email))
    }
}
