//! Authentication infrastructure module
//!
//! Session tokens are HS256 JWTs minted by the session provider.

mod jwt;

pub use jwt::{JwtConfig, JwtIdentityVerifier, SessionClaims};
