//! Text generation engine abstraction

use async_trait::async_trait;
use std::fmt::Debug;

use super::DomainError;

/// A remote, fallible, potentially slow text rewriting engine
#[async_trait]
pub trait GenerationEngine: Send + Sync + Debug {
    /// Rewrite `text` using the model named by `model`
    async fn generate(&self, text: &str, model: &str) -> Result<String, DomainError>;

    fn engine_name(&self) -> &'static str;
}
