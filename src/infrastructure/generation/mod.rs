//! Generation engine implementations

mod anthropic;
mod http_client;

pub use anthropic::AnthropicEngine;
pub use http_client::{HttpClient, HttpClientTrait};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
