use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::http_client::HttpClientTrait;
use crate::domain::{DomainError, GenerationEngine};

const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2500;
const TOP_P: f64 = 0.95;

/// Rewrite instructions sent ahead of the caller's text
const REWRITE_INSTRUCTIONS: &str = "\
Rewrite the text below so it reads as if a careful person wrote it by hand.

Keep every fact, claim and figure. Keep the original language, tone and \
approximate length. Vary sentence length and rhythm, prefer plain everyday \
words, and drop stock filler phrases and formulaic transitions. Do not add \
new information, headings or lists that were not already there.

Reply with the rewritten text only, without any introduction or commentary.";

/// Generation engine backed by the Anthropic Messages API
#[derive(Debug)]
pub struct AnthropicEngine<C: HttpClientTrait> {
    client: C,
    api_key: String,
    base_url: String,
}

impl<C: HttpClientTrait> AnthropicEngine<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_ANTHROPIC_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            api_key: api_key.into(),
            base_url,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    fn build_request(&self, model: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "top_p": TOP_P,
            "messages": [
                {
                    "role": "user",
                    "content": build_prompt(text),
                }
            ],
        })
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("x-api-key", self.api_key.as_str()),
            ("anthropic-version", ANTHROPIC_VERSION),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<String, DomainError> {
        let response: AnthropicResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("anthropic", format!("Failed to parse response: {}", e))
        })?;

        let content = response
            .content
            .into_iter()
            .filter_map(|block| {
                if block.content_type == "text" {
                    block.text
                } else {
                    None
                }
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(content.trim().to_string())
    }
}

fn build_prompt(text: &str) -> String {
    format!("{}\n\nText:\n\"{}\"", REWRITE_INSTRUCTIONS, text)
}

#[async_trait]
impl<C: HttpClientTrait> GenerationEngine for AnthropicEngine<C> {
    async fn generate(&self, text: &str, model: &str) -> Result<String, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::validation("Input text is empty"));
        }

        if self.api_key.is_empty() {
            return Err(DomainError::configuration(
                "Anthropic API key is not configured",
            ));
        }

        let url = self.messages_url();
        let body = self.build_request(model, text);
        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await
            .map_err(|e| match e {
                DomainError::Provider { message, .. } => DomainError::provider("anthropic", message),
                other => other,
            })?;

        let output = self.parse_response(response)?;

        if output.is_empty() {
            warn!(model, "Engine returned empty output, falling back to original text");
            return Ok(text.to_string());
        }

        Ok(output)
    }

    fn engine_name(&self) -> &'static str {
        "anthropic"
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::generation::{HttpClient, MockHttpClient};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_URL: &str = "https://api.anthropic.com/v1/messages";
    const MODEL: &str = "claude-3-haiku-20240307";

    fn response_with(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "model": MODEL,
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 20}
        })
    }

    #[tokio::test]
    async fn test_generate_returns_text_blocks() {
        let client = MockHttpClient::new().with_response(TEST_URL, response_with("  Rewritten.  "));
        let engine = AnthropicEngine::new(client, "test-key");

        let output = engine.generate("Some input text", MODEL).await.unwrap();

        assert_eq!(output, "Rewritten.");
        assert_eq!(engine.engine_name(), "anthropic");
    }

    #[tokio::test]
    async fn test_request_shape() {
        let client = MockHttpClient::new().with_response(TEST_URL, response_with("ok"));
        let engine = AnthropicEngine::new(client, "test-key");

        engine.generate("hello there", MODEL).await.unwrap();

        let requests = engine.client.requests();
        assert_eq!(requests.len(), 1);
        let body = &requests[0];
        assert_eq!(body["model"], MODEL);
        assert_eq!(body["max_tokens"], 2500);
        assert_eq!(body["top_p"], 0.95);
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(body["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("\"hello there\""));
    }

    #[tokio::test]
    async fn test_empty_output_falls_back_to_input() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            serde_json::json!({"content": [{"type": "tool_use", "id": "x"}]}),
        );
        let engine = AnthropicEngine::new(client, "test-key");

        let output = engine.generate("keep me", MODEL).await.unwrap();

        assert_eq!(output, "keep me");
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected() {
        let engine = AnthropicEngine::new(MockHttpClient::new(), "test-key");

        let result = engine.generate("   ", MODEL).await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(engine.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_configuration_error() {
        let engine = AnthropicEngine::new(MockHttpClient::new(), "");

        let result = engine.generate("text", MODEL).await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_provider_errors_are_tagged() {
        let client = MockHttpClient::new().with_error(TEST_URL, "HTTP 529: overloaded_error");
        let engine = AnthropicEngine::new(client, "test-key");

        let error = engine.generate("text", MODEL).await.unwrap_err();

        assert!(matches!(
            &error,
            DomainError::Provider { provider, .. } if provider == "anthropic"
        ));
        assert!(error.is_retryable());
    }

    #[tokio::test]
    async fn test_custom_base_url_against_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(serde_json::json!({"model": MODEL})))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_with("From server")))
            .mount(&server)
            .await;

        let engine =
            AnthropicEngine::with_base_url(HttpClient::new(), "test-key", format!("{}/", server.uri()));

        let output = engine.generate("input", MODEL).await.unwrap();

        assert_eq!(output, "From server");
    }
}
