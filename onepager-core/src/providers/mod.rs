//! LLM provider implementations.
//!
//! Provides the `LlmProvider` trait, the Anthropic Messages API
//! implementation, and a scripted mock for tests. Use [`create_provider`]
//! to instantiate the provider named in the configuration.

pub mod anthropic;

use crate::config::LlmConfig;
use crate::error::{ConfigError, LlmError};
use crate::types::{CompletionRequest, CompletionResponse, TokenUsage};
use async_trait::async_trait;
use std::sync::Arc;

pub use anthropic::AnthropicProvider;

/// Abstraction over a completion endpoint.
///
/// The pipeline makes exactly one non-streaming call per request, so the
/// surface is deliberately small.
#[async_trait]
pub trait LlmProvider: Send + Sync + std::fmt::Debug {
    /// Perform a full completion and return the response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Return the configured model name.
    fn model_name(&self) -> &str;
}

/// Create an LLM provider based on the configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, ConfigError> {
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicProvider::new(config)?)),
        other => Err(ConfigError::Invalid {
            message: format!("Unsupported llm.provider '{other}'"),
        }),
    }
}

/// A scripted provider for tests.
#[derive(Debug)]
pub struct MockProvider {
    model: String,
    responses: std::sync::Mutex<Vec<Result<CompletionResponse, LlmError>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            responses: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A provider that answers every completion with the given text.
    pub fn with_response(text: &str) -> Self {
        let provider = Self::new();
        for _ in 0..8 {
            provider.queue(Ok(Self::text_response(text)));
        }
        provider
    }

    /// Queue a result for the next `complete` call (drained in order).
    pub fn queue(&self, response: Result<CompletionResponse, LlmError>) {
        self.responses.lock().unwrap().push(response);
    }

    /// Create a simple text response for testing.
    pub fn text_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            text: text.to_string(),
            usage: TokenUsage {
                input_tokens: 100,
                output_tokens: 50,
            },
            model: "mock-model".to_string(),
            finish_reason: Some("end_turn".to_string()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::ApiRequest {
                message: "MockProvider has no queued responses".to_string(),
            });
        }
        responses.remove(0)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_create_provider_unknown_is_config_error() {
        let config = LlmConfig {
            provider: "frontier-9000".to_string(),
            ..Default::default()
        };
        let err = create_provider(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[tokio::test]
    async fn test_mock_provider_drains_queue() {
        let provider = MockProvider::new();
        provider.queue(Ok(MockProvider::text_response("first")));
        provider.queue(Err(LlmError::RateLimited {
            retry_after_secs: 5,
        }));

        let request = CompletionRequest::new(vec![Message::user("hi")]);
        let first = provider.complete(request.clone()).await.unwrap();
        assert_eq!(first.text, "first");

        let second = provider.complete(request).await;
        assert!(matches!(second, Err(LlmError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_mock_provider_empty_queue_errors() {
        let provider = MockProvider::new();
        let request = CompletionRequest::new(vec![Message::user("hi")]);
        assert!(provider.complete(request).await.is_err());
    }
}
