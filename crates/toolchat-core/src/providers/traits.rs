//! Completion provider trait

use async_trait::async_trait;

use super::error::ProviderResult;
use crate::types::{CancellationToken, ToolSpec, Turn};

/// Default cap on generated tokens per turn
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Model configuration for provider requests
#[derive(Debug, Clone)]
pub struct ProviderModelConfig {
    /// Model identifier, optionally prefixed with the provider (`anthropic/claude-...`)
    pub model: String,
    /// API key; when unset the provider's environment variable is used
    pub api_key: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl ProviderModelConfig {
    /// Create a new model config
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = tokens;
        self
    }
}

/// Produces one model turn from a transcript
///
/// The transcript alternates user and assistant turns and ends with a user
/// turn (typed text or tool results). `tools` is the catalog the model may
/// call for this request.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name (e.g., "anthropic", "scripted")
    fn name(&self) -> &str;

    /// Request the next assistant turn
    async fn chat(
        &self,
        transcript: &[Turn],
        tools: &[ToolSpec],
        cancel: &CancellationToken,
    ) -> ProviderResult<Turn>;
}
