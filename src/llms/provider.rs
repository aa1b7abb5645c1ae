//! The provider capability: system prompt + ordered turns in, text out.

use std::fmt;

use async_trait::async_trait;

use super::error::ProviderError;
use crate::chat::ConversationTurn;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Maximum output length used when none is configured.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Sampling temperature used when none is configured.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;

/// Fixed generation parameters.  Configuration, never computed per request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Everything a provider needs for one completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub system: String,
    /// Oldest first; the last entry is the new user turn.
    pub messages: Vec<ConversationTurn>,
    pub params: GenerationParams,
}

/// An external text-generation service.
///
/// Implementations make exactly the calls they are asked for; fallback
/// handling lives in the response pipeline.
#[async_trait]
pub trait ChatProvider: Send + Sync + fmt::Debug {
    /// Short provider name used in logs.
    fn provider(&self) -> &str;

    /// Generate text for `request`.
    async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderError>;
}
