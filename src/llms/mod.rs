//! LLM provider layer.
//!
//! - [`provider`] - The [`ChatProvider`] trait and request types
//! - [`error`] - [`ProviderError`] taxonomy
//! - [`providers`] - Concrete HTTP providers (Anthropic Messages API)

pub mod error;
pub mod provider;
pub mod providers;

#[cfg(test)]
pub(crate) mod testing;

pub use error::ProviderError;
pub use provider::{
    ChatProvider, GenerationParams, ProviderRequest, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_TEMPERATURE,
};
pub use providers::anthropic::AnthropicCompletion;
