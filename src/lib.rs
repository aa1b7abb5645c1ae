//! # rolechat
//!
//! Persona-driven role-play chat service.  A client picks a persona and sends
//! one message at a time along with the prior conversation; each turn is
//! forwarded to the Anthropic Messages API with the persona's system prompt,
//! and the reply comes back prefixed with the persona's fixed opening text.
//! When the provider fails the persona still answers, with a canned sentence.
//!
//! ```text
//! POST /api/chat ─▶ server::routes (validate) ─▶ chat::ResponsePipeline
//!                                                  ├─ persona::PersonaRegistry
//!                                                  ├─ llms::ChatProvider (Anthropic)
//!                                                  └─ persona::FallbackTable
//! ```

pub mod chat;
pub mod config;
pub mod llms;
pub mod persona;
pub mod server;

pub use chat::{ChatError, ConversationTurn, GeneratedReply, ResponsePipeline, Role};
pub use config::{AppConfig, ConfigError};
pub use llms::{AnthropicCompletion, ChatProvider, GenerationParams, ProviderError};
pub use persona::{Persona, PersonaCatalog};

/// Crate version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
