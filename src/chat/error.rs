//! Chat errors surfaced to callers.
//!
//! Provider failures are deliberately absent: the pipeline recovers them into
//! a fallback reply.

use thiserror::Error;

/// Client-side request problems.  Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Body was not a JSON object.
    #[error("Invalid request body")]
    InvalidBody,

    /// `characterId` or `message` missing, empty, or not a string.
    #[error("Missing required fields")]
    MissingFields,

    /// `conversationHistory` is not a list of `{role, content}` turns.
    #[error("Invalid conversation history: {0}")]
    InvalidHistory(String),
}

/// Errors returned by the response pipeline and transport handler.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The persona id is not in the registry.
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    /// Anything unexpected.  Details are logged, never returned to clients.
    #[error("Internal error: {0}")]
    Internal(String),
}
