//! Provider call errors.

use thiserror::Error;

/// Any failure of an outbound provider call.
///
/// The response pipeline never surfaces these to its caller; they are
/// recovered into a fallback reply.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, TLS, timeout, or body read failure.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP 429.
    #[error("Rate limited by provider (429)")]
    RateLimited {
        /// Seconds from the `retry-after` header, if present.
        retry_after: Option<u64>,
    },

    /// HTTP 529.
    #[error("Provider overloaded (529)")]
    Overloaded,

    /// Any other 5xx.
    #[error("Provider server error: {status}")]
    Server { status: u16 },

    /// 4xx, or an error object in a 2xx body.
    #[error("Provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Body was not the expected JSON shape.
    #[error("Malformed provider response: {0}")]
    Malformed(String),

    /// Response carried no text content block.
    #[error("Provider response contained no text content")]
    NoTextContent,
}

impl ProviderError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::Transport(_)
                | ProviderError::RateLimited { .. }
                | ProviderError::Overloaded
                | ProviderError::Server { .. }
        )
    }
}
