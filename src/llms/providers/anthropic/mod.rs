//! Anthropic Messages API provider.
//!
//! Sends a system prompt and an ordered user/assistant turn list to
//! `POST {base_url}/v1/messages` and returns the concatenated text blocks of
//! the reply.
//!
//! # Features
//!
//! - Real HTTP calls via `reqwest` with a per-attempt timeout
//! - Optional retry with exponential backoff on transport errors, 429, 529 and 5xx
//! - API-level error objects and text-less replies reported as [`ProviderError`]
//! - Token usage logged at debug level

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::llms::error::ProviderError;
use crate::llms::provider::{ChatProvider, ProviderRequest};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Value of the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Delay before the first retry; doubles on each further attempt.
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// AnthropicCompletion provider
// ---------------------------------------------------------------------------

/// Anthropic Messages API client.
///
/// # Example
///
/// ```ignore
/// let provider = AnthropicCompletion::new(api_key, None, DEFAULT_TIMEOUT)?
///     .with_max_retries(2);
/// let text = provider.complete(&request).await?;
/// ```
#[derive(Clone)]
pub struct AnthropicCompletion {
    api_key: String,
    base_url: String,
    /// Anthropic API version header.
    pub anthropic_version: String,
    /// Extra attempts after the first one.  `0` means a single attempt.
    pub max_retries: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl fmt::Debug for AnthropicCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnthropicCompletion")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("anthropic_version", &self.anthropic_version)
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AnthropicCompletion {
    /// Create a new provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Anthropic API key.
    /// * `base_url` - Optional custom base URL (defaults to [`DEFAULT_BASE_URL`]).
    /// * `timeout` - Per-attempt request timeout.
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            max_retries: 0,
            timeout,
            client,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Get the API base URL.
    pub fn api_base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    /// Build the request body for the Messages API.
    pub fn build_request_body(&self, request: &ProviderRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": turn.role.as_str(),
                    "content": turn.content,
                })
            })
            .collect();

        serde_json::json!({
            "model": request.params.model,
            "max_tokens": request.params.max_tokens,
            "temperature": request.params.temperature,
            "system": request.system,
            "messages": messages,
        })
    }

    /// Parse a Messages API response body into reply text.
    ///
    /// All `text` blocks are concatenated in order.  A body with no text block
    /// is [`ProviderError::NoTextContent`].
    fn parse_response(response: &Value) -> Result<String, ProviderError> {
        if response.get("type").and_then(|t| t.as_str()) == Some("error") {
            let message = response
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown Anthropic API error");
            return Err(ProviderError::Api {
                status: 200,
                message: message.to_string(),
            });
        }

        let content = response
            .get("content")
            .and_then(|c| c.as_array())
            .ok_or_else(|| ProviderError::Malformed("no content array".to_string()))?;

        let mut text_parts: Vec<&str> = Vec::new();
        for block in content {
            let block_type = block.get("type").and_then(|t| t.as_str()).unwrap_or("");
            match block_type {
                "text" => {
                    if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                        text_parts.push(text);
                    }
                }
                other => {
                    log::debug!("Skipping Anthropic content block type: {}", other);
                }
            }
        }

        if text_parts.is_empty() {
            return Err(ProviderError::NoTextContent);
        }
        Ok(text_parts.concat())
    }

    /// Log `input_tokens` / `output_tokens` from `response.usage`.
    fn log_token_usage(response: &Value) {
        if let Some(usage) = response.get("usage") {
            let input = usage
                .get("input_tokens")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            let output = usage
                .get("output_tokens")
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            log::debug!(
                "Anthropic token usage: input={}, output={}, total={}",
                input,
                output,
                input + output,
            );
        }
    }

    /// One HTTP attempt.
    async fn send_once(&self, body: &Value) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", self.anthropic_version.as_str())
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(ProviderError::RateLimited { retry_after });
        }
        if status.as_u16() == 529 {
            return Err(ProviderError::Overloaded);
        }
        if status.is_server_error() {
            return Err(ProviderError::Server {
                status: status.as_u16(),
            });
        }

        let response_text = response.text().await?;

        if status.is_client_error() {
            let message = serde_json::from_str::<Value>(&response_text)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(response_text);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response_json: Value = serde_json::from_str(&response_text).map_err(|e| {
            let preview: String = response_text.chars().take(500).collect();
            ProviderError::Malformed(format!("{} - Body: {}", e, preview))
        })?;

        Self::log_token_usage(&response_json);
        Self::parse_response(&response_json)
    }
}

#[async_trait]
impl ChatProvider for AnthropicCompletion {
    fn provider(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        log::debug!(
            "AnthropicCompletion.complete: model={}, messages={}",
            request.params.model,
            request.messages.len(),
        );

        let body = self.build_request_body(request);
        let mut retry_delay = INITIAL_RETRY_DELAY;
        let mut attempt = 0;

        loop {
            match self.send_once(&body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    if let ProviderError::RateLimited {
                        retry_after: Some(secs),
                    } = &e
                    {
                        retry_delay = Duration::from_secs(*secs);
                    }
                    attempt += 1;
                    log::warn!(
                        "Anthropic API retry attempt {} after {:?}: {}",
                        attempt,
                        retry_delay,
                        e
                    );
                    tokio::time::sleep(retry_delay).await;
                    retry_delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    use crate::chat::ConversationTurn;
    use crate::llms::provider::GenerationParams;

    fn request() -> ProviderRequest {
        ProviderRequest {
            system: "Be concise.".to_string(),
            messages: vec![
                ConversationTurn::user("a"),
                ConversationTurn::assistant("b"),
                ConversationTurn::user("c"),
            ],
            params: GenerationParams::default(),
        }
    }

    /// Stub Messages API that replies with `(status, body)` pairs in order,
    /// repeating the last one, and records request bodies and api keys.
    struct Stub {
        addr: SocketAddr,
        hits: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    }

    async fn spawn_stub(replies: Vec<(u16, Value)>) -> Stub {
        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let replies = Arc::new(replies);

        let app = {
            let hits = hits.clone();
            let seen = seen.clone();
            Router::new().route(
                "/v1/messages",
                post(move |headers: HeaderMap, Json(body): Json<Value>| {
                    let hits = hits.clone();
                    let seen = seen.clone();
                    let replies = replies.clone();
                    async move {
                        let n = hits.fetch_add(1, Ordering::SeqCst);
                        let key = headers
                            .get("x-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        seen.lock().unwrap().push((key, body));
                        let (status, reply) = replies[n.min(replies.len() - 1)].clone();
                        (StatusCode::from_u16(status).unwrap(), Json(reply))
                    }
                }),
            )
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Stub { addr, hits, seen }
    }

    fn provider_for(stub: &Stub) -> AnthropicCompletion {
        AnthropicCompletion::new(
            "test-key",
            Some(format!("http://{}/", stub.addr)),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn text_reply(text: &str) -> Value {
        serde_json::json!({
            "id": "msg_123",
            "type": "message",
            "role": "assistant",
            "content": [{ "type": "text", "text": text }],
            "usage": { "input_tokens": 10, "output_tokens": 8 }
        })
    }

    #[test]
    fn test_api_base_url() {
        let p = AnthropicCompletion::new("k", None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(p.api_base_url(), "https://api.anthropic.com");
        assert_eq!(p.max_retries, 0);

        let p = AnthropicCompletion::new("k", Some("https://proxy.local/".into()), DEFAULT_TIMEOUT)
            .unwrap();
        assert_eq!(p.endpoint(), "https://proxy.local/v1/messages");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let p = AnthropicCompletion::new("sk-secret", None, DEFAULT_TIMEOUT).unwrap();
        let debug = format!("{:?}", p);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_build_request_body() {
        let p = AnthropicCompletion::new("k", None, DEFAULT_TIMEOUT).unwrap();
        let body = p.build_request_body(&request());
        assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["temperature"], 0.8);
        assert_eq!(body["system"], "Be concise.");
        assert_eq!(
            body["messages"],
            serde_json::json!([
                {"role": "user", "content": "a"},
                {"role": "assistant", "content": "b"},
                {"role": "user", "content": "c"},
            ])
        );
    }

    #[test]
    fn test_parse_response_concatenates_text_blocks() {
        let response = serde_json::json!({
            "type": "message",
            "content": [
                { "type": "thinking", "thinking": "hmm" },
                { "type": "text", "text": "Hello" },
                { "type": "text", "text": ", world" }
            ]
        });
        let text = AnthropicCompletion::parse_response(&response).unwrap();
        assert_eq!(text, "Hello, world");
    }

    #[test]
    fn test_parse_response_without_text_block() {
        let response = serde_json::json!({
            "type": "message",
            "content": [{ "type": "tool_use", "id": "t", "name": "x", "input": {} }]
        });
        assert!(matches!(
            AnthropicCompletion::parse_response(&response),
            Err(ProviderError::NoTextContent)
        ));

        let empty = serde_json::json!({ "type": "message", "content": [] });
        assert!(matches!(
            AnthropicCompletion::parse_response(&empty),
            Err(ProviderError::NoTextContent)
        ));
    }

    #[test]
    fn test_parse_response_error_object_and_missing_content() {
        let err = serde_json::json!({
            "type": "error",
            "error": { "type": "invalid_request_error", "message": "bad model" }
        });
        match AnthropicCompletion::parse_response(&err) {
            Err(ProviderError::Api { message, .. }) => assert_eq!(message, "bad model"),
            other => panic!("unexpected: {:?}", other),
        }

        let no_content = serde_json::json!({ "type": "message" });
        assert!(matches!(
            AnthropicCompletion::parse_response(&no_content),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_sends_headers_and_body() {
        let stub = spawn_stub(vec![(200, text_reply("반갑습니다."))]).await;
        let provider = provider_for(&stub);

        let text = provider.complete(&request()).await.unwrap();
        assert_eq!(text, "반갑습니다.");

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0.as_deref(), Some("test-key"));
        assert_eq!(seen[0].1["system"], "Be concise.");
        assert_eq!(seen[0].1["messages"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let stub = spawn_stub(vec![(
            401,
            serde_json::json!({
                "type": "error",
                "error": { "type": "authentication_error", "message": "invalid x-api-key" }
            }),
        )])
        .await;
        let provider = provider_for(&stub).with_max_retries(3);

        match provider.complete(&request()).await {
            Err(ProviderError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "invalid x-api-key");
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_by_default() {
        let stub = spawn_stub(vec![(503, serde_json::json!({}))]).await;
        let provider = provider_for(&stub);

        assert!(matches!(
            provider.complete(&request()).await,
            Err(ProviderError::Server { status: 503 })
        ));
        assert_eq!(stub.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_after_server_error() {
        let stub = spawn_stub(vec![
            (500, serde_json::json!({})),
            (200, text_reply("second time")),
        ])
        .await;
        let provider = provider_for(&stub).with_max_retries(1);

        let text = provider.complete(&request()).await.unwrap();
        assert_eq!(text, "second time");
        assert_eq!(stub.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let provider = AnthropicCompletion::new(
            "k",
            Some("http://127.0.0.1:1".to_string()),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = provider.complete(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
