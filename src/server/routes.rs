//! Axum route handlers for the rolechat HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`              - Returns `{"status": "ok", "version": ..., "model": ...}`
//! - `POST /api/chat`            - Accepts `{characterId, message, conversationHistory?}`
//! - `GET  /api/characters`      - List personas with display metadata
//! - `GET  /api/characters/:id`  - One persona's display metadata

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chat::{
    ChatError, ConversationRequest, ConversationTurn, ResponsePipeline, ValidationError,
};
use crate::persona::Persona;

/// Longest message prefix written to error logs.
const LOG_MESSAGE_CHARS: usize = 80;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResponsePipeline>,
}

impl AppState {
    pub fn new(pipeline: ResponsePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/characters", get(list_characters_handler))
        .route("/api/characters/:id", get(get_character_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Raw `POST /api/chat` body.
///
/// Fields stay untyped until [`ChatPayload::validate`] so every malformed
/// shape maps to the same error response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    #[serde(default)]
    pub character_id: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub conversation_history: Option<Value>,
}

impl ChatPayload {
    /// Parse a request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body).map_err(|_| ValidationError::InvalidBody)
    }

    /// Check required fields and history shape.
    pub fn validate(self) -> Result<ConversationRequest, ValidationError> {
        let persona_id = non_empty_string(self.character_id)?;
        let new_message = non_empty_string(self.message)?;

        let history = match self.conversation_history {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    serde_json::from_value::<ConversationTurn>(item).map_err(|e| {
                        ValidationError::InvalidHistory(format!("item {}: {}", i, e))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => {
                return Err(ValidationError::InvalidHistory(
                    "expected an array".to_string(),
                ))
            }
        };

        Ok(ConversationRequest {
            persona_id,
            new_message,
            history,
        })
    }
}

fn non_empty_string(value: Option<Value>) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s),
        _ => Err(ValidationError::MissingFields),
    }
}

/// `POST /api/chat` success body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// One entry of the character listing.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterSummary {
    pub id: String,
    pub name: String,
    pub role: String,
    pub description: String,
    pub traits: Vec<String>,
    pub avatar: String,
    pub greeting: String,
}

impl From<&Persona> for CharacterSummary {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id.clone(),
            name: persona.display_name().to_string(),
            role: persona.profile.role.clone(),
            description: persona.profile.description.clone(),
            traits: persona.profile.traits.clone(),
            avatar: persona.profile.avatar.clone(),
            greeting: persona.greeting(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

type ApiError = (StatusCode, Json<Value>);

fn error_response(err: &ChatError) -> ApiError {
    match err {
        ChatError::Validation(ValidationError::InvalidBody) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid request body"})),
        ),
        ChatError::Validation(ValidationError::MissingFields) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Missing required fields"})),
        ),
        ChatError::Validation(ValidationError::InvalidHistory(detail)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Invalid conversation history",
                "detail": detail,
            })),
        ),
        ChatError::UnknownPersona(id) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Unknown character",
                "characterId": id,
            })),
        ),
        ChatError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Internal server error"})),
        ),
    }
}

/// First [`LOG_MESSAGE_CHARS`] characters of `message`.
fn truncate_for_log(message: &str) -> String {
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(LOG_MESSAGE_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /health - liveness probe.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "rolechat",
        "model": state.pipeline.params().model,
    }))
}

/// POST /api/chat - one conversation turn.
///
/// Request:  `{ "characterId": str, "message": str, "conversationHistory"?: [{role, content}] }`
/// Response: `{ "response": str }`
///
/// Provider failures never reach this handler; the pipeline turns them into
/// the persona's fallback sentence.
async fn chat_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let request = ChatPayload::from_slice(&body)
        .and_then(ChatPayload::validate)
        .map_err(|e| {
            tracing::debug!("Rejected chat request: {}", e);
            error_response(&ChatError::Validation(e))
        })?;

    let persona_id = request.persona_id.clone();
    let message_preview = truncate_for_log(&request.new_message);

    // Run on its own task so a panic inside the pipeline becomes a 500.
    let pipeline = state.pipeline.clone();
    let result = tokio::spawn(async move { pipeline.handle(&request).await })
        .await
        .unwrap_or_else(|join_error| {
            Err(ChatError::Internal(format!(
                "pipeline task failed: {}",
                join_error
            )))
        });

    match result {
        Ok(reply) => {
            if reply.degraded {
                tracing::warn!(character_id = %persona_id, "Served fallback reply");
            }
            Ok(Json(ChatResponse {
                response: reply.text,
            }))
        }
        Err(err @ ChatError::UnknownPersona(_)) => {
            tracing::warn!(
                character_id = %persona_id,
                message = %message_preview,
                "Chat request for unknown character"
            );
            Err(error_response(&err))
        }
        Err(err) => {
            tracing::error!(
                character_id = %persona_id,
                message = %message_preview,
                error = %err,
                "Chat API error"
            );
            Err(error_response(&err))
        }
    }
}

/// GET /api/characters - list personas in registry order.
async fn list_characters_handler(State(state): State<AppState>) -> Json<Value> {
    let characters: Vec<CharacterSummary> = state
        .pipeline
        .registry()
        .iter()
        .map(CharacterSummary::from)
        .collect();
    Json(serde_json::json!({ "characters": characters }))
}

/// GET /api/characters/:id - one persona.
async fn get_character_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CharacterSummary>, ApiError> {
    state
        .pipeline
        .registry()
        .lookup(&id)
        .map(|persona| Json(CharacterSummary::from(persona)))
        .ok_or_else(|| error_response(&ChatError::UnknownPersona(id)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
