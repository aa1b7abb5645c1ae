//! Response pipeline - persona lookup, provider call, prefill, fallback.
//!
//! Per request:
//! 1. Resolve the persona (unknown id is [`ChatError::UnknownPersona`])
//! 2. Forward history (windowed, order preserved) plus the new user turn
//! 3. Call the provider once with the persona's system prompt
//! 4. Success: `prefill_text + provider_text.trim()`, no separator
//! 5. Any provider failure: the persona's fallback sentence

use std::sync::Arc;

use super::error::ChatError;
use super::history::HistoryWindow;
use super::turn::{ConversationRequest, ConversationTurn, GeneratedReply};
use crate::llms::{ChatProvider, GenerationParams, ProviderError, ProviderRequest};
use crate::persona::{FallbackTable, Persona, PersonaCatalog, PersonaRegistry};

/// Join a persona's prefill and the provider text.
///
/// Only the provider text is trimmed; the prefill is kept byte-for-byte.
pub fn compose_reply(prefill: &str, provider_text: &str) -> String {
    let trimmed = provider_text.trim();
    let mut reply = String::with_capacity(prefill.len() + trimmed.len());
    reply.push_str(prefill);
    reply.push_str(trimmed);
    reply
}

/// Stateless pipeline shared by all requests.
#[derive(Debug, Clone)]
pub struct ResponsePipeline {
    registry: Arc<PersonaRegistry>,
    fallbacks: Arc<FallbackTable>,
    provider: Arc<dyn ChatProvider>,
    params: GenerationParams,
    history_window: HistoryWindow,
}

impl ResponsePipeline {
    pub fn new(
        catalog: PersonaCatalog,
        provider: Arc<dyn ChatProvider>,
        params: GenerationParams,
    ) -> Self {
        Self {
            registry: Arc::new(catalog.registry),
            fallbacks: Arc::new(catalog.fallbacks),
            provider,
            params,
            history_window: HistoryWindow::default(),
        }
    }

    pub fn with_history_window(mut self, window: HistoryWindow) -> Self {
        self.history_window = window;
        self
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Resolve a persona id.
    pub fn persona(&self, persona_id: &str) -> Result<&Persona, ChatError> {
        self.registry
            .lookup(persona_id)
            .ok_or_else(|| ChatError::UnknownPersona(persona_id.to_string()))
    }

    /// Provider message list: windowed history followed by the new user turn.
    pub fn build_messages(
        &self,
        history: &[ConversationTurn],
        new_message: &str,
    ) -> Vec<ConversationTurn> {
        let window = self.history_window.apply(history);
        if window.len() < history.len() {
            log::debug!(
                "History window dropped {} of {} turns",
                history.len() - window.len(),
                history.len()
            );
        }
        let mut messages = Vec::with_capacity(window.len() + 1);
        messages.extend_from_slice(window);
        messages.push(ConversationTurn::user(new_message));
        messages
    }

    /// Fallback policy: map any provider failure to the persona's canned reply.
    pub fn recover(&self, persona_id: &str, error: &ProviderError) -> GeneratedReply {
        log::error!(
            "Provider '{}' failed for persona '{}', using fallback: {}",
            self.provider.provider(),
            persona_id,
            error
        );
        if let ProviderError::Api { status, message } = error {
            log::error!("API error status: {}, message: {}", status, message);
        }
        GeneratedReply::fallback(self.fallbacks.resolve(persona_id))
    }

    /// Generate a persona reply.
    ///
    /// Fails only with [`ChatError::UnknownPersona`]; provider failures come
    /// back as a fallback reply.
    pub async fn generate_response(
        &self,
        persona_id: &str,
        new_message: &str,
        history: &[ConversationTurn],
    ) -> Result<GeneratedReply, ChatError> {
        let persona = self.persona(persona_id)?;

        let request = ProviderRequest {
            system: persona.system_prompt.clone(),
            messages: self.build_messages(history, new_message),
            params: self.params.clone(),
        };

        match self.provider.complete(&request).await {
            Ok(text) => Ok(GeneratedReply::generated(compose_reply(
                &persona.prefill_text,
                &text,
            ))),
            Err(e) => Ok(self.recover(persona_id, &e)),
        }
    }

    /// [`Self::generate_response`] for a validated request.
    pub async fn handle(&self, request: &ConversationRequest) -> Result<GeneratedReply, ChatError> {
        self.generate_response(&request.persona_id, &request.new_message, &request.history)
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
