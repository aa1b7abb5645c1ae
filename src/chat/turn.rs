//! Conversation data model.

use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn.
///
/// Closed set: any other role value is rejected at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged message.  Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// One validated chat request.  Exists only for the duration of a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRequest {
    pub persona_id: String,
    pub new_message: String,
    /// Oldest first.
    pub history: Vec<ConversationTurn>,
}

/// Final text handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedReply {
    pub text: String,
    /// Whether the text came from the fallback table instead of the provider.
    #[serde(skip)]
    pub degraded: bool,
}

impl GeneratedReply {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            degraded: false,
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            degraded: true,
        }
    }
}
