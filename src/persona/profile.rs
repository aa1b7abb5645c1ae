//! Persona and display profile types.
//!
//! A [`Persona`] is the immutable unit the response pipeline works with: a
//! lookup key, the system prompt sent to the provider, and the prefill text
//! glued in front of every generated reply.  The [`PersonaProfile`] carries
//! the display metadata clients render on the character selection screen.

use serde::{Deserialize, Serialize};

/// Display metadata for a persona.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaProfile {
    /// Display name (e.g. `"Alex"`).
    #[serde(default)]
    pub name: String,
    /// Short role label.
    #[serde(default)]
    pub role: String,
    /// One-paragraph description.
    #[serde(default)]
    pub description: String,
    /// Trait badges.
    #[serde(default)]
    pub traits: Vec<String>,
    /// Avatar glyph.
    #[serde(default)]
    pub avatar: String,
}

/// A conversational role with a fixed system prompt and prefill fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Unique lookup key.
    pub id: String,
    /// System prompt forwarded to the provider on every turn.
    pub system_prompt: String,
    /// Text prepended verbatim to every provider reply.
    pub prefill_text: String,
    /// Display metadata.
    pub profile: PersonaProfile,
}

impl Persona {
    pub fn new(
        id: impl Into<String>,
        system_prompt: impl Into<String>,
        prefill_text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            system_prompt: system_prompt.into(),
            prefill_text: prefill_text.into(),
            profile: PersonaProfile::default(),
        }
    }

    /// Attach display metadata.
    pub fn with_profile(mut self, profile: PersonaProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Name shown to users, falling back to the id when no profile name is set.
    pub fn display_name(&self) -> &str {
        if self.profile.name.trim().is_empty() {
            &self.id
        } else {
            &self.profile.name
        }
    }

    /// Opening line a client shows before the first turn.
    ///
    /// Never forwarded to the provider as history.
    pub fn greeting(&self) -> String {
        format!(
            "안녕하세요! 저는 {}입니다. 함께 편안하고 안전한 대화를 나눠봐요. 궁금한 것이 있거나 불편하면 언제든 말해주세요.",
            self.display_name()
        )
    }
}
