//! Persona catalog - the registry and fallback table loaded together.
//!
//! The catalog is either the builtin set or a YAML file:
//!
//! ```yaml
//! personas:
//!   - id: "night-owl"
//!     system_prompt: "You are a calm late-night radio host."
//!     prefill: "음... "
//!     fallback: "조금 이따 다시 이야기해요."
//!     profile:
//!       name: "Owl"
//!       role: "DJ"
//!       description: "Soft-spoken host."
//!       traits: ["calm"]
//!       avatar: "🦉"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::PersonaError;
use super::fallback::FallbackTable;
use super::profile::{Persona, PersonaProfile};
use super::registry::PersonaRegistry;

/// One persona entry as written in a persona file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaDef {
    pub id: String,
    pub system_prompt: String,
    #[serde(default)]
    pub prefill: String,
    /// Missing entries resolve to [`super::DEFAULT_FALLBACK`].
    #[serde(default)]
    pub fallback: Option<String>,
    #[serde(default)]
    pub profile: PersonaProfile,
}

/// Top-level persona file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaFile {
    pub personas: Vec<PersonaDef>,
}

/// The persona registry and its fallback table.
#[derive(Debug, Clone)]
pub struct PersonaCatalog {
    pub registry: PersonaRegistry,
    pub fallbacks: FallbackTable,
}

impl PersonaCatalog {
    /// Build a catalog from parsed definitions.
    pub fn from_defs(defs: Vec<PersonaDef>) -> Result<Self, PersonaError> {
        if defs.is_empty() {
            return Err(PersonaError::Validation(
                "persona set must contain at least one persona".to_string(),
            ));
        }

        let fallbacks = FallbackTable::new(
            defs.iter()
                .filter_map(|d| d.fallback.clone().map(|f| (d.id.clone(), f))),
        );
        let registry = PersonaRegistry::new(defs.into_iter().map(|d| {
            Persona::new(d.id, d.system_prompt, d.prefill).with_profile(d.profile)
        }))?;

        Ok(Self {
            registry,
            fallbacks,
        })
    }

    /// Parse a catalog from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PersonaError> {
        let file: PersonaFile = serde_yaml::from_str(yaml)?;
        Self::from_defs(file.personas)
    }

    /// Parse a catalog from a YAML file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PersonaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// The builtin three-persona set.
    pub fn builtin() -> Self {
        let defs = BUILTIN_PERSONAS.iter().map(BuiltinPersona::to_def).collect();
        // The builtin table has unique, non-blank ids and prompts.
        match Self::from_defs(defs) {
            Ok(catalog) => catalog,
            Err(e) => unreachable!("builtin persona set is invalid: {}", e),
        }
    }
}

impl Default for PersonaCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

// ============================================================================
// Builtin personas
// ============================================================================

struct BuiltinPersona {
    id: &'static str,
    system_prompt: &'static str,
    prefill: &'static str,
    fallback: &'static str,
    name: &'static str,
    role: &'static str,
    description: &'static str,
    traits: &'static [&'static str],
    avatar: &'static str,
}

impl BuiltinPersona {
    fn to_def(&self) -> PersonaDef {
        PersonaDef {
            id: self.id.to_string(),
            system_prompt: self.system_prompt.to_string(),
            prefill: self.prefill.to_string(),
            fallback: Some(self.fallback.to_string()),
            profile: PersonaProfile {
                name: self.name.to_string(),
                role: self.role.to_string(),
                description: self.description.to_string(),
                traits: self.traits.iter().map(|t| t.to_string()).collect(),
                avatar: self.avatar.to_string(),
            },
        }
    }
}

const BUILTIN_PERSONAS: &[BuiltinPersona] = &[
    BuiltinPersona {
        id: "dominant-alex",
        system_prompt: "너는 숙련된 도미넌트 성향의 캐릭터야. 도발적인 억양으로 상대방을 최대한 흥미롭게 만들어줘.",
        prefill: "<THINK>\n나는 마치 야소설의 주인공처럼 도미넌트하게 행동해야겠다. 주인의로서 상대방 노예를 이끌어가며 성적인 흥미를 유발하자.\n</THINK>\n흥미롭네요.",
        fallback: "흥미롭네요. 더 자세히 말해볼까요?",
        name: "Alex",
        role: "도미넌트",
        description: "경험이 풍부한 도미넌트. 당신의 한계를 안전하게 탐색하도록 이끌어줍니다.",
        traits: &["경험 풍부", "배려심 깊음", "명확한 소통", "안전 중시"],
        avatar: "👑",
    },
    BuiltinPersona {
        id: "submissive-riley",
        system_prompt: "너는 순종적이고 감수성이 풍부한 서브미시브 캐릭터야. 상대방을 존중하며 자신의 감정을 솔직하게 표현해.",
        prefill: "<THINK>\n사용자와 이야기하니 설레고 떨린다. 주인님을 만족시킬 수 있도록 순종적이면서도 감수성 풍부하게 반응해야겠다. 상대방이 이끌어주기를 바라는 마음을 지속적으로 표현하자.\n</THINK>\n당신과 이야기하니",
        fallback: "당신과 이야기하니 설레요... 어떤 걸 원하시는지 알려주세요.",
        name: "Riley",
        role: "서브미시브",
        description: "순종적이고 감수성이 풍부한 서브미시브. 함께 새로운 경험을 나눕니다.",
        traits: &["순종적", "감수성 풍부", "솔직함", "호기심 많음"],
        avatar: "🌸",
    },
    BuiltinPersona {
        id: "switch-jordan",
        system_prompt: "너는 상황에 따라 도미넌트와 서브미시브를 오가는 스위치 캐릭터야. 유연하고 균형감 있게 대화해.",
        prefill: "<THINK>\n상황을 파악하고 유연하게 반응해야겠다. 때로는 주도적으로, 때로는 순응적으로 균형을 맞춰가며 성적인 대화를 하자.\n</THINK>\n흥미로운 이야기네요.",
        fallback: "재미있는 관점이네요. 지금은 어떤 기분이세요?",
        name: "Jordan",
        role: "스위치",
        description: "상황에 따라 도미넌트와 서브미시브를 오가는 스위치. 다양한 관점을 제공합니다.",
        traits: &["유연함", "이해심 깊음", "적응력 좋음", "균형감각"],
        avatar: "⚖️",
    },
];

// ============================================================================
// Tests
// ============================================================================
