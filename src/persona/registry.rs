//! Persona registry - fixed id → persona lookup.
//!
//! Built once at startup and shared read-only between requests.  There is no
//! insertion or removal API; the persona set is configuration.

use std::collections::HashMap;

use super::error::PersonaError;
use super::profile::Persona;

/// Immutable mapping from persona id to [`Persona`].
///
/// Iteration follows the order personas were supplied in, so catalog listings
/// are stable.
#[derive(Debug, Clone, Default)]
pub struct PersonaRegistry {
    personas: HashMap<String, Persona>,
    order: Vec<String>,
}

impl PersonaRegistry {
    /// Build a registry, rejecting blank or duplicate ids and blank system prompts.
    pub fn new(personas: impl IntoIterator<Item = Persona>) -> Result<Self, PersonaError> {
        let mut registry = Self::default();
        for persona in personas {
            if persona.id.trim().is_empty() {
                return Err(PersonaError::Validation(
                    "persona id must not be blank".to_string(),
                ));
            }
            if persona.system_prompt.trim().is_empty() {
                return Err(PersonaError::Validation(format!(
                    "persona '{}' has an empty system prompt",
                    persona.id
                )));
            }
            if registry.personas.contains_key(&persona.id) {
                return Err(PersonaError::Validation(format!(
                    "duplicate persona id '{}'",
                    persona.id
                )));
            }
            registry.order.push(persona.id.clone());
            registry.personas.insert(persona.id.clone(), persona);
        }
        Ok(registry)
    }

    /// Look up a persona by id.
    pub fn lookup(&self, id: &str) -> Option<&Persona> {
        self.personas.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.personas.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Personas in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.order.iter().filter_map(|id| self.personas.get(id))
    }
}
