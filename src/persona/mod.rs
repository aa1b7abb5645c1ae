//! Persona system - who the service can speak as.
//!
//! ```text
//! PersonaCatalog (builtin set or YAML file)
//!   ├─ PersonaRegistry  id → Persona { system_prompt, prefill_text, profile }
//!   └─ FallbackTable    id → canned sentence (used on provider failure)
//! ```
//!
//! Both tables are built once at startup and never mutated afterwards.

pub mod catalog;
pub mod error;
pub mod fallback;
pub mod profile;
pub mod registry;

pub use catalog::{PersonaCatalog, PersonaDef, PersonaFile};
pub use error::PersonaError;
pub use fallback::{FallbackTable, DEFAULT_FALLBACK};
pub use profile::{Persona, PersonaProfile};
pub use registry::PersonaRegistry;
