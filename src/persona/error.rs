//! Persona catalog errors.

use thiserror::Error;

/// Errors that can occur while loading or validating a persona set.
#[derive(Debug, Error)]
pub enum PersonaError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persona definition validation failed.
    #[error("Validation error: {0}")]
    Validation(String),
}
