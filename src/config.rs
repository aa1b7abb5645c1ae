//! Service configuration read from the process environment.
//!
//! # Environment Variables
//!
//! - `ANTHROPIC_API_KEY` - provider credential (required)
//! - `PORT` - HTTP port (default: 8080)
//! - `BIND_HOST` - listen address (default: 0.0.0.0)
//! - `ANTHROPIC_BASE_URL` - provider base URL (default: https://api.anthropic.com)
//! - `ROLECHAT_MODEL` - model identifier (default: claude-3-5-sonnet-20241022)
//! - `ROLECHAT_MAX_TOKENS` - maximum output length (default: 2000)
//! - `ROLECHAT_TEMPERATURE` - sampling temperature in `[0, 1]` (default: 0.8)
//! - `ROLECHAT_TIMEOUT_SECS` - per-attempt provider timeout (default: 120)
//! - `ROLECHAT_MAX_RETRIES` - extra attempts on retryable failures (default: 0)
//! - `ROLECHAT_HISTORY_WINDOW` - max history turns forwarded, 0 = all (default: 0)
//! - `ROLECHAT_PERSONA_FILE` - YAML persona file (default: builtin set)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::chat::HistoryWindow;
use crate::llms::{GenerationParams, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

/// Errors raised while reading configuration.  Fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("{0} must be set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed or is out of range.
    #[error("invalid value for {name}: '{value}' ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Fully resolved service configuration.
#[derive(Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub anthropic_api_key: String,
    pub anthropic_base_url: Option<String>,
    pub generation: GenerationParams,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub history_window: HistoryWindow,
    pub persona_file: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("anthropic_api_key", &"<redacted>")
            .field("anthropic_base_url", &self.anthropic_base_url)
            .field("generation", &self.generation)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("history_window", &self.history_window)
            .field("persona_file", &self.persona_file)
            .finish()
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let anthropic_api_key =
            get("ANTHROPIC_API_KEY").ok_or(ConfigError::Missing("ANTHROPIC_API_KEY"))?;

        let temperature: f64 = parse_or(&get, "ROLECHAT_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !(0.0..=1.0).contains(&temperature) {
            return Err(ConfigError::Invalid {
                name: "ROLECHAT_TEMPERATURE",
                value: temperature.to_string(),
                reason: "must be between 0.0 and 1.0".to_string(),
            });
        }

        let max_tokens: u32 = parse_or(&get, "ROLECHAT_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        if max_tokens == 0 {
            return Err(ConfigError::Invalid {
                name: "ROLECHAT_MAX_TOKENS",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let timeout_secs: u64 = parse_or(&get, "ROLECHAT_TIMEOUT_SECS", 120)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "ROLECHAT_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            host: get("BIND_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8080)?,
            anthropic_api_key,
            anthropic_base_url: get("ANTHROPIC_BASE_URL"),
            generation: GenerationParams {
                model: get("ROLECHAT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens,
                temperature,
            },
            request_timeout: Duration::from_secs(timeout_secs),
            max_retries: parse_or(&get, "ROLECHAT_MAX_RETRIES", 0)?,
            history_window: HistoryWindow::from_limit(parse_or(
                &get,
                "ROLECHAT_HISTORY_WINDOW",
                0,
            )?),
            persona_file: get("ROLECHAT_PERSONA_FILE").map(PathBuf::from),
        })
    }

    /// `host:port` to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[("ANTHROPIC_API_KEY", "sk-test")]).unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.generation, GenerationParams::default());
        assert_eq!(cfg.request_timeout, Duration::from_secs(120));
        assert_eq!(cfg.max_retries, 0);
        assert_eq!(cfg.history_window, HistoryWindow::Unbounded);
        assert!(cfg.anthropic_base_url.is_none());
        assert!(cfg.persona_file.is_none());
    }

    #[test]
    fn test_missing_or_blank_api_key_fails_fast() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::Missing("ANTHROPIC_API_KEY"));
        assert_eq!(
            config(&[("ANTHROPIC_API_KEY", "   ")]).unwrap_err(),
            ConfigError::Missing("ANTHROPIC_API_KEY")
        );
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("PORT", "3000"),
            ("BIND_HOST", "127.0.0.1"),
            ("ROLECHAT_MODEL", "claude-test"),
            ("ROLECHAT_MAX_TOKENS", "512"),
            ("ROLECHAT_TEMPERATURE", "0.2"),
            ("ROLECHAT_MAX_RETRIES", "2"),
            ("ROLECHAT_HISTORY_WINDOW", "20"),
            ("ROLECHAT_PERSONA_FILE", "/etc/rolechat/personas.yaml"),
        ])
        .unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:3000");
        assert_eq!(cfg.generation.model, "claude-test");
        assert_eq!(cfg.generation.max_tokens, 512);
        assert_eq!(cfg.generation.temperature, 0.2);
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.history_window, HistoryWindow::Last(20));
        assert_eq!(
            cfg.persona_file,
            Some(PathBuf::from("/etc/rolechat/personas.yaml"))
        );
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = config(&[("ANTHROPIC_API_KEY", "k"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = config(&[("ANTHROPIC_API_KEY", "k"), ("ROLECHAT_TEMPERATURE", "1.5")])
            .unwrap_err();
        assert!(err.to_string().contains("ROLECHAT_TEMPERATURE"));

        let err = config(&[("ANTHROPIC_API_KEY", "k"), ("ROLECHAT_MAX_TOKENS", "0")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ROLECHAT_MAX_TOKENS", .. }));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let cfg = config(&[("ANTHROPIC_API_KEY", "sk-very-secret")]).unwrap();
        assert!(!format!("{:?}", cfg).contains("sk-very-secret"));
    }
}
