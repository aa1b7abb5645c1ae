//! Fallback table - canned per-persona replies used when the provider fails.

use std::collections::HashMap;

/// Reply used for a registered persona that has no fallback entry.
pub const DEFAULT_FALLBACK: &str = "흥미로운 이야기네요.";

/// Immutable mapping from persona id to a fixed fallback sentence.
#[derive(Debug, Clone)]
pub struct FallbackTable {
    entries: HashMap<String, String>,
    default_reply: String,
}

impl FallbackTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            default_reply: DEFAULT_FALLBACK.to_string(),
        }
    }

    /// Exact entry for `persona_id`, if any.
    pub fn get(&self, persona_id: &str) -> Option<&str> {
        self.entries.get(persona_id).map(String::as_str)
    }

    /// Entry for `persona_id`, or the generic default sentence.
    pub fn resolve(&self, persona_id: &str) -> &str {
        self.get(persona_id).unwrap_or(self.default_reply.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::new(Vec::<(String, String)>::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_and_default() {
        let table = FallbackTable::new([("a", "canned a")]);
        assert_eq!(table.resolve("a"), "canned a");
        assert_eq!(table.get("b"), None);
        assert_eq!(table.resolve("b"), DEFAULT_FALLBACK);
    }

    #[test]
    fn test_empty_table_always_defaults() {
        let table = FallbackTable::default();
        assert!(table.is_empty());
        assert_eq!(table.resolve("anything"), "흥미로운 이야기네요.");
    }
}
