//! Scripted provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::error::ProviderError;
use super::provider::{ChatProvider, ProviderRequest};

/// Canned outcome of one `complete` call.
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    RateLimited,
    NoText,
    Api(u16, String),
}

impl Scripted {
    fn into_result(self) -> Result<String, ProviderError> {
        match self {
            Scripted::Text(t) => Ok(t),
            Scripted::RateLimited => Err(ProviderError::RateLimited { retry_after: None }),
            Scripted::NoText => Err(ProviderError::NoTextContent),
            Scripted::Api(status, message) => Err(ProviderError::Api { status, message }),
        }
    }
}

/// Returns scripted outcomes in order and records every request.
///
/// Once the script runs out the last outcome repeats.
#[derive(Debug)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Option<Scripted>>,
    pub requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new([Scripted::Text(text.to_string())])
    }

    pub fn failing(outcome: Scripted) -> Self {
        Self::new([outcome])
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn provider(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        let outcome = match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last
                .clone()
                .unwrap_or_else(|| Scripted::Api(500, "empty script".to_string())),
        };
        outcome.into_result()
    }
}
