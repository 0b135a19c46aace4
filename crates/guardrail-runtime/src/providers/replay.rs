//! Provider that replays recorded model outputs.
//!
//! Line `n` of a responses file answers the `n`-th completion request. A
//! line is either a JSON string (the raw output) or an object whose `raw`
//! field holds it; anything else is taken verbatim. Blank lines are skipped,
//! so the numbering matches the test corpus.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use tracing::debug;

use super::factory::ProviderFactory;
use super::{ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError};

pub struct ReplayProvider {
    responses: Vec<String>,
    cursor: Mutex<usize>,
}

impl ReplayProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            cursor: Mutex::new(0),
        }
    }

    /// Load recorded outputs from a JSON-lines file.
    pub fn from_jsonl(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            ProviderError::NotConfigured(format!(
                "cannot read responses file {}: {}",
                path.display(),
                e
            ))
        })?;
        let responses: Vec<String> = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_line)
            .collect();
        debug!(path = %path.display(), count = responses.len(), "Loaded recorded responses");
        Ok(Self::new(responses))
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Number of responses served so far.
    pub fn served(&self) -> usize {
        *self.cursor.lock()
    }
}

fn parse_line(line: &str) -> String {
    match serde_json::from_str::<JsonValue>(line) {
        Ok(JsonValue::String(raw)) => raw,
        Ok(JsonValue::Object(map)) => match map.get("raw") {
            Some(JsonValue::String(raw)) => raw.clone(),
            _ => line.to_string(),
        },
        _ => line.to_string(),
    }
}

#[async_trait]
impl LlmProvider for ReplayProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let mut cursor = self.cursor.lock();
        let content = self
            .responses
            .get(*cursor)
            .cloned()
            .ok_or(ProviderError::Exhausted { served: *cursor })?;
        *cursor += 1;

        Ok(CompletionResponse {
            content,
            model: config.model.clone(),
            stop_reason: Some("replay".to_string()),
        })
    }

    async fn health_check(&self) -> bool {
        !self.responses.is_empty()
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Factory for [`ReplayProvider`]; config is `{"responses": "<path>"}`.
pub struct ReplayProviderFactory;

impl ProviderFactory for ReplayProviderFactory {
    fn provider_type(&self) -> &'static str {
        "replay"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        match config["responses"].as_str() {
            Some(path) if !path.is_empty() => Ok(Arc::new(ReplayProvider::from_jsonl(path)?)),
            _ => Err(ProviderError::NotConfigured(
                "replay provider requires 'responses' (path to a JSON-lines file)".to_string(),
            )),
        }
    }
}
