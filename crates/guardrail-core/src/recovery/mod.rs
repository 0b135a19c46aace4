//! Recovering a JSON report from free-form model output.
//!
//! Model output is rarely clean: prose before and after the object, markdown
//! fences, truncated brackets, trailing commas, keyed entries inside the
//! `flags` array. Recovery is two-staged:
//!
//! 1. [`extract`]: the span from the first `{` to the last `}`, parsed as is.
//! 2. [`repair`]: a bracket-balancing scan that closes what was left open,
//!    drops trailing commas and rewrites keyed flag entries, then parses.
//!
//! Both stages report [`RecoveryError::JsonNotFound`] when the text contains
//! no `{` at all, distinct from [`RecoveryError::JsonMalformed`].

mod flag_entries;
mod scanner;

use serde_json::Value;
use thiserror::Error;

/// Why no JSON object could be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecoveryError {
    #[error("no-json-braces: output contains no JSON object")]
    JsonNotFound,

    #[error("malformed JSON after repair: {0}")]
    JsonMalformed(String),
}

impl RecoveryError {
    /// Short stable reason code for summaries and logs.
    pub fn code(&self) -> &'static str {
        match self {
            RecoveryError::JsonNotFound => "no-json-braces",
            RecoveryError::JsonMalformed(_) => "json-malformed",
        }
    }
}

/// A recovered object and whether the repair pass was needed.
#[derive(Debug, Clone, PartialEq)]
pub struct Recovered {
    pub value: Value,
    pub repaired: bool,
}

/// Parse the span from the first `{` to the last `}`; fall back to
/// [`repair`] when that span is absent or does not parse.
pub fn extract(text: &str) -> Result<Value, RecoveryError> {
    recover(text).map(|r| r.value)
}

/// Balance, clean and parse the first object in `text`.
pub fn repair(text: &str) -> Result<Value, RecoveryError> {
    let balanced = scanner::balance(text).ok_or(RecoveryError::JsonNotFound)?;
    let cleaned = scanner::strip_trailing_commas(&balanced);
    let normalized = flag_entries::normalize_flag_entries(&cleaned);

    serde_json::from_str(&normalized).map_err(|e| RecoveryError::JsonMalformed(e.to_string()))
}

/// [`extract`] with provenance: reports whether the repair pass ran.
pub fn recover(text: &str) -> Result<Recovered, RecoveryError> {
    let Some(start) = text.find('{') else {
        return Err(RecoveryError::JsonNotFound);
    };

    if let Some(end) = text.rfind('}').filter(|end| *end > start) {
        if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
            return Ok(Recovered {
                value,
                repaired: false,
            });
        }
    }

    tracing::debug!("Direct parse failed, repairing");
    repair(text).map(|value| Recovered {
        value,
        repaired: true,
    })
}
