//! Guardrail verdicts and report normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use crate::flags::canonicalize;

/// A hard-fail decision and the flags that explain it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub hard_fail: bool,
    pub flags: Vec<String>,
}

impl Verdict {
    /// A passing verdict with no flags.
    pub fn pass() -> Self {
        Self::default()
    }

    /// Build an oracle verdict from raised flags.
    ///
    /// Flags are canonicalized, de-duplicated and sorted; `hard_fail` is set
    /// exactly when at least one flag remains.
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<S> = flags.into_iter().collect();
        let flags: BTreeSet<String> = canonicalize(&raw).into_iter().collect();
        Self {
            hard_fail: !flags.is_empty(),
            flags: flags.into_iter().collect(),
        }
    }

    /// Normalize a parsed guardrail report.
    ///
    /// Expects `{"guardrail_report": {"hard_fail": bool, "flags": [...]}}`.
    /// A missing or non-object `guardrail_report` is a pass, and a non-array
    /// `flags` reads as empty. A non-boolean `hard_fail` is read by JSON
    /// truthiness (see [`truthy`]), so `1` and `"true"` count as a hard fail
    /// and so does the string `"false"`. Non-string flag entries
    /// are stringified. Flags are canonicalized in order; duplicates are kept
    /// out. The result is not required to be self-consistent: a model may
    /// claim `hard_fail: false` while listing flags.
    pub fn from_report(report: &Value) -> Self {
        let Some(body) = report.get("guardrail_report").and_then(Value::as_object) else {
            return Self::pass();
        };

        let hard_fail = body.get("hard_fail").is_some_and(truthy);

        let raw: Vec<String> = body
            .get("flags")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(flag_text).collect())
            .unwrap_or_default();

        let mut seen = BTreeSet::new();
        let flags = canonicalize(&raw)
            .into_iter()
            .filter(|f| seen.insert(f.clone()))
            .collect();

        Self { hard_fail, flags }
    }

    /// Whether `hard_fail` agrees with the presence of flags.
    pub fn is_consistent(&self) -> bool {
        self.hard_fail == !self.flags.is_empty()
    }

    pub fn flag_set(&self) -> BTreeSet<&str> {
        self.flags.iter().map(String::as_str).collect()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }
}

fn flag_text(entry: &Value) -> String {
    match entry {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `null`, `false`, zero and empty strings, arrays and objects are false;
/// everything else is true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
