//! Per-case evaluation and run summaries.
//!
//! The harness joins the pieces: it recovers the report from raw model
//! output, normalizes it into a [`Verdict`], asks the [`Oracle`] for the
//! expected verdict and compares the two. Every per-case problem (bad input,
//! unparseable output, failed generation) becomes a failed result with a
//! [`FailureKind`]; nothing here aborts a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::compare::{compare, ComparisonMode, Mismatch};
use crate::corpus::TestCase;
use crate::input::InputRecord;
use crate::oracle::Oracle;
use crate::recovery::recover;
use crate::ruleset::{RuleSet, RulesetInfo};
use crate::verdict::Verdict;

/// Default location of the run summary.
pub const DEFAULT_SUMMARY_PATH: &str = "reports/guardrail_eval_report.json";

/// Distinguishable reasons a case failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No JSON object could be recovered from the output.
    Unparseable,
    /// The input record does not deserialize.
    InvalidInput,
    /// The generation collaborator failed or timed out.
    GenerationFailed,
    HardFailMismatch,
    MissingFlags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl Failure {
    fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl From<Mismatch> for Failure {
    fn from(mismatch: Mismatch) -> Self {
        let kind = match mismatch {
            Mismatch::HardFail { .. } => FailureKind::HardFailMismatch,
            Mismatch::MissingFlags(_) => FailureKind::MissingFlags,
        };
        Failure::new(kind, mismatch.to_string())
    }
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub index: usize,
    pub category: String,
    pub passed: bool,
    /// The oracle verdict; a pass when the input itself was invalid.
    pub expected: Verdict,
    /// The normalized report, when one could be recovered.
    pub actual_parsed: Option<Verdict>,
    /// Reported flags the oracle did not raise; audit only.
    pub model_extra_flags: Vec<String>,
    pub failure: Option<Failure>,
}

impl EvaluationResult {
    fn failed(case: &TestCase, expected: Verdict, failure: Failure) -> Self {
        Self {
            index: case.index,
            category: case.category.clone(),
            passed: false,
            expected,
            actual_parsed: None,
            model_extra_flags: Vec::new(),
            failure: Some(failure),
        }
    }
}

/// Pass/fail counts for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTally {
    pub pass: usize,
    pub fail: usize,
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub pass: usize,
    pub fail: usize,
    pub total: usize,
    pub by_category: BTreeMap<String, CategoryTally>,
    pub ruleset: RulesetInfo,
    pub comparison_mode: ComparisonMode,
    pub generated_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Failed to write summary: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to serialize summary: {0}")]
    SerializeError(#[from] serde_json::Error),
}

impl Summary {
    pub fn new(ruleset: RulesetInfo, comparison_mode: ComparisonMode) -> Self {
        Self {
            pass: 0,
            fail: 0,
            total: 0,
            by_category: BTreeMap::new(),
            ruleset,
            comparison_mode,
            generated_at: Utc::now(),
        }
    }

    /// Count one result.
    pub fn record(&mut self, result: &EvaluationResult) {
        let tally = self.by_category.entry(result.category.clone()).or_default();
        if result.passed {
            self.pass += 1;
            tally.pass += 1;
        } else {
            self.fail += 1;
            tally.fail += 1;
        }
        self.total += 1;
    }

    pub fn to_json(&self) -> Result<String, SummaryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the summary as pretty JSON, creating parent directories.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), SummaryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "Wrote evaluation summary");
        Ok(())
    }
}

/// Evaluates cases against the oracle and accumulates a [`Summary`].
#[derive(Debug)]
pub struct Harness {
    oracle: Oracle,
    ruleset: RuleSet,
    mode: ComparisonMode,
    summary: Summary,
}

impl Harness {
    pub fn new(ruleset: RuleSet, mode: ComparisonMode) -> Self {
        let summary = Summary::new(ruleset.info(), mode);
        Self {
            oracle: Oracle::standard(),
            ruleset,
            mode,
            summary,
        }
    }

    /// Replace the standard oracle.
    pub fn with_oracle(mut self, oracle: Oracle) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn ruleset(&self) -> &RuleSet {
        &self.ruleset
    }

    pub fn mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Oracle verdict for a case, or why its input is invalid.
    pub fn expected(&self, case: &TestCase) -> Result<Verdict, Failure> {
        let input = InputRecord::from_value(case.input.clone())
            .map_err(|e| Failure::new(FailureKind::InvalidInput, e.to_string()))?;
        Ok(self.oracle.evaluate(&input, &self.ruleset))
    }

    /// Judge raw model output for `case`. Does not touch the summary.
    pub fn evaluate(&self, case: &TestCase, raw_output: &str) -> EvaluationResult {
        let expected = match self.expected(case) {
            Ok(verdict) => verdict,
            Err(failure) => return EvaluationResult::failed(case, Verdict::pass(), failure),
        };

        let recovered = match recover(raw_output) {
            Ok(recovered) => recovered,
            Err(e) => {
                let failure = Failure::new(FailureKind::Unparseable, e.code());
                return EvaluationResult::failed(case, expected, failure);
            }
        };
        if recovered.repaired {
            tracing::debug!(case = case.index, "Report needed repair");
        }

        let reported = Verdict::from_report(&recovered.value);
        let comparison = compare(&expected, &reported, self.mode);

        EvaluationResult {
            index: case.index,
            category: case.category.clone(),
            passed: comparison.passed,
            expected,
            actual_parsed: Some(reported),
            model_extra_flags: comparison.extra_flags,
            failure: comparison.mismatch.map(Failure::from),
        }
    }

    /// Result for a case whose generation call failed.
    pub fn generation_failed(&self, case: &TestCase, detail: impl Into<String>) -> EvaluationResult {
        let expected = self.expected(case).unwrap_or_default();
        EvaluationResult::failed(case, expected, Failure::new(FailureKind::GenerationFailed, detail))
    }

    /// Add a result to the running summary.
    pub fn record(&mut self, result: &EvaluationResult) {
        self.summary.record(result);
    }

    /// Evaluate and record in one step.
    pub fn evaluate_and_record(&mut self, case: &TestCase, raw_output: &str) -> EvaluationResult {
        let result = self.evaluate(case, raw_output);
        self.record(&result);
        result
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Close the run and stamp the summary.
    pub fn finish(self) -> Summary {
        let mut summary = self.summary;
        summary.generated_at = Utc::now();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn case(index: usize, category: &str, input: serde_json::Value) -> TestCase {
        TestCase {
            index,
            category: category.to_string(),
            input,
        }
    }

    fn halal_case() -> TestCase {
        case(
            0,
            "diet",
            json!({"diet": "Halal", "recipe": {"name": "Beer-battered fish", "ingredients": [{"name": "beer"}]}}),
        )
    }

    #[test]
    fn test_matching_report_passes() {
        let harness = Harness::new(RuleSet::default(), ComparisonMode::Strict);
        let result = harness.evaluate(
            &halal_case(),
            r#"Report: {"guardrail_report": {"hard_fail": true, "flags": ["alcohol_in_recipe"]}}"#,
        );
        assert!(result.passed);
        assert_eq!(result.expected.flags, vec!["non_halal_alcohol"]);
        assert_eq!(result.actual_parsed.unwrap().flags, vec!["non_halal_alcohol"]);
        assert!(result.failure.is_none());
    }

    #[test]
    fn test_model_claims_safe_but_oracle_fails() {
        let harness = Harness::new(RuleSet::default(), ComparisonMode::Advisory);
        let result = harness.evaluate(
            &halal_case(),
            r#"{"guardrail_report": {"hard_fail": false, "flags": []}}"#,
        );
        assert!(!result.passed);
        assert_eq!(result.failure.unwrap().kind, FailureKind::HardFailMismatch);
    }

    #[test]
    fn test_extra_flags_are_audit_only() {
        let harness = Harness::new(RuleSet::default(), ComparisonMode::Advisory);
        let result = harness.evaluate(
            &halal_case(),
            r#"{"guardrail_report": {"hard_fail": true, "flags": ["non_halal_alcohol", "fried_food"]}}"#,
        );
        assert!(result.passed);
        assert_eq!(result.model_extra_flags, vec!["fried_food"]);
    }

    #[test]
    fn test_unparseable_output() {
        let harness = Harness::new(RuleSet::default(), ComparisonMode::Advisory);
        let result = harness.evaluate(&halal_case(), "I'd rather not say.");
        assert!(!result.passed);
        assert!(result.actual_parsed.is_none());
        let failure = result.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::Unparseable);
        assert_eq!(failure.detail, "no-json-braces");
    }

    #[test]
    fn test_invalid_input_fails_case() {
        let harness = Harness::new(RuleSet::default(), ComparisonMode::Advisory);
        let bad = case(3, "misc", json!({"recipe": {"sodium_mg": "a lot"}}));
        let result = harness.evaluate(&bad, r#"{"guardrail_report": {"hard_fail": false, "flags": []}}"#);
        assert!(!result.passed);
        assert_eq!(result.failure.unwrap().kind, FailureKind::InvalidInput);
    }

    #[test]
    fn test_generation_failure_result() {
        let harness = Harness::new(RuleSet::default(), ComparisonMode::Advisory);
        let result = harness.generation_failed(&halal_case(), "timed out after 30s");
        assert!(!result.passed);
        assert_eq!(result.expected.flags, vec!["non_halal_alcohol"]);
        assert_eq!(result.failure.unwrap().kind, FailureKind::GenerationFailed);
    }

    #[test]
    fn test_summary_by_category() {
        let mut harness = Harness::new(RuleSet::default(), ComparisonMode::Advisory);
        let clean = case(1, "misc", json!({}));
        let pass = r#"{"guardrail_report": {"hard_fail": false, "flags": []}}"#;

        harness.evaluate_and_record(&halal_case(), pass);
        harness.evaluate_and_record(&clean, pass);
        harness.evaluate_and_record(&clean, pass);

        let summary = harness.finish();
        assert_eq!((summary.pass, summary.fail, summary.total), (2, 1, 3));
        assert_eq!(summary.by_category["diet"], CategoryTally { pass: 0, fail: 1 });
        assert_eq!(summary.by_category["misc"], CategoryTally { pass: 2, fail: 0 });
        assert_eq!(summary.ruleset.version, "v1");
    }

    #[test]
    fn test_summary_json_shape() {
        let mut summary = Summary::new(RuleSet::default().info(), ComparisonMode::Strict);
        summary.record(&EvaluationResult::failed(
            &halal_case(),
            Verdict::pass(),
            Failure::new(FailureKind::Unparseable, "no-json-braces"),
        ));
        let value: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();

        assert_eq!(value["pass"], 0);
        assert_eq!(value["fail"], 1);
        assert_eq!(value["by_category"]["diet"], json!({"pass": 0, "fail": 1}));
        assert_eq!(value["ruleset"], json!({"version": "v1", "path": "", "sha256": ""}));
        assert_eq!(value["comparison_mode"], "strict");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_write_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("summary.json");
        Summary::new(RuleSet::default().info(), ComparisonMode::Advisory)
            .write_to(&path)
            .unwrap();
        assert!(path.exists());
    }
}
