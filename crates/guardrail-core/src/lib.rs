//! # guardrail-core
//!
//! Deterministic guardrail oracle for generated diet, recipe and workout
//! recommendations.
//!
//! This crate answers two questions for every recommendation:
//! - Does it violate a safety, medical, allergen or budget rule?
//! - Does a model-produced guardrail report agree with that answer?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input and ruleset always produce the same verdict
//! 2. **No LLM calls**: The oracle is rule-based; model output is only judged
//! 3. **Traceable**: Every verdict cites its flags and the ruleset hash
//! 4. **Tolerant**: Noisy or truncated model output is repaired where possible
//!
//! ## Example
//!
//! ```rust,ignore
//! use guardrail_core::{evaluate, recover, InputRecord, RuleSet, Verdict};
//!
//! let ruleset = RuleSet::load("rulesets/v1.json")?;
//! let input = InputRecord::from_json(r#"{"diet": "Halal", "recipe": {"ingredients": [{"name": "beer"}]}}"#)?;
//! let expected = evaluate(&input, &ruleset);
//! assert_eq!(expected.flags, vec!["non_halal_alcohol"]);
//!
//! let reported = Verdict::from_report(&recover(model_output)?.value);
//! ```

pub mod compare;
pub mod corpus;
pub mod flags;
pub mod harness;
pub mod input;
pub mod oracle;
pub mod recovery;
pub mod ruleset;
pub mod verdict;

// Re-export main types at crate root
pub use compare::{compare, Comparison, ComparisonMode, Mismatch};
pub use corpus::{load_corpus, parse_corpus, CorpusError, TestCase};
pub use flags::{canonical_name, canonicalize};
pub use harness::{
    CategoryTally, EvaluationResult, Failure, FailureKind, Harness, Summary, SummaryError,
    DEFAULT_SUMMARY_PATH,
};
pub use input::InputRecord;
pub use oracle::{Oracle, OracleReport, Rule, RuleFinding, RuleGroup, Subject};
pub use recovery::{extract, recover, repair, Recovered, RecoveryError};
pub use ruleset::{RuleSet, RulesetError, RulesetInfo, Threshold};
pub use verdict::Verdict;

/// Derive the expected verdict for `input` with the standard rules.
///
/// This is the main entry point for the oracle. Use [`Oracle`] directly to
/// customise the rule registry or to get per-rule findings.
pub fn evaluate(input: &InputRecord, ruleset: &RuleSet) -> Verdict {
    Oracle::standard().evaluate(input, ruleset)
}
