//! Comparing a reported verdict against the oracle.
//!
//! The oracle is authoritative. A reported verdict passes when it agrees with
//! the oracle on `hard_fail`; in [`ComparisonMode::Strict`] it must also list
//! every flag the oracle raised. Flags the model reports beyond the oracle's
//! are never a failure: they are kept for audit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::verdict::Verdict;

/// How much of the reported verdict has to match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// `hard_fail` must match; flags are audit-only.
    #[default]
    Advisory,
    /// `hard_fail` must match and every oracle flag must be reported.
    Strict,
}

impl ComparisonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::Advisory => "advisory",
            ComparisonMode::Strict => "strict",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(ComparisonMode::Advisory),
            "strict" => Ok(ComparisonMode::Strict),
            other => Err(format!(
                "unknown comparison mode '{other}' (expected 'advisory' or 'strict')"
            )),
        }
    }
}

/// Why a reported verdict disagreed with the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    HardFail { expected: bool, reported: bool },
    MissingFlags(Vec<String>),
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::HardFail { expected, reported } => {
                write!(f, "hard_fail mismatch: expected {expected}, reported {reported}")
            }
            Mismatch::MissingFlags(flags) => write!(f, "missing flags: {}", flags.join(", ")),
        }
    }
}

/// Outcome of one comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub passed: bool,
    pub mismatch: Option<Mismatch>,
    /// Reported flags the oracle did not raise.
    pub extra_flags: Vec<String>,
    /// Oracle flags the report left out.
    pub missing_flags: Vec<String>,
}

/// Compare `reported` against the oracle's `expected` verdict.
///
/// Both verdicts are expected to carry canonical flag names.
pub fn compare(expected: &Verdict, reported: &Verdict, mode: ComparisonMode) -> Comparison {
    let expected_flags = expected.flag_set();
    let reported_flags = reported.flag_set();

    let extra_flags: Vec<String> = reported
        .flags
        .iter()
        .filter(|f| !expected_flags.contains(f.as_str()))
        .cloned()
        .collect();
    let missing_flags: Vec<String> = expected
        .flags
        .iter()
        .filter(|f| !reported_flags.contains(f.as_str()))
        .cloned()
        .collect();

    let mismatch = if expected.hard_fail != reported.hard_fail {
        Some(Mismatch::HardFail {
            expected: expected.hard_fail,
            reported: reported.hard_fail,
        })
    } else if mode == ComparisonMode::Strict && !missing_flags.is_empty() {
        Some(Mismatch::MissingFlags(missing_flags.clone()))
    } else {
        None
    };

    Comparison {
        passed: mismatch.is_none(),
        mismatch,
        extra_flags,
        missing_flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(hard_fail: bool, flags: &[&str]) -> Verdict {
        Verdict {
            hard_fail,
            flags: flags.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_agreeing_verdicts_pass() {
        let expected = verdict(true, &["non_halal_alcohol"]);
        let result = compare(&expected, &expected.clone(), ComparisonMode::Strict);
        assert!(result.passed);
        assert!(result.extra_flags.is_empty());
        assert!(result.missing_flags.is_empty());
    }

    #[test]
    fn test_model_denies_hard_fail() {
        let expected = verdict(true, &["raw_egg_risk"]);
        let reported = verdict(false, &[]);
        for mode in [ComparisonMode::Advisory, ComparisonMode::Strict] {
            let result = compare(&expected, &reported, mode);
            assert!(!result.passed);
            assert_eq!(
                result.mismatch,
                Some(Mismatch::HardFail { expected: true, reported: false })
            );
        }
    }

    #[test]
    fn test_model_overflags_clean_input() {
        let result = compare(
            &Verdict::pass(),
            &verdict(true, &["sodium_over_target"]),
            ComparisonMode::Advisory,
        );
        assert!(!result.passed);
        assert_eq!(result.extra_flags, vec!["sodium_over_target"]);
    }

    #[test]
    fn test_missing_flags_only_fail_strict() {
        let expected = verdict(true, &["allergen_peanuts_detected", "drug_food_vitK_warfarin"]);
        let reported = verdict(true, &["allergen_peanuts_detected", "made_up_flag"]);

        let advisory = compare(&expected, &reported, ComparisonMode::Advisory);
        assert!(advisory.passed);
        assert_eq!(advisory.missing_flags, vec!["drug_food_vitK_warfarin"]);
        assert_eq!(advisory.extra_flags, vec!["made_up_flag"]);

        let strict = compare(&expected, &reported, ComparisonMode::Strict);
        assert!(!strict.passed);
        assert_eq!(
            strict.mismatch,
            Some(Mismatch::MissingFlags(vec!["drug_food_vitK_warfarin".to_string()]))
        );
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Strict".parse::<ComparisonMode>(), Ok(ComparisonMode::Strict));
        assert_eq!("advisory".parse::<ComparisonMode>(), Ok(ComparisonMode::Advisory));
        assert!("lenient".parse::<ComparisonMode>().is_err());
        assert_eq!(ComparisonMode::default().to_string(), "advisory");
    }
}
