//! The rule oracle.
//!
//! The oracle is the ground truth for every guardrail decision. It evaluates
//! an [`InputRecord`] against a registry of independent rules; each rule looks
//! at the record through a normalized [`Subject`] and returns the flags it
//! raises. Any flag is a hard failure: there is no warning tier.
//!
//! ## Rule Groups
//!
//! | Group | Rule |
//! |-------|------|
//! | Allergens | [`AllergenRule`] |
//! | Intolerances | [`IntoleranceRule`] |
//! | Diet compliance | [`DietRule`] |
//! | Nutrient thresholds | [`NutrientRule`] |
//! | Drug-food interactions | [`InteractionRule`] |
//! | Pregnancy | [`PregnancyRule`] |
//! | Physical safety | [`PhysicalSafetyRule`] |
//! | Budget / inventory | [`BudgetRule`] |

mod allergens;
mod budget;
mod diet;
mod interactions;
mod nutrients;
mod pregnancy;
mod safety;
mod subject;

pub use allergens::{AllergenRule, IntoleranceRule};
pub use budget::BudgetRule;
pub use diet::DietRule;
pub use interactions::InteractionRule;
pub use nutrients::NutrientRule;
pub use pregnancy::PregnancyRule;
pub use safety::PhysicalSafetyRule;
pub use subject::Subject;

use serde::{Deserialize, Serialize};

use crate::input::InputRecord;
use crate::ruleset::RuleSet;
use crate::verdict::Verdict;

/// The family a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleGroup {
    Allergens,
    Intolerances,
    DietCompliance,
    NutrientThresholds,
    DrugFoodInteractions,
    Pregnancy,
    PhysicalSafety,
    BudgetInventory,
}

/// A named, independently testable oracle rule.
///
/// Rules are pure: no I/O, no randomness, no shared state. Absent data means
/// the rule does not apply.
pub trait Rule: Send + Sync {
    /// Stable rule identifier, used in audit output.
    fn name(&self) -> &'static str;

    fn group(&self) -> RuleGroup;

    /// Flags this rule raises for `subject`; empty when it does not fire.
    fn check(&self, subject: &Subject<'_>, ruleset: &RuleSet) -> Vec<&'static str>;
}

/// What one rule contributed to a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFinding {
    pub rule: String,
    pub group: RuleGroup,
    pub flags: Vec<String>,
}

/// A verdict together with the per-rule findings behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleReport {
    pub verdict: Verdict,
    pub findings: Vec<RuleFinding>,
}

/// Ordered registry of rules.
pub struct Oracle {
    rules: Vec<Box<dyn Rule>>,
}

impl Oracle {
    /// An oracle with no rules; every input passes.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The standard battery, in evaluation order.
    pub fn standard() -> Self {
        Self::empty()
            .with_rule(AllergenRule)
            .with_rule(IntoleranceRule)
            .with_rule(DietRule)
            .with_rule(NutrientRule)
            .with_rule(InteractionRule)
            .with_rule(PregnancyRule)
            .with_rule(PhysicalSafetyRule)
            .with_rule(BudgetRule)
    }

    /// Append a rule to the registry.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Derive the expected verdict for `input`.
    pub fn evaluate(&self, input: &InputRecord, ruleset: &RuleSet) -> Verdict {
        self.evaluate_detailed(input, ruleset).verdict
    }

    /// Derive the expected verdict and report which rules fired.
    ///
    /// Only rules that raised at least one flag appear in `findings`.
    pub fn evaluate_detailed(&self, input: &InputRecord, ruleset: &RuleSet) -> OracleReport {
        let subject = Subject::new(input);
        let mut findings = Vec::new();

        for rule in &self.rules {
            let flags = rule.check(&subject, ruleset);
            if flags.is_empty() {
                continue;
            }
            tracing::debug!(rule = rule.name(), flags = ?flags, "Rule fired");
            findings.push(RuleFinding {
                rule: rule.name().to_string(),
                group: rule.group(),
                flags: flags.iter().map(|f| f.to_string()).collect(),
            });
        }

        let verdict = Verdict::from_flags(findings.iter().flat_map(|f| f.flags.iter()));
        OracleReport { verdict, findings }
    }
}

impl Default for Oracle {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for Oracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oracle")
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags;
    use serde_json::json;

    fn verdict(value: serde_json::Value) -> Verdict {
        let input = InputRecord::from_value(value).unwrap();
        Oracle::standard().evaluate(&input, &RuleSet::default())
    }

    #[test]
    fn test_standard_registry_order() {
        assert_eq!(
            Oracle::standard().rule_names(),
            vec![
                "allergens",
                "intolerances",
                "diet_compliance",
                "nutrient_thresholds",
                "drug_food_interactions",
                "pregnancy_safety",
                "physical_safety",
                "budget_inventory",
            ]
        );
    }

    #[test]
    fn test_halal_beer_battered_fish() {
        let v = verdict(json!({
            "diet": "Halal",
            "recipe": {"name": "Beer-battered fish", "ingredients": [{"name": "beer"}, {"name": "cod"}]}
        }));
        assert_eq!(v, Verdict { hard_fail: true, flags: vec![flags::NON_HALAL_ALCOHOL.to_string()] });
    }

    #[test]
    fn test_hypertension_sodium_over_target() {
        let v = verdict(json!({
            "medical_conditions": ["Hypertension"],
            "meal_day": {
                "targets": {"sodium_mg": 1500},
                "recipes": [{"name": "Soup", "sodium_mg": 1200}, {"name": "Sandwich", "sodium_mg": 600}]
            }
        }));
        assert!(v.hard_fail);
        assert!(v.has_flag(flags::SODIUM_OVER_TARGET));
    }

    #[test]
    fn test_clean_input_passes() {
        let v = verdict(json!({
            "profile": {"diet": "Omnivore", "allergens_banned": [], "medical_conditions": []},
            "meal_day": {
                "targets": {"sodium_mg": 2300},
                "recipes": [{"name": "Salad", "sodium_mg": 300}, {"name": "Rice bowl", "sodium_mg": 700}]
            },
            "recipe": {"name": "Salad", "ingredients": [{"name": "lettuce"}, {"name": "tomato"}]}
        }));
        assert_eq!(v, Verdict::pass());
    }

    #[test]
    fn test_empty_record_passes() {
        assert_eq!(verdict(json!({})), Verdict::pass());
    }

    #[test]
    fn test_multiple_groups_sorted() {
        let v = verdict(json!({
            "profile": {"allergens_banned": ["Peanuts"], "medications": ["Warfarin"]},
            "recipe": {"ingredients": [{"name": "peanut butter"}, {"name": "kale"}]}
        }));
        assert_eq!(
            v.flags,
            vec![flags::ALLERGEN_PEANUTS, flags::DRUG_FOOD_VITK_WARFARIN]
        );
    }

    #[test]
    fn test_detailed_reports_firing_rules_only() {
        let input = InputRecord::from_value(json!({
            "diet": "Kosher",
            "recipe": {"ingredients": [{"name": "pork belly"}]}
        }))
        .unwrap();
        let report = Oracle::standard().evaluate_detailed(&input, &RuleSet::default());

        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule, "diet_compliance");
        assert_eq!(report.findings[0].group, RuleGroup::DietCompliance);
        assert_eq!(report.verdict.flags, vec![flags::NON_KOSHER_PORK]);
    }

    #[test]
    fn test_custom_rule_registration() {
        struct AlwaysFlag;
        impl Rule for AlwaysFlag {
            fn name(&self) -> &'static str {
                "always"
            }
            fn group(&self) -> RuleGroup {
                RuleGroup::PhysicalSafety
            }
            fn check(&self, _: &Subject<'_>, _: &RuleSet) -> Vec<&'static str> {
                vec!["injury_risk"]
            }
        }

        let oracle = Oracle::empty().with_rule(AlwaysFlag);
        let v = oracle.evaluate(&InputRecord::default(), &RuleSet::default());
        // Legacy names are canonicalized on the way out.
        assert_eq!(v.flags, vec![flags::EXERCISE_CONTRAINDICATED_BACK]);
        assert!(v.hard_fail);
    }
}
