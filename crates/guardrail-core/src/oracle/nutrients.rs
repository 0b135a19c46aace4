//! Daily and per-recipe nutrient limits.

use crate::flags;
use crate::input::{Nutrient, Targets};
use crate::ruleset::{RuleSet, Threshold};

use super::{Rule, RuleGroup, Subject};

/// Sodium, added sugars, and the chronic kidney disease protein/potassium
/// limits.
pub struct NutrientRule;

impl NutrientRule {
    fn is_ckd(subject: &Subject<'_>) -> bool {
        subject.has_condition("chronic kidney disease") || subject.has_condition("ckd")
    }

    /// Daily total of `nutrient` above `limit`. No recipes, no total.
    fn day_exceeds(subject: &Subject<'_>, nutrient: Nutrient, limit: f64) -> bool {
        subject
            .day_total(nutrient)
            .is_some_and(|total| total > limit)
    }
}

impl Rule for NutrientRule {
    fn name(&self) -> &'static str {
        "nutrient_thresholds"
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::NutrientThresholds
    }

    fn check(&self, subject: &Subject<'_>, ruleset: &RuleSet) -> Vec<&'static str> {
        let mut raised = Vec::new();

        if let Some(goal) = subject.target(Targets::SODIUM_MG).filter(|g| *g > 0.0) {
            if Self::day_exceeds(subject, Nutrient::Sodium, goal) {
                raised.push(flags::SODIUM_OVER_TARGET);
            }
        }

        if let (Some(max), Some(recipe)) = (subject.per_recipe_sodium_max(), subject.recipe()) {
            if recipe.nutrient(Nutrient::Sodium) > max {
                raised.push(flags::SODIUM_PER_RECIPE_HIGH);
            }
        }

        if subject.has_condition("diabetes") {
            let limit = ruleset.threshold(Threshold::DiabetesAddedSugarsHigh);
            if subject
                .recipe()
                .is_some_and(|r| r.nutrient(Nutrient::Sugars) >= limit)
            {
                raised.push(flags::ADDED_SUGARS_HIGH);
            }
        }

        if Self::is_ckd(subject) {
            // A protein ceiling of zero is still a ceiling.
            if let Some(max) = subject.target(Targets::PROTEIN_G_MAX) {
                if Self::day_exceeds(subject, Nutrient::Protein, max) {
                    raised.push(flags::PROTEIN_OVER_TARGET_CKD);
                }
            }
            if let Some(goal) = subject.target(Targets::POTASSIUM_MG).filter(|g| *g > 0.0) {
                if Self::day_exceeds(subject, Nutrient::Potassium, goal) {
                    raised.push(flags::POTASSIUM_OVER_TARGET);
                }
            }
        }

        raised
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputRecord;
    use serde_json::json;

    fn check_with(value: serde_json::Value, ruleset: &RuleSet) -> Vec<&'static str> {
        let input = InputRecord::from_value(value).unwrap();
        NutrientRule.check(&Subject::new(&input), ruleset)
    }

    fn check(value: serde_json::Value) -> Vec<&'static str> {
        check_with(value, &RuleSet::default())
    }

    #[test]
    fn test_sodium_over_target() {
        let flags = check(json!({
            "meal_day": {
                "targets": {"sodium_mg": 1500},
                "recipes": [{"sodium_mg": 1200}, {"sodium_mg": 600}]
            }
        }));
        assert_eq!(flags, vec![flags::SODIUM_OVER_TARGET]);
    }

    #[test]
    fn test_sodium_at_target_passes() {
        let flags = check(json!({
            "targets": {"sodium_mg": 1500},
            "meal_day": {"recipes": [{"sodium_mg": 1500}]}
        }));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_zero_sodium_target_ignored() {
        let flags = check(json!({
            "targets": {"sodium_mg": 0},
            "meal_day": {"recipes": [{"sodium_mg": 900}]}
        }));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_per_recipe_sodium() {
        let flags = check(json!({
            "per_recipe_sodium_mg_max": 700,
            "recipe": {"name": "Instant ramen", "sodium_mg": 1800}
        }));
        assert_eq!(flags, vec![flags::SODIUM_PER_RECIPE_HIGH]);

        let flags = check(json!({
            "profile": {"per_recipe_sodium_mg_max": 2000},
            "per_recipe_sodium_mg_max": 700,
            "recipe": {"sodium_mg": 1800}
        }));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_added_sugars_uses_ruleset_threshold() {
        let input = json!({
            "profile": {"medical_conditions": ["Type 2 Diabetes"]},
            "recipe": {"sugars_g": 12}
        });
        assert!(check(input.clone()).is_empty());

        let strict = RuleSet::with_thresholds("v2", [(Threshold::DiabetesAddedSugarsHigh.key(), 10.0)]);
        assert_eq!(check_with(input, &strict), vec![flags::ADDED_SUGARS_HIGH]);
    }

    #[test]
    fn test_added_sugars_at_threshold_fires() {
        let flags = check(json!({
            "medical_conditions": ["diabetes"],
            "recipe": {"sugars_g": 15}
        }));
        assert_eq!(flags, vec![flags::ADDED_SUGARS_HIGH]);
    }

    #[test]
    fn test_ckd_protein_and_potassium() {
        let flags = check(json!({
            "profile": {
                "medical_conditions": ["Chronic Kidney Disease"],
                "targets": {"protein_g_max": 50, "potassium_mg": 2000}
            },
            "meal_day": {"recipes": [
                {"protein_g": 40, "potassium_mg": 1500},
                {"protein_g": 30, "potassium_mg": 900}
            ]}
        }));
        assert_eq!(
            flags,
            vec![flags::PROTEIN_OVER_TARGET_CKD, flags::POTASSIUM_OVER_TARGET]
        );
    }

    #[test]
    fn test_ckd_limits_need_condition() {
        let flags = check(json!({
            "targets": {"protein_g_max": 10},
            "meal_day": {"recipes": [{"protein_g": 80}]}
        }));
        assert!(flags.is_empty());
    }
}
