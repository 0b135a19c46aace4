//! Diet compliance: vegan, kosher, halal, keto and gluten-free.

use crate::flags;
use crate::input::{Nutrient, Targets};
use crate::ruleset::RuleSet;

use super::{Rule, RuleGroup, Subject};

/// Ingredient names (exact) that are never vegan.
const NON_VEGAN: &[&str] = &["cheddar", "milk", "cheese", "butter", "egg", "eggs"];
const DAIRY: &[&str] = &["cheese", "milk"];
const ALCOHOL: &[&str] = &["beer", "alcohol", "wine"];
const GLUTEN: &[&str] = &["wheat", "flour"];

pub struct DietRule;

impl DietRule {
    fn kosher(subject: &Subject<'_>, raised: &mut Vec<&'static str>) {
        if subject.any_ingredient_contains(&["pork"]) {
            raised.push(flags::NON_KOSHER_PORK);
        }
        if subject.any_ingredient_contains(&["beef"]) && subject.any_ingredient_contains(DAIRY) {
            raised.push(flags::NON_KOSHER_MEAT_DAIRY_MIX);
        }
    }

    /// Daily carbohydrates against `carbs_g_per_day`, preferring the profile's
    /// own target over the effective targets.
    fn keto_carbs_exceeded(subject: &Subject<'_>) -> bool {
        let goal = subject
            .profile_target(Targets::CARBS_G_PER_DAY)
            .filter(|g| *g != 0.0)
            .or_else(|| subject.target(Targets::CARBS_G_PER_DAY));

        match (goal, subject.day_total(Nutrient::Carbohydrate)) {
            (Some(goal), Some(total)) => total > goal,
            _ => false,
        }
    }
}

impl Rule for DietRule {
    fn name(&self) -> &'static str {
        "diet_compliance"
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::DietCompliance
    }

    fn check(&self, subject: &Subject<'_>, _ruleset: &RuleSet) -> Vec<&'static str> {
        let mut raised = Vec::new();

        match subject.diet() {
            "vegan" if subject.any_ingredient_is(NON_VEGAN) => {
                raised.push(flags::NON_VEGAN_INGREDIENT);
            }
            "kosher" => Self::kosher(subject, &mut raised),
            "halal" if subject.any_ingredient_contains(ALCOHOL) => {
                raised.push(flags::NON_HALAL_ALCOHOL);
            }
            "keto" if Self::keto_carbs_exceeded(subject) => {
                raised.push(flags::CARBS_OVER_TARGET);
            }
            _ => {}
        }

        let gluten_sensitive = subject.is_diet("gluten free") || subject.has_condition("celiac");
        if gluten_sensitive && subject.any_ingredient_contains(GLUTEN) {
            raised.push(flags::GLUTEN_DETECTED);
        }

        raised
    }
}
