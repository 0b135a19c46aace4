//! Drug-food interactions.

use crate::flags;
use crate::ruleset::RuleSet;

use super::{Rule, RuleGroup, Subject};

struct Interaction {
    medications: &'static [&'static str],
    foods: &'static [&'static str],
    flag: &'static str,
}

const INTERACTIONS: &[Interaction] = &[
    // Vitamin K antagonises warfarin.
    Interaction {
        medications: &["warfarin", "coumadin"],
        foods: &["kale", "spinach"],
        flag: flags::DRUG_FOOD_VITK_WARFARIN,
    },
    Interaction {
        medications: &["statin"],
        foods: &["grapefruit"],
        flag: flags::DRUG_FOOD_GRAPEFRUIT_STATIN,
    },
];

pub struct InteractionRule;

impl Rule for InteractionRule {
    fn name(&self) -> &'static str {
        "drug_food_interactions"
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::DrugFoodInteractions
    }

    fn check(&self, subject: &Subject<'_>, _ruleset: &RuleSet) -> Vec<&'static str> {
        INTERACTIONS
            .iter()
            .filter(|i| subject.takes_medication(i.medications))
            .filter(|i| subject.any_ingredient_contains(i.foods))
            .map(|i| i.flag)
            .collect()
    }
}
