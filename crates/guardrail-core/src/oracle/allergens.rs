//! Allergen and intolerance detection.

use crate::flags;
use crate::ruleset::RuleSet;

use super::{Rule, RuleGroup, Subject};

/// A bannable allergen: the names a profile may declare it under, the
/// ingredient tokens that indicate it, and the flag it raises.
struct Allergen {
    declared_as: &'static [&'static str],
    tokens: &'static [&'static str],
    flag: &'static str,
}

const ALLERGENS: &[Allergen] = &[
    Allergen {
        declared_as: &["peanuts", "peanut"],
        tokens: &["peanut"],
        flag: flags::ALLERGEN_PEANUTS,
    },
    Allergen {
        declared_as: &["tree nuts", "tree nut", "tree_nuts"],
        tokens: &["almond"],
        flag: flags::ALLERGEN_TREE_NUTS,
    },
    Allergen {
        declared_as: &["shellfish"],
        tokens: &["shrimp"],
        flag: flags::ALLERGEN_SHELLFISH,
    },
    Allergen {
        declared_as: &["sesame"],
        tokens: &["sesame"],
        flag: flags::ALLERGEN_SESAME,
    },
    Allergen {
        declared_as: &["milk"],
        tokens: &["milk", "cheese"],
        flag: flags::ALLERGEN_MILK,
    },
    Allergen {
        declared_as: &["eggs", "egg"],
        tokens: &["egg"],
        flag: flags::ALLERGEN_EGGS,
    },
    Allergen {
        declared_as: &["wheat"],
        tokens: &["wheat", "flour"],
        flag: flags::ALLERGEN_WHEAT,
    },
    Allergen {
        declared_as: &["soy"],
        tokens: &["soy", "tofu"],
        flag: flags::ALLERGEN_SOY,
    },
];

/// Flags recipe ingredients that contain a banned allergen.
pub struct AllergenRule;

impl Rule for AllergenRule {
    fn name(&self) -> &'static str {
        "allergens"
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Allergens
    }

    fn check(&self, subject: &Subject<'_>, _ruleset: &RuleSet) -> Vec<&'static str> {
        ALLERGENS
            .iter()
            .filter(|a| subject.bans_allergen(a.declared_as))
            .filter(|a| subject.any_ingredient_contains(a.tokens))
            .map(|a| a.flag)
            .collect()
    }
}

/// Flags intolerances. Lactose: any milk ingredient not labelled lactose-free.
pub struct IntoleranceRule;

impl Rule for IntoleranceRule {
    fn name(&self) -> &'static str {
        "intolerances"
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Intolerances
    }

    fn check(&self, subject: &Subject<'_>, _ruleset: &RuleSet) -> Vec<&'static str> {
        let mut raised = Vec::new();

        if subject.has_intolerance("lactose")
            && subject
                .ingredients()
                .iter()
                .any(|i| i.contains("milk") && !i.contains("lactose-free"))
        {
            raised.push(flags::LACTOSE_DETECTED);
        }

        raised
    }
}
