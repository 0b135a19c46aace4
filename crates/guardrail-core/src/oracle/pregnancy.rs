//! Pregnancy-specific food and exercise rules.

use crate::flags;
use crate::input::Nutrient;
use crate::ruleset::{RuleSet, Threshold};

use super::subject::lower;
use super::{Rule, RuleGroup, Subject};

const HIGH_MERCURY: &[&str] = &["swordfish"];
const ALCOHOL: &[&str] = &["alcohol", "wine", "beer"];

pub struct PregnancyRule;

impl Rule for PregnancyRule {
    fn name(&self) -> &'static str {
        "pregnancy_safety"
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::Pregnancy
    }

    fn check(&self, subject: &Subject<'_>, ruleset: &RuleSet) -> Vec<&'static str> {
        let mut raised = Vec::new();
        if !subject.has_condition("pregnan") {
            return raised;
        }

        let upper_limit = ruleset.threshold(Threshold::VitaminAPregnancyUpperLimit);
        if subject
            .day_total(Nutrient::VitaminA)
            .is_some_and(|total| total > upper_limit)
        {
            raised.push(flags::VITAMIN_A_EXCEEDS_SAFE_PREGNANCY);
        }

        if subject.any_ingredient_contains(HIGH_MERCURY) {
            raised.push(flags::HIGH_MERCURY_FISH);
        }
        if subject.any_ingredient_contains(ALCOHOL) {
            raised.push(flags::ALCOHOL_PRESENT);
        }
        if subject.any_ingredient_contains(&["raw egg"]) {
            raised.push(flags::RAW_EGG_RISK);
        }

        let third_trimester = subject.pregnancy_trimester() == Some(3.0);
        if third_trimester
            && subject
                .exercises()
                .iter()
                .any(|e| lower(e.name.as_deref()).contains("supine"))
        {
            raised.push(flags::EXERCISE_CONTRAINDICATED_PREGNANCY_SUPINE);
        }

        raised
    }
}
