//! Physical safety: choking hazards, undercooked poultry, exercise injuries.

use crate::flags;
use crate::input::Exercise;
use crate::ruleset::{RuleSet, Threshold};

use super::subject::{contains_any, lower};
use super::{Rule, RuleGroup, Subject};

const CHOKING_HAZARDS: &[&str] = &["whole grapes"];
const POULTRY: &[&str] = &["chicken", "turkey", "poultry"];
const FULL_DEPTH: &[&str] = &["ass-to-grass", "atg"];

pub struct PhysicalSafetyRule;

impl PhysicalSafetyRule {
    fn undercooked_poultry(subject: &Subject<'_>, min_temp: f64) -> bool {
        let Some(temp) = subject.recipe().and_then(|r| r.cook_temp_c) else {
            return false;
        };
        // Zero means "not recorded".
        temp != 0.0 && temp < min_temp && contains_any(&subject.recipe_name(), POULTRY)
    }

    fn any_exercise(subject: &Subject<'_>, pred: impl Fn(&Exercise) -> bool) -> bool {
        subject.exercises().iter().any(pred)
    }
}

impl Rule for PhysicalSafetyRule {
    fn name(&self) -> &'static str {
        "physical_safety"
    }

    fn group(&self) -> RuleGroup {
        RuleGroup::PhysicalSafety
    }

    fn check(&self, subject: &Subject<'_>, ruleset: &RuleSet) -> Vec<&'static str> {
        let mut raised = Vec::new();

        let max_age = ruleset.threshold(Threshold::ChokingHazardMaxAge);
        if subject.age_years().is_some_and(|age| age < max_age)
            && subject.any_ingredient_contains(CHOKING_HAZARDS)
        {
            raised.push(flags::CHOKING_HAZARD_TODDLER);
        }

        if Self::undercooked_poultry(subject, ruleset.threshold(Threshold::PoultryMinCookTemp)) {
            raised.push(flags::UNDERCOOKED_POULTRY);
        }

        if subject.has_injury("knee")
            && Self::any_exercise(subject, |e| {
                lower(e.name.as_deref()).contains("squat")
                    && contains_any(&lower(e.depth.as_deref()), FULL_DEPTH)
            })
        {
            raised.push(flags::EXERCISE_CONTRAINDICATED_KNEE);
        }

        if subject.has_injury("lower back")
            && Self::any_exercise(subject, |e| {
                lower(e.name.as_deref()).contains("deadlift")
                    && lower(e.intensity.as_deref()).contains("heavy")
            })
        {
            raised.push(flags::EXERCISE_CONTRAINDICATED_BACK);
        }

        raised
    }
}
