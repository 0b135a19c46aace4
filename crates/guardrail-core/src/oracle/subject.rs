//! Normalized, lower-cased view of an input record.
//!
//! Rules never read the raw record directly: the subject resolves the
//! profile/top-level precedence once, lower-cases every string that is
//! matched against, and turns absent collections into empty slices.

use std::collections::BTreeSet;

use crate::input::{CartItem, Exercise, InputRecord, Nutrient, Recipe, Targets};

/// Evaluation view of one [`InputRecord`].
#[derive(Debug, Clone)]
pub struct Subject<'a> {
    record: &'a InputRecord,
    diet: String,
    conditions: BTreeSet<String>,
    medications: Vec<String>,
    allergens_banned: BTreeSet<String>,
    intolerances: BTreeSet<String>,
    injuries: Vec<String>,
    ingredients: Vec<String>,
    store: String,
    targets: Option<&'a Targets>,
}

impl<'a> Subject<'a> {
    pub fn new(record: &'a InputRecord) -> Self {
        let profile = record.profile.as_ref();

        let diet = profile
            .and_then(|p| p.diet.as_deref())
            .filter(|d| !d.trim().is_empty())
            .or(record.diet.as_deref())
            .map(normalize_diet)
            .unwrap_or_default();

        let conditions = lower_all(
            profile
                .and_then(|p| p.medical_conditions.as_ref())
                .or(record.medical_conditions.as_ref()),
        )
        .collect();

        let medications = lower_all(
            profile
                .and_then(|p| p.medications.as_ref())
                .or(record.medications.as_ref()),
        )
        .collect();

        let allergens_banned = lower_all(profile.and_then(|p| p.allergens_banned.as_ref())).collect();
        let intolerances = lower_all(profile.and_then(|p| p.intolerances.as_ref())).collect();

        let injuries = lower_all(
            profile
                .and_then(|p| p.injuries.as_ref())
                .or(record.injuries.as_ref()),
        )
        .collect();

        let ingredients = record
            .recipe
            .as_ref()
            .and_then(|r| r.ingredients.as_deref())
            .unwrap_or(&[])
            .iter()
            .map(|i| i.name.as_deref().unwrap_or("").to_lowercase())
            .collect();

        let store = profile
            .and_then(|p| p.store.as_deref())
            .filter(|s| !s.is_empty())
            .or(record.store.as_deref())
            .unwrap_or("")
            .to_lowercase();

        // First non-empty of profile, meal-day and top-level targets.
        let targets = [
            profile.and_then(|p| p.targets.as_ref()),
            record.meal_day.as_ref().and_then(|d| d.targets.as_ref()),
            record.targets.as_ref(),
        ]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty());

        Self {
            record,
            diet,
            conditions,
            medications,
            allergens_banned,
            intolerances,
            injuries,
            ingredients,
            store,
            targets,
        }
    }

    /// Normalized diet name (`"gluten free"`, `"halal"`, ...); empty if none.
    pub fn diet(&self) -> &str {
        &self.diet
    }

    pub fn is_diet(&self, diet: &str) -> bool {
        self.diet == diet
    }

    /// Whether any declared medical condition contains `token`.
    ///
    /// This is a substring match, not set membership: `"diabetes"` also
    /// matches `"prediabetes"` and `"gestational diabetes"`.
    pub fn has_condition(&self, token: &str) -> bool {
        self.conditions.iter().any(|c| c.contains(token))
    }

    /// Whether any medication contains one of `tokens`.
    pub fn takes_medication(&self, tokens: &[&str]) -> bool {
        self.medications.iter().any(|m| contains_any(m, tokens))
    }

    pub fn bans_allergen(&self, names: &[&str]) -> bool {
        names.iter().any(|n| self.allergens_banned.contains(*n))
    }

    pub fn has_intolerance(&self, name: &str) -> bool {
        self.intolerances.contains(name)
    }

    /// Whether any injury contains `token`.
    ///
    /// Substring match like [`Subject::has_condition`]; pass the most
    /// specific token a rule needs (`"lower back"`, not `"back"`).
    pub fn has_injury(&self, token: &str) -> bool {
        self.injuries.iter().any(|i| i.contains(token))
    }

    /// Lower-cased ingredient names of the recipe under evaluation.
    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// Whether any ingredient name contains one of `tokens`.
    pub fn any_ingredient_contains(&self, tokens: &[&str]) -> bool {
        self.ingredients.iter().any(|i| contains_any(i, tokens))
    }

    /// Whether any ingredient name is exactly one of `names`.
    pub fn any_ingredient_is(&self, names: &[&str]) -> bool {
        self.ingredients
            .iter()
            .any(|i| names.contains(&i.trim()))
    }

    pub fn recipe(&self) -> Option<&'a Recipe> {
        self.record.recipe.as_ref()
    }

    /// Lower-cased recipe name; empty if absent.
    pub fn recipe_name(&self) -> String {
        self.recipe()
            .and_then(|r| r.name.as_deref())
            .unwrap_or("")
            .to_lowercase()
    }

    pub fn day_recipes(&self) -> &'a [Recipe] {
        self.record
            .meal_day
            .as_ref()
            .and_then(|d| d.recipes.as_deref())
            .unwrap_or(&[])
    }

    /// Daily total of `nutrient`, or `None` when the meal day has no recipes.
    pub fn day_total(&self, nutrient: Nutrient) -> Option<f64> {
        let recipes = self.day_recipes();
        if recipes.is_empty() {
            return None;
        }
        Some(recipes.iter().map(|r| r.nutrient(nutrient)).sum())
    }

    /// Target from the effective targets map.
    pub fn target(&self, key: &str) -> Option<f64> {
        self.targets.and_then(|t| t.get(key))
    }

    /// Target from the profile's own targets map only.
    pub fn profile_target(&self, key: &str) -> Option<f64> {
        self.record
            .profile
            .as_ref()
            .and_then(|p| p.targets.as_ref())
            .and_then(|t| t.get(key))
    }

    /// Per-recipe sodium ceiling; zero means unset.
    pub fn per_recipe_sodium_max(&self) -> Option<f64> {
        self.record
            .profile
            .as_ref()
            .and_then(|p| p.per_recipe_sodium_mg_max)
            .filter(|v| *v != 0.0)
            .or(self.record.per_recipe_sodium_mg_max)
            .filter(|v| *v != 0.0)
    }

    pub fn age_years(&self) -> Option<f64> {
        self.record.profile.as_ref().and_then(|p| p.age_years)
    }

    pub fn pregnancy_trimester(&self) -> Option<f64> {
        self.record.profile.as_ref().and_then(|p| p.pregnancy_trimester)
    }

    pub fn budget_usd(&self) -> Option<f64> {
        self.record.profile.as_ref().and_then(|p| p.budget_usd)
    }

    /// Lower-cased store name; empty if absent.
    pub fn store(&self) -> &str {
        &self.store
    }

    pub fn exercises(&self) -> &'a [Exercise] {
        self.record
            .workout
            .as_ref()
            .and_then(|w| w.exercises.as_deref())
            .unwrap_or(&[])
    }

    pub fn cart_items(&self) -> &'a [CartItem] {
        self.record
            .cart
            .as_ref()
            .and_then(|c| c.items.as_deref())
            .unwrap_or(&[])
    }
}

/// Case-insensitive containment of any token; `haystack` must be lower-cased.
pub fn contains_any(haystack: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| haystack.contains(t))
}

/// Lower-case an optional field, treating `None` as empty.
pub fn lower(value: Option<&str>) -> String {
    value.unwrap_or("").to_lowercase()
}

fn lower_all(values: Option<&Vec<String>>) -> impl Iterator<Item = String> + '_ {
    values
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_lowercase())
}

fn normalize_diet(diet: &str) -> String {
    diet.to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> InputRecord {
        InputRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_diet_normalization() {
        let r = record(json!({"profile": {"diet": "Gluten-Free"}}));
        assert_eq!(Subject::new(&r).diet(), "gluten free");

        let r = record(json!({"diet": "  HALAL "}));
        assert_eq!(Subject::new(&r).diet(), "halal");
    }

    #[test]
    fn test_profile_takes_precedence() {
        let r = record(json!({
            "profile": {"medical_conditions": ["Diabetes"]},
            "medical_conditions": ["Pregnancy"]
        }));
        let subject = Subject::new(&r);
        assert!(subject.has_condition("diabetes"));
        assert!(!subject.has_condition("pregnancy"));
    }

    #[test]
    fn test_empty_profile_diet_falls_back() {
        let r = record(json!({"profile": {"diet": ""}, "diet": "Vegan"}));
        assert!(Subject::new(&r).is_diet("vegan"));
    }

    #[test]
    fn test_target_precedence() {
        let r = record(json!({
            "profile": {"targets": {}},
            "meal_day": {"targets": {"sodium_mg": 1500}},
            "targets": {"sodium_mg": 2300}
        }));
        assert_eq!(Subject::new(&r).target(Targets::SODIUM_MG), Some(1500.0));
    }

    #[test]
    fn test_day_total_none_without_recipes() {
        let r = record(json!({"meal_day": {"recipes": []}}));
        assert_eq!(Subject::new(&r).day_total(Nutrient::Sodium), None);

        let r = record(json!({"meal_day": {"recipes": [{"sodium_mg": 100}, {"name": "x"}]}}));
        assert_eq!(Subject::new(&r).day_total(Nutrient::Sodium), Some(100.0));
    }

    #[test]
    fn test_absent_everything() {
        let r = InputRecord::default();
        let subject = Subject::new(&r);
        assert_eq!(subject.diet(), "");
        assert!(subject.ingredients().is_empty());
        assert!(subject.exercises().is_empty());
        assert!(subject.cart_items().is_empty());
        assert!(subject.recipe().is_none());
        assert_eq!(subject.target(Targets::SODIUM_MG), None);
    }

    #[test]
    fn test_ingredient_matching_is_case_insensitive() {
        let r = record(json!({"recipe": {"ingredients": [{"name": "Roasted PEANUTS"}, {"qty": 1}]}}));
        let subject = Subject::new(&r);
        assert!(subject.any_ingredient_contains(&["peanut"]));
        assert_eq!(subject.ingredients()[1], "");
    }
}
