//! The structured record under evaluation.
//!
//! Every field is optional. A field that is absent (or `null`) means the rules
//! that depend on it do not apply; it is never a violation in itself.
//!
//! Records produced by older tooling put some profile fields at the top level
//! (`diet`, `medical_conditions`, `targets`, ...). Those are honoured only when
//! the profile does not carry the same field.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Subject profile: who the recommendation is for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub diet: Option<String>,
    pub medical_conditions: Option<Vec<String>>,
    pub medications: Option<Vec<String>>,
    pub allergens_banned: Option<Vec<String>>,
    pub intolerances: Option<Vec<String>>,
    pub age_years: Option<f64>,
    pub injuries: Option<Vec<String>>,
    pub budget_usd: Option<f64>,
    pub store: Option<String>,
    pub pregnancy_trimester: Option<f64>,
    pub targets: Option<Targets>,
    pub per_recipe_sodium_mg_max: Option<f64>,
}

/// Named daily nutrient targets (`sodium_mg`, `carbs_g_per_day`, ...).
///
/// The map is open-ended, so entries whose value is not a number (`null`,
/// a note string) are dropped on load instead of rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Targets(pub BTreeMap<String, f64>);

impl<'de> Deserialize<'de> for Targets {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, value)| value.as_f64().map(|n| (key, n)))
            .collect())
    }
}

impl Targets {
    pub const SODIUM_MG: &'static str = "sodium_mg";
    pub const POTASSIUM_MG: &'static str = "potassium_mg";
    pub const PROTEIN_G_MAX: &'static str = "protein_g_max";
    pub const CARBS_G_PER_DAY: &'static str = "carbs_g_per_day";

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Targets {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Targets(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// One recipe ingredient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ingredient {
    pub name: Option<String>,
    /// Free-form quantity ("120 ml", 2, ...); carried but never evaluated.
    pub qty: Option<serde_json::Value>,
}

/// A recipe and its per-serving nutrients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recipe {
    pub name: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub sodium_mg: Option<f64>,
    pub potassium_mg: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub sugars_g: Option<f64>,
    pub vitamin_a_rae_ug: Option<f64>,
    pub cook_temp_c: Option<f64>,
}

/// Nutrients that can be totalled across a meal day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nutrient {
    Sodium,
    Potassium,
    Protein,
    Carbohydrate,
    Sugars,
    VitaminA,
}

impl Recipe {
    /// Amount of `nutrient` in this recipe; absent counts as zero.
    pub fn nutrient(&self, nutrient: Nutrient) -> f64 {
        let value = match nutrient {
            Nutrient::Sodium => self.sodium_mg,
            Nutrient::Potassium => self.potassium_mg,
            Nutrient::Protein => self.protein_g,
            Nutrient::Carbohydrate => self.carbs_g,
            Nutrient::Sugars => self.sugars_g,
            Nutrient::VitaminA => self.vitamin_a_rae_ug,
        };
        value.unwrap_or(0.0)
    }
}

/// A day of meals with optional day-level targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealDay {
    pub targets: Option<Targets>,
    pub recipes: Option<Vec<Recipe>>,
}

/// One exercise in a workout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exercise {
    pub name: Option<String>,
    pub depth: Option<String>,
    pub intensity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workout {
    pub exercises: Option<Vec<Exercise>>,
}

/// One item in a shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartItem {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub price_usd: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cart {
    pub items: Option<Vec<CartItem>>,
}

/// The record a guardrail report is produced for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputRecord {
    pub profile: Option<Profile>,
    pub recipe: Option<Recipe>,
    pub meal_day: Option<MealDay>,
    pub workout: Option<Workout>,
    pub cart: Option<Cart>,

    // Legacy top-level profile fields
    pub diet: Option<String>,
    pub medical_conditions: Option<Vec<String>>,
    pub medications: Option<Vec<String>>,
    pub injuries: Option<Vec<String>>,
    pub targets: Option<Targets>,
    pub per_recipe_sodium_mg_max: Option<f64>,
    pub store: Option<String>,
}

impl InputRecord {
    /// Parse a record from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Parse a record from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_record() {
        let record = InputRecord::from_json("{}").unwrap();
        assert_eq!(record, InputRecord::default());
    }

    #[test]
    fn test_nulls_are_absent() {
        let record = InputRecord::from_value(json!({
            "profile": {"diet": null, "age_years": null},
            "recipe": null
        }))
        .unwrap();
        let profile = record.profile.unwrap();
        assert!(profile.diet.is_none());
        assert!(profile.age_years.is_none());
        assert!(record.recipe.is_none());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let record = InputRecord::from_value(json!({
            "cuisine_pref": "Mexican",
            "recipe": {"name": "Tacos", "servings": 4}
        }))
        .unwrap();
        assert_eq!(record.recipe.unwrap().name.as_deref(), Some("Tacos"));
    }

    #[test]
    fn test_qty_accepts_any_shape() {
        let record = InputRecord::from_value(json!({
            "recipe": {"ingredients": [{"name": "egg", "qty": 2}, {"name": "milk", "qty": "1 cup"}]}
        }))
        .unwrap();
        assert_eq!(record.recipe.unwrap().ingredients.unwrap().len(), 2);
    }

    #[test]
    fn test_targets_keep_unknown_keys() {
        let record = InputRecord::from_value(json!({"targets": {"protein_g_per_day": 120}})).unwrap();
        let targets = record.targets.unwrap();
        assert!(!targets.is_empty());
        assert_eq!(targets.get(Targets::SODIUM_MG), None);
    }

    #[test]
    fn test_non_numeric_targets_dropped() {
        let record = InputRecord::from_value(json!({
            "targets": {"sodium_mg": null, "potassium_mg": 3500, "note": "low salt"}
        }))
        .unwrap();
        let targets = record.targets.unwrap();
        assert_eq!(targets.get(Targets::SODIUM_MG), None);
        assert_eq!(targets.get(Targets::POTASSIUM_MG), Some(3500.0));
        assert_eq!(targets.get("note"), None);

        let only_notes = InputRecord::from_value(json!({"targets": {"note": "low salt"}})).unwrap();
        assert!(only_notes.targets.unwrap().is_empty());
    }

    #[test]
    fn test_ill_typed_field_rejected() {
        let result = InputRecord::from_value(json!({"recipe": {"sodium_mg": "lots"}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_nutrient_counts_as_zero() {
        let recipe = Recipe {
            sodium_mg: Some(300.0),
            ..Default::default()
        };
        assert_eq!(recipe.nutrient(Nutrient::Sodium), 300.0);
        assert_eq!(recipe.nutrient(Nutrient::Potassium), 0.0);
    }
}
