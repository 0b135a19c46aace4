//! Canonical flag vocabulary.
//!
//! Every flag the oracle can raise is named here. Reports produced by models
//! (and older versions of the oracle) use a handful of alternate names; those
//! are folded onto the canonical vocabulary by [`canonicalize`].

use std::collections::HashMap;

use lazy_static::lazy_static;

// Allergens / intolerances
pub const ALLERGEN_PEANUTS: &str = "allergen_peanuts_detected";
pub const ALLERGEN_TREE_NUTS: &str = "allergen_tree_nuts_detected";
pub const ALLERGEN_SHELLFISH: &str = "allergen_shellfish_detected";
pub const ALLERGEN_SESAME: &str = "allergen_sesame_detected";
pub const ALLERGEN_MILK: &str = "allergen_milk_detected";
pub const ALLERGEN_EGGS: &str = "allergen_eggs_detected";
pub const ALLERGEN_WHEAT: &str = "allergen_wheat_detected";
pub const ALLERGEN_SOY: &str = "allergen_soy_detected";
pub const LACTOSE_DETECTED: &str = "lactose_detected";
pub const GLUTEN_DETECTED: &str = "gluten_detected";

// Diet / culture
pub const NON_VEGAN_INGREDIENT: &str = "non_vegan_ingredient";
pub const NON_VEGETARIAN_INGREDIENT: &str = "non_vegetarian_ingredient";
pub const NON_KOSHER_PORK: &str = "non_kosher_pork";
pub const NON_KOSHER_MEAT_DAIRY_MIX: &str = "non_kosher_meat_dairy_mix";
pub const NON_HALAL_ALCOHOL: &str = "non_halal_alcohol";
pub const CARBS_OVER_TARGET: &str = "carbs_over_target";

// Nutrition / metabolic
pub const SODIUM_OVER_TARGET: &str = "sodium_over_target";
pub const SODIUM_PER_RECIPE_HIGH: &str = "sodium_per_recipe_high";
pub const ADDED_SUGARS_HIGH: &str = "added_sugars_high";
pub const PROTEIN_OVER_TARGET_CKD: &str = "protein_over_target_ckd";
pub const POTASSIUM_OVER_TARGET: &str = "potassium_over_target";

// Drug-food
pub const DRUG_FOOD_VITK_WARFARIN: &str = "drug_food_vitK_warfarin";
pub const DRUG_FOOD_GRAPEFRUIT_STATIN: &str = "drug_food_grapefruit_statin";

// Pregnancy
pub const VITAMIN_A_EXCEEDS_SAFE_PREGNANCY: &str = "vitamin_a_exceeds_safe_pregnancy";
pub const HIGH_MERCURY_FISH: &str = "high_mercury_fish";
pub const ALCOHOL_PRESENT: &str = "alcohol_present";
pub const RAW_EGG_RISK: &str = "raw_egg_risk";
pub const EXERCISE_CONTRAINDICATED_PREGNANCY_SUPINE: &str =
    "exercise_contraindicated_pregnancy_supine";

// Physical safety
pub const CHOKING_HAZARD_TODDLER: &str = "choking_hazard_toddler";
pub const UNDERCOOKED_POULTRY: &str = "undercooked_poultry";
pub const EXERCISE_CONTRAINDICATED_KNEE: &str = "exercise_contraindicated_knee";
pub const EXERCISE_CONTRAINDICATED_BACK: &str = "exercise_contraindicated_back";

// Budget / inventory
pub const BUDGET_EXCEEDED: &str = "budget_exceeded";
pub const STORE_ITEM_UNAVAILABLE: &str = "store_item_unavailable";

/// Legacy or alternate flag name → canonical name.
const SYNONYMS: &[(&str, &str)] = &[
    ("peanut_allergen", ALLERGEN_PEANUTS),
    ("tree_nut_allergen", ALLERGEN_TREE_NUTS),
    ("shellfish", ALLERGEN_SHELLFISH),
    ("sesame_allergen", ALLERGEN_SESAME),
    ("milk_allergen", ALLERGEN_MILK),
    ("eggs_banned", ALLERGEN_EGGS),
    ("wheat_allergen", ALLERGEN_WHEAT),
    ("soy_allergen", ALLERGEN_SOY),
    ("lactose", LACTOSE_DETECTED),
    ("gluten_in_recipe", GLUTEN_DETECTED),
    ("non_vegan_dairy", NON_VEGAN_INGREDIENT),
    ("non_vegetarian_egg", NON_VEGETARIAN_INGREDIENT),
    ("pork_in_kosher", NON_KOSHER_PORK),
    ("non_kosher_meat", NON_KOSHER_MEAT_DAIRY_MIX),
    ("alcohol_in_recipe", NON_HALAL_ALCOHOL),
    ("sugar_content_high", ADDED_SUGARS_HIGH),
    ("protein_per_recipe_high", PROTEIN_OVER_TARGET_CKD),
    ("vitamin_a_rae_too_high", VITAMIN_A_EXCEEDS_SAFE_PREGNANCY),
    ("drug_food_grapefruit", DRUG_FOOD_GRAPEFRUIT_STATIN),
    ("supine_crunches_risk", EXERCISE_CONTRAINDICATED_PREGNANCY_SUPINE),
    ("injury_risk", EXERCISE_CONTRAINDICATED_BACK),
];

lazy_static! {
    static ref SYNONYM_TABLE: HashMap<&'static str, &'static str> =
        SYNONYMS.iter().copied().collect();
}

/// Canonical name for a single flag. Unmapped names pass through trimmed.
pub fn canonical_name(flag: &str) -> &str {
    let trimmed = flag.trim();
    match SYNONYM_TABLE.get(trimmed) {
        Some(canonical) => canonical,
        None => trimmed,
    }
}

/// Canonicalize a flag sequence, preserving order and duplicates.
pub fn canonicalize<S: AsRef<str>>(flags: &[S]) -> Vec<String> {
    flags
        .iter()
        .map(|f| canonical_name(f.as_ref()).to_string())
        .collect()
}
