//! Few-shot prompt for guardrail report generation.
//!
//! The conversation is fixed except for the last user turn:
//! 1. System instruction (strict JSON shape)
//! 2. Eight worked examples, each a user/assistant pair
//! 3. The case input

use serde_json::{json, Value};

use crate::providers::ChatMessage;

/// System instruction sent ahead of every case.
pub const SYSTEM_INSTRUCTION: &str = "Return ONLY valid JSON. Structure must be exactly: \
{\"guardrail_report\": {\"hard_fail\": true|false, \"flags\": [<strings>]}} \
No prose, no extra keys, no markdown.";

/// Worked examples as `(input, answer)` pairs.
pub fn few_shots() -> Vec<(Value, Value)> {
    vec![
        (
            json!({"diet": "Halal", "recipe": {"name": "Beer-battered fish", "ingredients": [{"name": "beer", "qty": "120 ml"}, {"name": "cod", "qty": "150 g"}]}}),
            report(true, &["non_halal_alcohol"]),
        ),
        (
            json!({"medical_conditions": ["Hypertension"], "meal_day": {"targets": {"sodium_mg": 1500}, "recipes": [{"name": "Soup", "sodium_mg": 1200}, {"name": "Sandwich", "sodium_mg": 600}]}}),
            report(true, &["sodium_over_target"]),
        ),
        (
            json!({"diet": "Keto", "targets": {"carbs_g_per_day": 30}, "meal_day": {"recipes": [{"name": "Pasta", "carbs_g": 60}]}}),
            report(true, &["carbs_over_target"]),
        ),
        (
            json!({"targets": {"protein_g_per_day": 120}, "meal_day": {"recipes": [{"protein_g": 45}, {"protein_g": 20}, {"protein_g": 60}]}}),
            report(false, &[]),
        ),
        (
            json!({"medications": ["Warfarin"], "recipe": {"name": "Kale salad", "ingredients": [{"name": "kale", "qty": "100 g"}]}}),
            report(true, &["drug_food_vitK_warfarin"]),
        ),
        (
            json!({"medical_conditions": ["Pregnancy"], "recipe": {"name": "Cookie dough", "ingredients": [{"name": "raw egg", "qty": "1"}]}}),
            report(true, &["raw_egg_risk"]),
        ),
        (
            json!({"cuisine_pref": "Mexican", "diet": "Gluten Free", "recipe": {"name": "Chicken fajitas", "ingredients": [{"name": "corn tortillas", "qty": "2"}, {"name": "chicken", "qty": "150 g"}]}}),
            report(false, &[]),
        ),
        (
            json!({"per_recipe_sodium_mg_max": 700, "recipe": {"name": "Ramen", "sodium_mg": 1800}}),
            report(true, &["sodium_per_recipe_high"]),
        ),
    ]
}

fn report(hard_fail: bool, flags: &[&str]) -> Value {
    json!({"guardrail_report": {"hard_fail": hard_fail, "flags": flags}})
}

fn user_turn(input: &Value) -> String {
    format!(
        "INPUT:\n{}\nReturn only JSON starting with '{{' and ending with '}}'.",
        input
    )
}

/// Build the full conversation for one case input.
pub fn build_messages(input: &Value) -> Vec<ChatMessage> {
    let shots = few_shots();
    let mut messages = Vec::with_capacity(shots.len() * 2 + 2);
    messages.push(ChatMessage::system(SYSTEM_INSTRUCTION));
    for (example, answer) in &shots {
        messages.push(ChatMessage::user(user_turn(example)));
        messages.push(ChatMessage::assistant(answer.to_string()));
    }
    messages.push(ChatMessage::user(user_turn(input)));
    messages
}

/// Flatten a conversation into a single text prompt, for completion-style
/// backends and for logging.
pub fn render_prompt(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str(&message.role.to_uppercase());
        out.push_str(":\n");
        out.push_str(&message.content);
        out.push_str("\n\n");
    }
    out.push_str("ASSISTANT:\n");
    out
}
