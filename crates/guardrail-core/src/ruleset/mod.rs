//! Ruleset loading and provenance.
//!
//! A ruleset is a versioned document of numeric thresholds. It is loaded once
//! at process start, validated against an embedded JSON Schema, and hashed so
//! that every evaluation run can cite exactly which thresholds it used.

mod loader;
mod schema;

pub use loader::{RuleSet, RulesetError, RulesetInfo, Threshold};
pub use schema::validate_ruleset_schema;
