//! Ruleset parsing from JSON/YAML files.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_ruleset_schema;

/// Version reported when no ruleset file is present.
pub const DEFAULT_RULESET_VERSION: &str = "v1";

/// Errors that can occur when loading a ruleset.
///
/// A missing file is not an error (see [`RuleSet::load`]); everything here
/// means a ruleset was present but cannot be trusted.
#[derive(Error, Debug)]
pub enum RulesetError {
    #[error("Failed to read ruleset file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Ruleset validation failed: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),
}

/// Thresholds the oracle reads, with their documented defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// Per-recipe sugars (g) at or above which a diabetic subject is flagged.
    DiabetesAddedSugarsHigh,
    /// Minimum safe internal cook temperature for poultry (°C).
    PoultryMinCookTemp,
    /// Daily vitamin A upper limit in pregnancy (µg RAE).
    VitaminAPregnancyUpperLimit,
    /// Subjects strictly younger than this (years) get choking-hazard checks.
    ChokingHazardMaxAge,
}

impl Threshold {
    /// Key of this threshold in the ruleset document.
    pub fn key(&self) -> &'static str {
        match self {
            Threshold::DiabetesAddedSugarsHigh => "diabetes_added_sugars_high_g",
            Threshold::PoultryMinCookTemp => "poultry_min_cook_temp_c",
            Threshold::VitaminAPregnancyUpperLimit => "vitamin_a_pregnancy_ul_rae_ug",
            Threshold::ChokingHazardMaxAge => "choking_hazard_max_age_years",
        }
    }

    /// Value used when the active ruleset does not define this threshold.
    pub fn default_value(&self) -> f64 {
        match self {
            Threshold::DiabetesAddedSugarsHigh => 15.0,
            Threshold::PoultryMinCookTemp => 74.0,
            Threshold::VitaminAPregnancyUpperLimit => 3000.0,
            Threshold::ChokingHazardMaxAge => 4.0,
        }
    }

    pub const ALL: [Threshold; 4] = [
        Threshold::DiabetesAddedSugarsHigh,
        Threshold::PoultryMinCookTemp,
        Threshold::VitaminAPregnancyUpperLimit,
        Threshold::ChokingHazardMaxAge,
    ];
}

/// Ruleset document as it appears on disk.
#[derive(Debug, Deserialize)]
struct RulesetDocument {
    #[serde(default = "default_version")]
    version: String,

    #[serde(default)]
    thresholds: BTreeMap<String, f64>,
}

fn default_version() -> String {
    DEFAULT_RULESET_VERSION.to_string()
}

/// A loaded, immutable ruleset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Ruleset version declared by the document
    pub version: String,

    /// Named numeric thresholds
    pub thresholds: BTreeMap<String, f64>,

    /// Hex SHA-256 of the raw file bytes (empty for the built-in default)
    pub content_hash: String,

    /// Path the ruleset was loaded from (empty for the built-in default)
    pub source_path: String,
}

/// Provenance triple cited by run summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetInfo {
    pub version: String,
    pub path: String,
    pub sha256: String,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            version: DEFAULT_RULESET_VERSION.to_string(),
            thresholds: BTreeMap::new(),
            content_hash: String::new(),
            source_path: String::new(),
        }
    }
}

impl RuleSet {
    /// Load a ruleset file.
    ///
    /// A missing file yields [`RuleSet::default`] and a warning; any other
    /// failure (unreadable, unparseable, schema violation) is returned so the
    /// caller can abort before evaluating anything.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesetError> {
        let path = path.as_ref();
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Ruleset not found, using built-in defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let document: serde_json::Value = if is_yaml {
            serde_yaml::from_slice(&raw)?
        } else {
            serde_json::from_slice(&raw)?
        };

        let ruleset = Self::from_document(document, &raw, path.display().to_string())?;
        tracing::info!(
            version = %ruleset.version,
            path = %ruleset.source_path,
            sha256 = %ruleset.content_hash,
            thresholds = ruleset.thresholds.len(),
            "Loaded ruleset"
        );
        Ok(ruleset)
    }

    /// Parse a ruleset from a JSON string. `source_path` is left empty.
    pub fn from_json(json: &str) -> Result<Self, RulesetError> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        Self::from_document(document, json.as_bytes(), String::new())
    }

    /// Parse a ruleset from a YAML string. `source_path` is left empty.
    pub fn from_yaml(yaml: &str) -> Result<Self, RulesetError> {
        let document: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_document(document, yaml.as_bytes(), String::new())
    }

    /// Build a ruleset in memory from threshold pairs, without provenance.
    pub fn with_thresholds<I, K>(version: impl Into<String>, thresholds: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            version: version.into(),
            thresholds: thresholds.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            content_hash: String::new(),
            source_path: String::new(),
        }
    }

    fn from_document(
        document: serde_json::Value,
        raw: &[u8],
        source_path: String,
    ) -> Result<Self, RulesetError> {
        validate_ruleset_schema(&document).map_err(RulesetError::SchemaViolation)?;
        let parsed: RulesetDocument = serde_json::from_value(document)?;

        Ok(Self {
            version: parsed.version,
            thresholds: parsed.thresholds,
            content_hash: content_hash(raw),
            source_path,
        })
    }

    /// Look up a threshold by key, falling back to `default`.
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.thresholds.get(key).copied().unwrap_or(default)
    }

    /// Look up a documented threshold, falling back to its default.
    pub fn threshold(&self, threshold: Threshold) -> f64 {
        self.get_or(threshold.key(), threshold.default_value())
    }

    /// Provenance for run summaries.
    pub fn info(&self) -> RulesetInfo {
        RulesetInfo {
            version: self.version.clone(),
            path: self.source_path.clone(),
            sha256: self.content_hash.clone(),
        }
    }
}

fn content_hash(raw: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const V2_JSON: &str = r#"{"version": "v2", "thresholds": {"poultry_min_cook_temp_c": 71}}"#;

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let ruleset = RuleSet::load(dir.path().join("absent.json")).unwrap();

        assert_eq!(ruleset, RuleSet::default());
        assert_eq!(ruleset.version, "v1");
        assert!(ruleset.thresholds.is_empty());
        assert!(ruleset.content_hash.is_empty());
        assert!(ruleset.source_path.is_empty());
    }

    #[test]
    fn test_load_json_records_provenance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v2.json");
        fs::File::create(&path)
            .unwrap()
            .write_all(V2_JSON.as_bytes())
            .unwrap();

        let ruleset = RuleSet::load(&path).unwrap();
        assert_eq!(ruleset.version, "v2");
        assert_eq!(ruleset.source_path, path.display().to_string());
        assert_eq!(ruleset.content_hash, content_hash(V2_JSON.as_bytes()));
        assert_eq!(ruleset.content_hash.len(), 64);
        assert_eq!(ruleset.threshold(Threshold::PoultryMinCookTemp), 71.0);
    }

    #[test]
    fn test_load_yaml_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v3.yaml");
        fs::write(&path, "version: v3\nthresholds:\n  diabetes_added_sugars_high_g: 10\n").unwrap();

        let ruleset = RuleSet::load(&path).unwrap();
        assert_eq!(ruleset.version, "v3");
        assert_eq!(ruleset.threshold(Threshold::DiabetesAddedSugarsHigh), 10.0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"version\": \"v1\", \"thresholds\": {").unwrap();

        assert!(matches!(RuleSet::load(&path), Err(RulesetError::JsonError(_))));
    }

    #[test]
    fn test_schema_violation_is_an_error() {
        let result = RuleSet::from_json(r#"{"version": "v1", "thresholds": {"x": "high"}}"#);
        assert!(matches!(result, Err(RulesetError::SchemaViolation(_))));
    }

    #[test]
    fn test_missing_version_defaults() {
        let ruleset = RuleSet::from_json(r#"{"thresholds": {}}"#).unwrap();
        assert_eq!(ruleset.version, DEFAULT_RULESET_VERSION);
    }

    #[test]
    fn test_missing_threshold_uses_documented_default() {
        let ruleset = RuleSet::default();
        for threshold in Threshold::ALL {
            assert_eq!(ruleset.threshold(threshold), threshold.default_value());
        }
        assert_eq!(ruleset.get_or("unknown_key", 42.0), 42.0);
    }

    #[test]
    fn test_hash_tracks_raw_bytes() {
        let a = RuleSet::from_json(V2_JSON).unwrap();
        let b = RuleSet::from_json(&format!("{}\n", V2_JSON)).unwrap();
        assert_eq!(a.thresholds, b.thresholds);
        assert_ne!(a.content_hash, b.content_hash);
    }

    #[test]
    fn test_info() {
        let info = RuleSet::from_json(V2_JSON).unwrap().info();
        assert_eq!(info.version, "v2");
        assert_eq!(info.path, "");
        assert_eq!(info.sha256.len(), 64);
    }
}
