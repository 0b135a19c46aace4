//! Line-delimited test corpus.

use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Category for cases that do not declare one.
pub const DEFAULT_CATEGORY: &str = "misc";

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Failed to read corpus file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON on line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One test case: an input record plus its category.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    /// Zero-based position among the non-blank lines.
    pub index: usize,
    pub category: String,
    /// The raw input record; parsed only at evaluation time so that an
    /// ill-typed record fails its own case instead of the whole corpus.
    pub input: Value,
}

impl TestCase {
    /// Build a case from a corpus record.
    ///
    /// The input is the record's `input` field, or the record itself when
    /// there is none. `category` defaults to [`DEFAULT_CATEGORY`].
    pub fn from_record(index: usize, record: Value) -> Self {
        let category = record
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();
        let input = match record.get("input") {
            Some(input) => input.clone(),
            None => record,
        };
        Self {
            index,
            category,
            input,
        }
    }
}

/// Parse a corpus from JSON-lines text. Blank lines are skipped.
pub fn parse_corpus(text: &str) -> Result<Vec<TestCase>, CorpusError> {
    let mut cases = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: Value = serde_json::from_str(line).map_err(|source| CorpusError::InvalidLine {
            line: line_no + 1,
            source,
        })?;
        cases.push(TestCase::from_record(cases.len(), record));
    }
    Ok(cases)
}

/// Load a corpus file.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<TestCase>, CorpusError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let cases = parse_corpus(&text)?;
    tracing::info!(path = %path.display(), cases = cases.len(), "Loaded test corpus");
    Ok(cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_input_and_category() {
        let cases = parse_corpus(
            r#"{"input": {"diet": "Halal"}, "category": "diet", "expected": {}}

{"diet": "Vegan"}
"#,
        )
        .unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].category, "diet");
        assert_eq!(cases[0].input, json!({"diet": "Halal"}));
        assert_eq!(cases[1].index, 1);
        assert_eq!(cases[1].category, DEFAULT_CATEGORY);
        assert_eq!(cases[1].input, json!({"diet": "Vegan"}));
    }

    #[test]
    fn test_invalid_line_reports_position() {
        let err = parse_corpus("{}\n\n{oops\n").unwrap_err();
        assert!(matches!(err, CorpusError::InvalidLine { line: 3, .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"input": {{}}, "category": "smoke"}}"#).unwrap();
        let cases = load_corpus(file.path()).unwrap();
        assert_eq!(cases[0].category, "smoke");
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(matches!(
            load_corpus("/nonexistent/corpus.jsonl"),
            Err(CorpusError::IoError(_))
        ));
    }
}
