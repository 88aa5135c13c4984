//! Reading the sequence type out of the typer's JSON result

use crate::SeqtyperError;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Sequence type written for records that could not be typed
pub const FAILURE_MARKER: &str = "NA";

/// Top-level sections written by known typer versions, tried in order
const KNOWN_SECTIONS: [&str; 2] = ["mlst", "mlst_cge"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingOutcome {
    Typed(String),
    Failed(String),
}

/// One report row: a record id and what happened to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingResult {
    pub id: String,
    pub outcome: TypingOutcome,
}

impl TypingResult {
    pub fn typed(id: impl Into<String>, sequence_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: TypingOutcome::Typed(sequence_type.into()),
        }
    }

    pub fn failed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outcome: TypingOutcome::Failed(reason.into()),
        }
    }

    /// Value for the `sequence_type` column
    pub fn sequence_type(&self) -> &str {
        match &self.outcome {
            TypingOutcome::Typed(st) => st,
            TypingOutcome::Failed(_) => FAILURE_MARKER,
        }
    }

    pub fn is_typed(&self) -> bool {
        matches!(self.outcome, TypingOutcome::Typed(_))
    }
}

/// Extract the sequence type for `id` from a typer artifact
pub fn extract(id: &str, artifact: &Path) -> Result<TypingResult, SeqtyperError> {
    if !artifact.is_file() {
        return Err(SeqtyperError::MalformedResult(format!(
            "{} was not produced",
            artifact.display()
        )));
    }
    let contents = fs::read_to_string(artifact)?;
    let data: Value = serde_json::from_str(&contents)?;
    let sequence_type = sequence_type_from_value(&data)?;
    Ok(TypingResult::typed(id, sequence_type))
}

/// Navigate `<section>.results.sequence_type`, or a bare `results.sequence_type`
pub fn sequence_type_from_value(data: &Value) -> Result<String, SeqtyperError> {
    let root = data
        .as_object()
        .ok_or_else(|| SeqtyperError::MalformedResult("result is not a JSON object".to_string()))?;

    let field = KNOWN_SECTIONS
        .iter()
        .filter_map(|section| root.get(*section))
        .chain(std::iter::once(data))
        .chain(root.values())
        .find_map(|section| section.pointer("/results/sequence_type"))
        .ok_or_else(|| {
            SeqtyperError::MalformedResult("no results.sequence_type field".to_string())
        })?;

    match field {
        Value::String(st) if !st.trim().is_empty() => Ok(st.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(SeqtyperError::MalformedResult(format!(
            "unexpected sequence_type value: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_extract_from_mlst_section() {
        let data = json!({"mlst": {"results": {"sequence_type": "5", "allele_profile": {}}}});
        assert_eq!(sequence_type_from_value(&data).unwrap(), "5");
    }

    #[test]
    fn test_extract_from_mlst_cge_section() {
        let data = json!({"mlst_cge": {"user_input": {}, "results": {"sequence_type": "12"}}});
        assert_eq!(sequence_type_from_value(&data).unwrap(), "12");
    }

    #[test]
    fn test_extract_from_bare_results_and_other_sections() {
        assert_eq!(
            sequence_type_from_value(&json!({"results": {"sequence_type": "Unknown"}})).unwrap(),
            "Unknown"
        );
        assert_eq!(
            sequence_type_from_value(&json!({"typer": {"results": {"sequence_type": "7*"}}})).unwrap(),
            "7*"
        );
    }

    #[test]
    fn test_numeric_sequence_type() {
        let data = json!({"mlst": {"results": {"sequence_type": 131}}});
        assert_eq!(sequence_type_from_value(&data).unwrap(), "131");
    }

    #[test]
    fn test_missing_or_bad_field_is_malformed() {
        for data in [
            json!({"mlst": {"results": {}}}),
            json!({"mlst": {"results": {"sequence_type": null}}}),
            json!({"mlst": {"results": {"sequence_type": ""}}}),
            json!({"mlst": {"results": {"sequence_type": ["1", "2"]}}}),
            json!(["not", "an", "object"]),
        ] {
            assert!(
                matches!(sequence_type_from_value(&data), Err(SeqtyperError::MalformedResult(_))),
                "{} should be malformed",
                data
            );
        }
    }

    #[test]
    fn test_extract_reads_artifact() {
        let dir = TempDir::new().unwrap();
        let artifact = dir.path().join("data.json");
        std::fs::write(&artifact, r#"{"mlst": {"results": {"sequence_type": "5"}}}"#).unwrap();

        let result = extract("seqA", &artifact).unwrap();
        assert_eq!(result, TypingResult::typed("seqA", "5"));
        assert!(result.is_typed());
    }

    #[test]
    fn test_extract_missing_or_unparseable_artifact() {
        let dir = TempDir::new().unwrap();
        let artifact = dir.path().join("data.json");
        assert!(matches!(extract("seqA", &artifact), Err(SeqtyperError::MalformedResult(_))));

        std::fs::write(&artifact, "{ truncated").unwrap();
        assert!(matches!(extract("seqA", &artifact), Err(SeqtyperError::MalformedResult(_))));
    }

    #[test]
    fn test_failed_result_uses_marker() {
        let result = TypingResult::failed("seqB", "typer exited with status 1");
        assert_eq!(result.sequence_type(), FAILURE_MARKER);
        assert!(!result.is_typed());
    }
}
