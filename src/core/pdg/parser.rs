//! PDG snapshot parsing
//!
//! The snapshot is a JSON array of `{"inspireId": <int>, "pdgIdList": [<str>, ...]}`
//! elements. Each element is classified without raising: data-quality issues
//! are expected in the feed and end up in the reports.

use crate::domain::{BibTaskError, RecordId, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub const INSPIRE_ID_KEY: &str = "inspireId";
pub const PDG_ID_LIST_KEY: &str = "pdgIdList";

/// Classification of a single snapshot element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The record exists in the target collection
    Success {
        recid: RecordId,
        pdg_ids: Vec<String>,
    },
    /// Well-formed element whose record is not in the collection
    Missing,
    /// Element does not have the expected shape
    Invalid,
}

/// Snapshot elements sorted by outcome
#[derive(Debug, Clone, Default)]
pub struct ParsedInput {
    /// Desired PDG values per record
    pub pdg_data: BTreeMap<RecordId, Vec<String>>,
    pub missing: Vec<Value>,
    pub invalid: Vec<Value>,
}

/// Reads the snapshot file as a list of raw elements
///
/// # Errors
///
/// Returns [`BibTaskError::Input`] if the file can't be read, isn't JSON, or
/// isn't a JSON array.
pub fn read_elements(path: &Path) -> Result<Vec<Value>> {
    tracing::info!(path = %path.display(), "Reading from file");

    let contents = std::fs::read_to_string(path).map_err(|e| {
        BibTaskError::Input(format!(
            "Could not open {} for reading: {}",
            path.display(),
            e
        ))
    })?;

    let value: Value = serde_json::from_str(&contents).map_err(|e| {
        BibTaskError::Input(format!("Could not decode {} as JSON: {}", path.display(), e))
    })?;

    match value {
        Value::Array(elements) => {
            tracing::info!(count = elements.len(), "Elements parsed from file");
            Ok(elements)
        }
        other => Err(BibTaskError::Input(format!(
            "Expected a JSON array in {}, found {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Classifies one element against the collection's record ids
pub fn parse_element(element: &Value, collection: &BTreeSet<RecordId>) -> ParseOutcome {
    let Some(object) = element.as_object() else {
        return ParseOutcome::Invalid;
    };
    if object.len() != 2
        || !object.contains_key(INSPIRE_ID_KEY)
        || !object.contains_key(PDG_ID_LIST_KEY)
    {
        return ParseOutcome::Invalid;
    }

    let Some(recid) = inspire_id(&object[INSPIRE_ID_KEY]) else {
        return ParseOutcome::Invalid;
    };
    let Some(pdg_ids) = pdg_id_list(&object[PDG_ID_LIST_KEY]) else {
        return ParseOutcome::Invalid;
    };

    if !collection.contains(&recid) {
        return ParseOutcome::Missing;
    }

    ParseOutcome::Success { recid, pdg_ids }
}

// Integers, whole-number floats, or strings holding an integer.
fn inspire_id(value: &Value) -> Option<RecordId> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .map(RecordId::new),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn pdg_id_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Classifies every element of the snapshot
pub fn classify_elements(elements: Vec<Value>, collection: &BTreeSet<RecordId>) -> ParsedInput {
    let mut parsed = ParsedInput::default();

    for (i, element) in elements.into_iter().enumerate() {
        match parse_element(&element, collection) {
            ParseOutcome::Success { recid, pdg_ids } => {
                tracing::debug!(index = i, %recid, %element, "Record ID found for element");
                parsed.pdg_data.insert(recid, pdg_ids);
            }
            ParseOutcome::Invalid => {
                tracing::debug!(index = i, %element, "Invalid element");
                parsed.invalid.push(element);
            }
            ParseOutcome::Missing => {
                tracing::debug!(index = i, %element, "Missing element");
                parsed.missing.push(element);
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use test_case::test_case;

    fn hep() -> BTreeSet<RecordId> {
        [1, 2, 3, 1234].into_iter().map(RecordId::new).collect()
    }

    #[test]
    fn test_success_when_record_in_collection() {
        let element = json!({"inspireId": 1234, "pdgIdList": ["S008", "S009"]});
        assert_eq!(
            parse_element(&element, &hep()),
            ParseOutcome::Success {
                recid: RecordId::new(1234),
                pdg_ids: vec!["S008".to_string(), "S009".to_string()],
            }
        );
    }

    #[test]
    fn test_missing_when_record_not_in_collection() {
        let element = json!({"inspireId": 5555, "pdgIdList": ["S008"]});
        assert_eq!(parse_element(&element, &hep()), ParseOutcome::Missing);
    }

    #[test]
    fn test_whole_number_float_id_accepted() {
        let element = json!({"inspireId": 1234.0, "pdgIdList": ["S008"]});
        assert!(matches!(
            parse_element(&element, &hep()),
            ParseOutcome::Success { recid, .. } if recid == RecordId::new(1234)
        ));
    }

    #[test]
    fn test_string_inspire_id_accepted() {
        let element = json!({"inspireId": "2", "pdgIdList": []});
        assert!(matches!(
            parse_element(&element, &hep()),
            ParseOutcome::Success { recid, .. } if recid == RecordId::new(2)
        ));
    }

    #[test_case(json!({"inspireId": 1}) ; "missing pdg list")]
    #[test_case(json!({"pdgIdList": ["S008"]}) ; "missing inspire id")]
    #[test_case(json!({"inspireId": 1, "pdgIdList": [], "extra": true}) ; "extra key")]
    #[test_case(json!({"inspireid": 1, "pdgIdList": []}) ; "wrong key case")]
    #[test_case(json!({}) ; "empty object")]
    #[test_case(json!([1, ["S008"]]) ; "array element")]
    #[test_case(json!("1234") ; "bare string")]
    #[test_case(json!({"inspireId": "abc", "pdgIdList": []}) ; "non numeric id")]
    #[test_case(json!({"inspireId": -4, "pdgIdList": []}) ; "negative id")]
    #[test_case(json!({"inspireId": 12.5, "pdgIdList": []}) ; "fractional id")]
    #[test_case(json!({"inspireId": -1.0, "pdgIdList": []}) ; "negative float id")]
    #[test_case(json!({"inspireId": 1, "pdgIdList": "S008"}) ; "list is a string")]
    #[test_case(json!({"inspireId": 1, "pdgIdList": [8]}) ; "list of numbers")]
    fn test_invalid_shapes(element: Value) {
        assert_eq!(parse_element(&element, &hep()), ParseOutcome::Invalid);
    }

    #[test]
    fn test_classify_elements_splits_outcomes() {
        let elements = vec![
            json!({"inspireId": 1, "pdgIdList": ["S001"]}),
            json!({"inspireId": 404, "pdgIdList": ["S002"]}),
            json!({"bogus": 1}),
            json!({"inspireId": 3, "pdgIdList": ["S003", "S004"]}),
        ];
        let parsed = classify_elements(elements, &hep());

        assert_eq!(parsed.pdg_data.len(), 2);
        assert_eq!(parsed.pdg_data[&RecordId::new(3)], vec!["S003", "S004"]);
        assert_eq!(parsed.missing, vec![json!({"inspireId": 404, "pdgIdList": ["S002"]})]);
        assert_eq!(parsed.invalid, vec![json!({"bogus": 1})]);
    }

    #[test]
    fn test_read_elements_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[{"inspireId": 1, "pdgIdList": ["S008"]}, {"x": 1}]"#)
            .unwrap();
        file.flush().unwrap();

        let elements = read_elements(file.path()).unwrap();
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn test_read_elements_missing_file_is_input_error() {
        let err = read_elements(Path::new("/nonexistent/pdg.json")).unwrap_err();
        assert!(matches!(err, BibTaskError::Input(_)));
    }

    #[test]
    fn test_read_elements_rejects_non_array() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"inspireId": 1, "pdgIdList": []}"#).unwrap();
        file.flush().unwrap();

        let err = read_elements(file.path()).unwrap_err();
        assert!(matches!(err, BibTaskError::Input(_)));
        assert!(err.to_string().contains("an object"));
    }
}
