//! Record source backed by a MARCXML collection dump
//!
//! Useful for offline runs against an export of the record store and as the
//! fixture backend in tests. Search understands field queries of the form
//! `TAG[ind1 ind2 [code]]:term` (for example `084:pdg` or `084__2:pdg`, `_`
//! matching any indicator) and bare terms searched across all subfields.
//! Matching is word-based and case-insensitive.

use super::traits::RecordSource;
use crate::core::marcxml::parse_collection;
use crate::domain::{
    BibTaskError, DataField, Record, RecordId, RecordSourceError, Result,
};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Tag and subfield listing the collections a record belongs to
const COLLECTION_TAG: &str = "980";
const COLLECTION_CODE: char = 'a';

/// In-memory record store loaded from MARCXML
#[derive(Debug, Clone, Default)]
pub struct MarcXmlStore {
    records: BTreeMap<RecordId, Record>,
}

impl MarcXmlStore {
    /// Builds a store from already parsed records
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.recid(), r)).collect(),
        }
    }

    /// Parses a MARCXML collection document
    pub fn from_xml(content: &str) -> Result<Self> {
        Ok(Self::from_records(parse_collection(content)?))
    }

    /// Loads a MARCXML collection file
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid MARCXML.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            BibTaskError::RecordSource(RecordSourceError::ConnectionFailed(format!(
                "Failed to read MARCXML dump {}: {}",
                path.display(),
                e
            )))
        })?;
        let store = Self::from_xml(&content)?;
        tracing::info!(
            path = %path.display(),
            records = store.len(),
            "MARCXML dump loaded"
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A parsed search query
#[derive(Debug, Clone, PartialEq, Eq)]
enum SearchQuery {
    Field {
        tag: String,
        ind1: Option<char>,
        ind2: Option<char>,
        code: Option<char>,
        term: String,
    },
    AnyField {
        term: String,
    },
}

impl SearchQuery {
    fn parse(query: &str) -> Result<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RecordSourceError::UnsupportedQuery("empty query".to_string()).into());
        }

        let Some((field, term)) = query.split_once(':') else {
            return Ok(SearchQuery::AnyField {
                term: query.to_string(),
            });
        };

        let spec: Vec<char> = field.trim().chars().collect();
        let tag_ok = spec.len() >= 3 && spec.len() <= 6 && spec[..3].iter().all(char::is_ascii_digit);
        if !tag_ok || term.trim().is_empty() {
            return Err(RecordSourceError::UnsupportedQuery(query.to_string()).into());
        }

        let wildcard = |c: Option<&char>| c.copied().filter(|&c| c != '_');
        Ok(SearchQuery::Field {
            tag: spec[..3].iter().collect(),
            ind1: wildcard(spec.get(3)),
            ind2: wildcard(spec.get(4)),
            code: spec.get(5).copied(),
            term: term.trim().to_string(),
        })
    }

    fn matches(&self, record: &Record) -> bool {
        match self {
            SearchQuery::Field {
                tag,
                ind1,
                ind2,
                code,
                term,
            } => record
                .field_instances(tag)
                .filter(|f| ind1.map_or(true, |i| f.ind1 == i))
                .filter(|f| ind2.map_or(true, |i| f.ind2 == i))
                .any(|f| field_matches(f, *code, term)),
            SearchQuery::AnyField { term } => record
                .data_fields()
                .iter()
                .any(|f| field_matches(f, None, term)),
        }
    }
}

fn field_matches(field: &DataField, code: Option<char>, term: &str) -> bool {
    field
        .subfields
        .iter()
        .filter(|sf| code.map_or(true, |c| sf.code == c))
        .any(|sf| value_matches(&sf.value, term))
}

fn value_matches(value: &str, term: &str) -> bool {
    value.trim().eq_ignore_ascii_case(term)
        || value
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word.eq_ignore_ascii_case(term))
}

#[async_trait]
impl RecordSource for MarcXmlStore {
    async fn search(&self, query: &str) -> Result<Vec<RecordId>> {
        let parsed = SearchQuery::parse(query)?;
        Ok(self
            .records
            .values()
            .filter(|r| parsed.matches(r))
            .map(Record::recid)
            .collect())
    }

    async fn collection_members(&self, name: &str) -> Result<BTreeSet<RecordId>> {
        Ok(self
            .records
            .values()
            .filter(|r| {
                r.field_instances(COLLECTION_TAG).any(|f| {
                    f.subfield_values(COLLECTION_CODE)
                        .any(|v| v.trim().eq_ignore_ascii_case(name))
                })
            })
            .map(Record::recid)
            .collect())
    }

    async fn get_record(&self, recid: RecordId) -> Result<Option<Record>> {
        Ok(self.records.get(&recid).cloned())
    }

    fn backend_name(&self) -> &'static str {
        "marcxml"
    }
}
