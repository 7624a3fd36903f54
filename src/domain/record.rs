//! Bibliographic record model
//!
//! A MARC-style record: the control identifier (`001`), other control fields
//! and an ordered list of data fields, each with a tag, two indicators and
//! ordered subfields. The record store owns the authoritative copy; instances
//! here are transient working copies and change records.

use super::ids::RecordId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tag of the control field carrying the record id
pub const RECID_TAG: &str = "001";

/// Blank indicator
pub const BLANK_INDICATOR: char = ' ';

/// One `(code, value)` pair inside a data field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subfield {
    pub code: char,
    pub value: String,
}

impl Subfield {
    pub fn new(code: char, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }
}

/// A data field instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub tag: String,
    pub ind1: char,
    pub ind2: char,
    pub subfields: Vec<Subfield>,
}

impl DataField {
    /// Creates an empty field with the given tag and indicators
    pub fn new(tag: impl Into<String>, ind1: char, ind2: char) -> Self {
        Self {
            tag: tag.into(),
            ind1,
            ind2,
            subfields: Vec::new(),
        }
    }

    /// Appends a subfield, builder style
    pub fn with_subfield(mut self, code: char, value: impl Into<String>) -> Self {
        self.add_subfield(code, value);
        self
    }

    /// Appends a subfield
    pub fn add_subfield(&mut self, code: char, value: impl Into<String>) {
        self.subfields.push(Subfield::new(code, value));
    }

    /// All values of subfields with `code`, in order
    pub fn subfield_values(&self, code: char) -> impl Iterator<Item = &str> + '_ {
        self.subfields
            .iter()
            .filter(move |sf| sf.code == code)
            .map(|sf| sf.value.as_str())
    }

    /// First value of subfield `code`, if any
    pub fn first_subfield_value(&self, code: char) -> Option<&str> {
        self.subfield_values(code).next()
    }
}

/// A bibliographic record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    recid: RecordId,
    control_fields: BTreeMap<String, String>,
    data_fields: Vec<DataField>,
}

impl Record {
    /// Creates a record holding only its control identifier
    pub fn new(recid: RecordId) -> Self {
        Self {
            recid,
            control_fields: BTreeMap::new(),
            data_fields: Vec::new(),
        }
    }

    pub fn recid(&self) -> RecordId {
        self.recid
    }

    /// Control fields other than `001`
    pub fn control_fields(&self) -> &BTreeMap<String, String> {
        &self.control_fields
    }

    /// Sets a control field. `001` is derived from the record id and ignored here.
    pub fn set_control_field(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        let tag = tag.into();
        if tag != RECID_TAG {
            self.control_fields.insert(tag, value.into());
        }
    }

    /// Data fields in document order
    pub fn data_fields(&self) -> &[DataField] {
        &self.data_fields
    }

    /// All instances of data field `tag`, in document order
    pub fn field_instances<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a DataField> + 'a {
        self.data_fields.iter().filter(move |f| f.tag == tag)
    }

    /// Whether the record carries at least one `tag` data field
    pub fn has_field(&self, tag: &str) -> bool {
        self.field_instances(tag).next().is_some()
    }

    /// Appends a data field and returns its global position
    pub fn add_field(&mut self, field: DataField) -> usize {
        self.data_fields.push(field);
        self.data_fields.len() - 1
    }

    /// Removes every `tag` field matching `predicate`, returning how many went
    pub fn delete_fields_where<F>(&mut self, tag: &str, mut predicate: F) -> usize
    where
        F: FnMut(&DataField) -> bool,
    {
        let before = self.data_fields.len();
        self.data_fields
            .retain(|f| !(f.tag == tag && predicate(f)));
        before - self.data_fields.len()
    }

    /// True when the record has no data fields
    pub fn has_no_data_fields(&self) -> bool {
        self.data_fields.is_empty()
    }
}
