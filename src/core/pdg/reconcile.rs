//! Reconciliation of current and desired PDG identifiers
//!
//! Records are split into three sets: `add` (new in the snapshot), `compare`
//! (in both) and `delete` (no longer in the snapshot). Each set produces its
//! own kind of change record:
//!
//! - append: `001` plus one new `084` field per PDG value
//! - correct: `001` plus the full `084` block after the edit (the correct
//!   upload mode replaces the whole tag)
//! - delete: `001` plus exactly the PDG fields to remove

use crate::domain::record::BLANK_INDICATOR;
use crate::domain::{DataField, Record, RecordId};
use std::collections::{BTreeMap, BTreeSet};

/// Tag holding subject classification fields
pub const CLASSIFICATION_TAG: &str = "084";

/// Scheme and source value marking a PDG field
pub const PDG_SCHEME: &str = "PDG";

const SCHEME_CODE: char = '2';
const SOURCE_CODE: char = '9';
const VALUE_CODE: char = 'a';

/// Change records keyed by record id
pub type ChangeSet = BTreeMap<RecordId, Record>;

/// True iff the field's scheme (`2`) and source (`9`) are both `PDG`
pub fn is_pdg_field(field: &DataField) -> bool {
    field.tag == CLASSIFICATION_TAG
        && field.first_subfield_value(SCHEME_CODE) == Some(PDG_SCHEME)
        && field.first_subfield_value(SOURCE_CODE) == Some(PDG_SCHEME)
}

/// Builds a `084` field carrying a PDG value
pub fn pdg_field(value: &str) -> DataField {
    DataField::new(CLASSIFICATION_TAG, BLANK_INDICATOR, BLANK_INDICATOR)
        .with_subfield(SCHEME_CODE, PDG_SCHEME)
        .with_subfield(SOURCE_CODE, PDG_SCHEME)
        .with_subfield(VALUE_CODE, value)
}

/// PDG values currently attached to a record
pub fn current_pdg_values(record: &Record) -> BTreeSet<String> {
    record
        .field_instances(CLASSIFICATION_TAG)
        .filter(|f| is_pdg_field(f))
        .filter_map(|f| f.first_subfield_value(VALUE_CODE))
        .map(str::to_string)
        .collect()
}

/// The add/compare/delete partition of record ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationSets {
    pub add: BTreeSet<RecordId>,
    pub compare: BTreeSet<RecordId>,
    pub delete: BTreeSet<RecordId>,
}

impl ReconciliationSets {
    /// Partitions the union of current and desired ids
    pub fn partition<'a, C, D>(current: C, desired: D) -> Self
    where
        C: IntoIterator<Item = &'a RecordId>,
        D: IntoIterator<Item = &'a RecordId>,
    {
        let current: BTreeSet<RecordId> = current.into_iter().copied().collect();
        let desired: BTreeSet<RecordId> = desired.into_iter().copied().collect();

        Self {
            add: desired.difference(&current).copied().collect(),
            compare: current.intersection(&desired).copied().collect(),
            delete: current.difference(&desired).copied().collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.add.len() + self.compare.len() + self.delete.len()
    }
}

/// Difference between current and desired PDG values of one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdgDiff {
    pub additions: BTreeSet<String>,
    pub deletions: BTreeSet<String>,
}

impl PdgDiff {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty()
    }
}

/// Computes which PDG values to add and which to drop
pub fn diff_pdg_values(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> PdgDiff {
    PdgDiff {
        additions: desired.difference(current).cloned().collect(),
        deletions: current.difference(desired).cloned().collect(),
    }
}

/// Builds append records for ids new to the PDG set
pub fn create_new_pdg_fields(
    recids: &BTreeSet<RecordId>,
    pdg_data: &BTreeMap<RecordId, Vec<String>>,
) -> ChangeSet {
    tracing::info!(count = recids.len(), "Creating new PDG fields");

    let mut records = ChangeSet::new();
    for &recid in recids {
        let mut record = Record::new(recid);
        let mut seen = BTreeSet::new();
        for value in pdg_data.get(&recid).into_iter().flatten() {
            if seen.insert(value.as_str()) {
                record.add_field(pdg_field(value));
            }
        }
        records.insert(recid, record);
    }
    records
}

/// Builds delete records carrying every PDG field of each record
pub fn remove_pdg_fields(
    recids: &BTreeSet<RecordId>,
    current_records: &BTreeMap<RecordId, Record>,
) -> ChangeSet {
    tracing::info!(count = recids.len(), "Removing PDG data from records");

    let mut records = ChangeSet::new();
    for &recid in recids {
        let Some(current) = current_records.get(&recid) else {
            tracing::warn!(%recid, "No current record to remove PDG data from");
            continue;
        };

        let record = pdg_removal(current);
        tracing::debug!(
            %recid,
            removed = record.data_fields().len(),
            total = current.field_instances(CLASSIFICATION_TAG).count(),
            "Fields to be removed from record"
        );
        records.insert(recid, record);
    }
    records
}

// `001` plus every PDG field of `current`
fn pdg_removal(current: &Record) -> Record {
    let mut record = Record::new(current.recid());
    for field in current.field_instances(CLASSIFICATION_TAG) {
        if is_pdg_field(field) {
            record.add_field(field.clone());
        }
    }
    record
}

/// Change records produced by comparing existing PDG data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparedChanges {
    /// Records whose `084` block is replaced
    pub corrections: ChangeSet,
    /// Records whose `084` block would end up empty; their PDG fields are
    /// deleted instead
    pub removals: ChangeSet,
}

/// Builds correct records for ids whose PDG values changed
///
/// Records whose current and desired values already agree produce nothing.
/// An empty `084` block can't be uploaded in correct mode, so a record that
/// loses all of its classification fields goes to `removals`.
pub fn check_existing_pdg_fields(
    recids: &BTreeSet<RecordId>,
    pdg_data: &BTreeMap<RecordId, Vec<String>>,
    current_records: &BTreeMap<RecordId, Record>,
) -> ComparedChanges {
    tracing::info!(count = recids.len(), "Comparing new and old PDG data");

    let mut changes = ComparedChanges::default();
    for &recid in recids {
        let Some(current) = current_records.get(&recid) else {
            tracing::warn!(%recid, "No current record to compare PDG data against");
            continue;
        };

        let desired: BTreeSet<String> = pdg_data
            .get(&recid)
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        let diff = diff_pdg_values(&current_pdg_values(current), &desired);

        if diff.is_empty() {
            tracing::debug!(%recid, "Nothing to change for record");
            continue;
        }

        let mut record = Record::new(recid);
        for field in current.field_instances(CLASSIFICATION_TAG) {
            record.add_field(field.clone());
        }
        let removed = record.delete_fields_where(CLASSIFICATION_TAG, |field| {
            is_pdg_field(field)
                && field
                    .first_subfield_value(VALUE_CODE)
                    .is_some_and(|v| diff.deletions.contains(v))
        });
        for value in &diff.additions {
            record.add_field(pdg_field(value));
        }

        if record.has_no_data_fields() {
            tracing::debug!(%recid, removed, "No 084 fields left, deleting PDG data");
            changes.removals.insert(recid, pdg_removal(current));
            continue;
        }

        tracing::debug!(
            %recid,
            removed,
            added = diff.additions.len(),
            "Record PDG data corrected"
        );
        changes.corrections.insert(recid, record);
    }

    tracing::info!(
        corrected = changes.corrections.len(),
        emptied = changes.removals.len(),
        "Records to be corrected"
    );
    changes
}
