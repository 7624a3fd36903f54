//! PDG identifier synchronization
//!
//! Reconciles the PDG classification fields (`084` with `$2PDG` and `$9PDG`)
//! of HEP records against a JSON snapshot of the PDG database.
//!
//! - [`parser`] - snapshot reading and element classification
//! - [`reconcile`] - add/compare/delete partition and change records
//! - [`report`] - change-set and report files
//! - [`job`] - the orchestrated run
//! - [`summary`] - run results

pub mod job;
pub mod parser;
pub mod reconcile;
pub mod report;
pub mod summary;

pub use job::{PdgSyncJob, PdgSyncOptions};
pub use parser::{classify_elements, parse_element, read_elements, ParseOutcome, ParsedInput};
pub use reconcile::{
    diff_pdg_values, is_pdg_field, ChangeSet, ComparedChanges, PdgDiff, ReconciliationSets,
};
pub use report::ReportWriter;
pub use summary::{ChangeKind, PdgSyncSummary};
