//! Domain models and types for bibtasks.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`RecordId`], [`TaskId`])
//! - **Record model** ([`Record`], [`DataField`], [`Subfield`])
//! - **Error types** ([`BibTaskError`], [`RecordSourceError`], [`SubmissionError`])
//! - **Result type alias** ([`Result`])
//!
//! # Example
//!
//! ```rust
//! use bibtasks::domain::{DataField, Record, RecordId};
//!
//! let mut record = Record::new(RecordId::new(1234));
//! record.add_field(
//!     DataField::new("084", ' ', ' ')
//!         .with_subfield('2', "PDG")
//!         .with_subfield('9', "PDG")
//!         .with_subfield('a', "S008"),
//! );
//! assert!(record.has_field("084"));
//! ```

pub mod errors;
pub mod ids;
pub mod record;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{BibTaskError, RecordSourceError, SubmissionError};
pub use ids::{RecordId, TaskId};
pub use record::{DataField, Record, Subfield};
pub use result::Result;
