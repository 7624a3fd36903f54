//! External system integrations for bibtasks.
//!
//! - [`source`] - record search and retrieval ([`source::MarcXmlStore`],
//!   [`source::InvenioClient`])
//! - [`tasks`] - low-level task submission ([`tasks::CommandSubmitter`])
//!
//! # Design Pattern
//!
//! Adapters isolate the host platform behind the [`source::RecordSource`] and
//! [`tasks::TaskSubmitter`] traits so the jobs can be exercised against
//! fixtures.
//!
//! ```rust,no_run
//! use bibtasks::adapters::source::{MarcXmlStore, RecordSource};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MarcXmlStore::open("hep-dump.xml").await?;
//! let ids = store.search("084:pdg").await?;
//! println!("{} records carry PDG data", ids.len());
//! # Ok(())
//! # }
//! ```

pub mod source;
pub mod tasks;
