// bibtasks - INSPIRE/Invenio maintenance tasks
// Copyright (c) 2025 bibtasks Contributors
// Licensed under the GNU General Public License v2 or later

//! # bibtasks - INSPIRE/Invenio maintenance tasks
//!
//! bibtasks hosts batch procedures that run against an Invenio digital
//! library and hand their results to the platform's upload pipeline.
//!
//! ## Overview
//!
//! - **PDG sync**: reconciles the PDG identifiers (`084` fields) of HEP
//!   records with a JSON snapshot of the PDG database and emits append,
//!   correct and delete change-sets as MARCXML
//! - **Record forwarding**: stages a web submission's record file and queues
//!   an insert-or-replace upload for it
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (MARCXML, PDG sync, submission forwarding)
//! - [`adapters`] - Record sources and task submission
//! - [`domain`] - Records, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bibtasks::adapters::source::create_record_source;
//! use bibtasks::config::load_config;
//! use bibtasks::core::pdg::{PdgSyncJob, PdgSyncOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("bibtasks.toml")?;
//!     let source = create_record_source(&config.source).await?;
//!
//!     let options = PdgSyncOptions::from_config(&config, "pdg-snapshot.json")
//!         .with_dry_run(true);
//!     let summary = PdgSyncJob::new(source, None, options).run().await?;
//!
//!     println!("{} records would change", summary.total_changes());
//!     Ok(())
//! }
//! ```
//!
//! ## Reconciliation
//!
//! Record ids are partitioned into records new to the snapshot, records in
//! both, and records no longer in it:
//!
//! ```rust
//! use bibtasks::core::pdg::ReconciliationSets;
//! use bibtasks::domain::RecordId;
//!
//! let current = [RecordId::new(1), RecordId::new(2)];
//! let desired = [RecordId::new(2), RecordId::new(3)];
//! let sets = ReconciliationSets::partition(&current, &desired);
//!
//! assert!(sets.add.contains(&RecordId::new(3)));
//! assert!(sets.compare.contains(&RecordId::new(2)));
//! assert!(sets.delete.contains(&RecordId::new(1)));
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type is
//! [`domain::BibTaskError`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
