//! Core business logic for bibtasks.
//!
//! # Modules
//!
//! - [`marcxml`] - MARCXML reading and writing
//! - [`pdg`] - PDG identifier synchronization job
//! - [`submission`] - web submission record forwarding
//!
//! # Example
//!
//! ```rust,no_run
//! use bibtasks::adapters::source::create_record_source;
//! use bibtasks::config::load_config;
//! use bibtasks::core::pdg::{PdgSyncJob, PdgSyncOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bibtasks.toml")?;
//! let source = create_record_source(&config.source).await?;
//! let options = PdgSyncOptions::from_config(&config, "pdg-snapshot.json");
//!
//! let summary = PdgSyncJob::new(source, None, options).run().await?;
//!
//! println!("Appended: {}", summary.appended);
//! println!("Corrected: {}", summary.corrected);
//! println!("Deleted: {}", summary.deleted);
//! # Ok(())
//! # }
//! ```

pub mod marcxml;
pub mod pdg;
pub mod submission;
