//! Configuration management for bibtasks.
//!
//! bibtasks uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `BIBTASKS_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bibtasks::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bibtasks.toml")?;
//! println!("Record source: {}", config.source.backend);
//! println!("PDG search term: {}", config.pdg.search_term);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level, dry-run default
//! - [`PlatformConfig`] - shared temporary directory of the platform
//! - [`SourceConfig`] - record source backend (MARCXML dump or Invenio HTTP)
//! - [`TasksConfig`] - where the task binaries live
//! - [`PdgConfig`] - PDG sync job settings
//! - [`SubmissionConfig`] - web submission forwarding settings
//! - [`LoggingConfig`] - file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [platform]
//! tmp_shared_dir = "/opt/invenio/var/tmp-shared"
//!
//! [source]
//! backend = "invenio"
//! base_url = "https://inspirehep.net"
//! api_key = "${BIBTASKS_API_KEY}"
//!
//! [tasks]
//! bin_dir = "/opt/invenio/bin"
//!
//! [pdg]
//! search_term = "084:pdg"
//! collection = "HEP"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BibTasksConfig, LoggingConfig, PdgConfig, PlatformConfig, SourceBackend,
    SourceConfig, SubmissionConfig, TasksConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
