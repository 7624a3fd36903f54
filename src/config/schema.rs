//! Configuration schema types
//!
//! This module defines the configuration structure for bibtasks.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Record source backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceBackend {
    /// Local MARCXML collection dump
    MarcXml,
    /// Invenio HTTP search/export endpoints
    Invenio,
}

impl std::fmt::Display for SourceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceBackend::MarcXml => write!(f, "marcxml"),
            SourceBackend::Invenio => write!(f, "invenio"),
        }
    }
}

/// Main bibtasks configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BibTasksConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Host platform settings
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Record source (search and record store)
    pub source: SourceConfig,

    /// Task queue submission
    #[serde(default)]
    pub tasks: TasksConfig,

    /// PDG identifier sync job
    #[serde(default)]
    pub pdg: PdgConfig,

    /// Web submission record forwarding
    #[serde(default)]
    pub submission: SubmissionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BibTasksConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.platform.validate()?;
        self.source.validate()?;
        self.tasks.validate()?;
        self.pdg.validate()?;
        self.submission.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Directory staged submission files are copied to
    pub fn staging_dir(&self) -> &str {
        self.submission
            .staging_dir
            .as_deref()
            .unwrap_or(&self.platform.tmp_shared_dir)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (don't write change-sets)
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Host platform settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Shared temporary directory visible to the task workers
    #[serde(default = "default_tmp_shared_dir")]
    pub tmp_shared_dir: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            tmp_shared_dir: default_tmp_shared_dir(),
        }
    }
}

impl PlatformConfig {
    fn validate(&self) -> Result<(), String> {
        if self.tmp_shared_dir.trim().is_empty() {
            return Err("platform.tmp_shared_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Record source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Backend type (marcxml or invenio)
    pub backend: SourceBackend,

    /// MARCXML dump path (required if backend = marcxml)
    #[serde(default)]
    pub marcxml_path: Option<String>,

    /// Base URL of the Invenio instance (required if backend = invenio)
    #[serde(default)]
    pub base_url: Option<String>,

    /// API key sent as a bearer token (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        match self.backend {
            SourceBackend::MarcXml => {
                let path = self.marcxml_path.as_deref().unwrap_or_default();
                if path.trim().is_empty() {
                    return Err(
                        "source.marcxml_path is required when source.backend = 'marcxml'"
                            .to_string(),
                    );
                }
            }
            SourceBackend::Invenio => {
                let base_url = self.base_url.as_deref().unwrap_or_default();
                if base_url.trim().is_empty() {
                    return Err(
                        "source.base_url is required when source.backend = 'invenio'".to_string(),
                    );
                }
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    return Err(format!(
                        "source.base_url must start with http:// or https://, got '{base_url}'"
                    ));
                }
            }
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 600 {
            return Err(format!(
                "source.timeout_seconds must be between 1 and 600, got {}",
                self.timeout_seconds
            ));
        }
        Ok(())
    }
}

/// Task queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Directory holding the platform task binaries (bibupload, ...)
    #[serde(default = "default_bin_dir")]
    pub bin_dir: String,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            bin_dir: default_bin_dir(),
        }
    }
}

impl TasksConfig {
    fn validate(&self) -> Result<(), String> {
        if self.bin_dir.trim().is_empty() {
            return Err("tasks.bin_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

/// PDG sync job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdgConfig {
    /// Search term selecting records that currently carry PDG data
    #[serde(default = "default_pdg_search_term")]
    pub search_term: String,

    /// Collection the snapshot records must belong to
    #[serde(default = "default_pdg_collection")]
    pub collection: String,

    /// Prefix of every output file
    #[serde(default = "default_pdg_output_prefix")]
    pub output_prefix: String,

    /// Priority of uploads queued with --submit
    #[serde(default = "default_priority")]
    pub upload_priority: i32,

    /// User label for uploads queued with --submit
    #[serde(default = "default_pdg_task_user")]
    pub task_user: String,
}

impl Default for PdgConfig {
    fn default() -> Self {
        Self {
            search_term: default_pdg_search_term(),
            collection: default_pdg_collection(),
            output_prefix: default_pdg_output_prefix(),
            upload_priority: default_priority(),
            task_user: default_pdg_task_user(),
        }
    }
}

impl PdgConfig {
    fn validate(&self) -> Result<(), String> {
        if self.search_term.trim().is_empty() {
            return Err("pdg.search_term cannot be empty".to_string());
        }
        if self.collection.trim().is_empty() {
            return Err("pdg.collection cannot be empty".to_string());
        }
        if self.output_prefix.contains('/') {
            return Err(format!(
                "pdg.output_prefix must not contain '/', got '{}'",
                self.output_prefix
            ));
        }
        validate_priority("pdg.upload_priority", self.upload_priority)
    }
}

/// Web submission forwarding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Name of the prepared record file inside the submission directory
    #[serde(default = "default_record_file")]
    pub record_file: String,

    /// Staging directory (defaults to platform.tmp_shared_dir)
    #[serde(default)]
    pub staging_dir: Option<String>,

    /// User label for the upload task
    #[serde(default = "default_submission_task_user")]
    pub task_user: String,

    /// Upload task priority
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            record_file: default_record_file(),
            staging_dir: None,
            task_user: default_submission_task_user(),
            priority: default_priority(),
        }
    }
}

impl SubmissionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.record_file.trim().is_empty() || self.record_file.contains('/') {
            return Err(format!(
                "submission.record_file must be a plain file name, got '{}'",
                self.record_file
            ));
        }
        validate_priority("submission.priority", self.priority)
    }
}

fn validate_priority(name: &str, priority: i32) -> Result<(), String> {
    if !(-10..=10).contains(&priority) {
        return Err(format!("{name} must be between -10 and 10, got {priority}"));
    }
    Ok(())
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path is required when local_enabled = true".to_string());
        }
        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tmp_shared_dir() -> String {
    "/opt/invenio/var/tmp-shared".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_bin_dir() -> String {
    "/opt/invenio/bin".to_string()
}

fn default_pdg_search_term() -> String {
    "084:pdg".to_string()
}

fn default_pdg_collection() -> String {
    "HEP".to_string()
}

fn default_pdg_output_prefix() -> String {
    "PDG-update_".to_string()
}

fn default_pdg_task_user() -> String {
    "bst_pdg_update_idents".to_string()
}

fn default_priority() -> i32 {
    5
}

fn default_record_file() -> String {
    "recmysql".to_string()
}

fn default_submission_task_user() -> String {
    "websubmit.Insert_Record".to_string()
}

fn default_local_path() -> String {
    "/var/log/bibtasks".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
