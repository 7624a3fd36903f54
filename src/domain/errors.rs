//! Domain error types
//!
//! This module defines the error hierarchy for bibtasks.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main bibtasks error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum BibTaskError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The job input (PDG snapshot) could not be read or decoded
    #[error("Input error: {0}")]
    Input(String),

    /// Record source (search / record store) errors
    #[error("Record source error: {0}")]
    RecordSource(#[from] RecordSourceError),

    /// Task submission errors
    #[error("Task submission error: {0}")]
    Submission(#[from] SubmissionError),

    /// Web submission workflow errors
    #[error("Submission workflow error: {0}")]
    WebSubmit(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Record source errors
///
/// Errors that occur when searching or fetching records from the platform.
/// These errors don't expose third-party HTTP client or XML parser types.
#[derive(Debug, Error)]
pub enum RecordSourceError {
    /// Failed to reach the record source
    #[error("Failed to connect to record source: {0}")]
    ConnectionFailed(String),

    /// Search request failed
    #[error("Search failed: {0}")]
    SearchFailed(String),

    /// Unsupported search query
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    /// Record could not be fetched
    #[error("Failed to fetch record {recid}: {message}")]
    FetchFailed { recid: u64, message: String },

    /// Invalid response from server
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Malformed MARCXML
    #[error("Invalid MARCXML: {0}")]
    InvalidMarcXml(String),
}

/// Task submission errors
///
/// Errors that occur when handing work to the platform task queue.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// Task binary could not be started
    #[error("Failed to launch task {task}: {message}")]
    LaunchFailed { task: String, message: String },

    /// Task binary exited with a failure status
    #[error("Task {task} exited with status {status}: {stderr}")]
    NonZeroExit {
        task: String,
        status: i32,
        stderr: String,
    },

    /// No task id could be found in the submitter output
    #[error("No task id in output of {task}: {output}")]
    MissingTaskId { task: String, output: String },
}

impl BibTaskError {
    /// True when a collaborator (record source or task queue) could not be reached
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            BibTaskError::RecordSource(RecordSourceError::ConnectionFailed(_))
                | BibTaskError::RecordSource(RecordSourceError::ServerError { .. })
                | BibTaskError::Submission(SubmissionError::LaunchFailed { .. })
        )
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for BibTaskError {
    fn from(err: std::io::Error) -> Self {
        BibTaskError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BibTaskError {
    fn from(err: serde_json::Error) -> Self {
        BibTaskError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BibTaskError {
    fn from(err: toml::de::Error) -> Self {
        BibTaskError::Configuration(format!("TOML parse error: {err}"))
    }
}
