//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - console output with a configurable level
//! - optional JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use bibtasks::logging::init_logging;
//! use bibtasks::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Task started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the banner of a job phase
///
/// # Example
///
/// ```no_run
/// use bibtasks::log_phase;
///
/// log_phase!("Input parsing");
/// ```
#[macro_export]
macro_rules! log_phase {
    ($phase:expr) => {
        tracing::info!(phase = $phase, "=== {} ===", $phase);
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use bibtasks::log_error_with_context;
/// use bibtasks::domain::BibTaskError;
///
/// let error = BibTaskError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

#[cfg(test)]
mod tests {
    use crate::domain::BibTaskError;

    #[test]
    fn test_macros_expand() {
        log_phase!("Matching");
        let error = BibTaskError::Input("bad".to_string());
        log_error_with_context!(&error, "parsing");
    }
}
