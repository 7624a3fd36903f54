//! Subscriber setup for the batch tasks
//!
//! Human-readable lines go to the console. With `[logging] local_enabled`
//! each run also appends JSON lines to `<local_path>/bibtasks.log`, rotated
//! per `local_rotation`. `RUST_LOG` overrides the configured level.
//!
//! ```no_run
//! use bibtasks::config::LoggingConfig;
//! use bibtasks::logging::init_logging;
//!
//! let guard = init_logging("debug", &LoggingConfig::default())?;
//! tracing::info!("PDG update starting");
//! drop(guard);
//! # Ok::<(), bibtasks::domain::BibTaskError>(())
//! ```

use crate::config::LoggingConfig;
use crate::domain::{BibTaskError, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Base name of the rotated log files
pub const LOG_FILE_NAME: &str = "bibtasks.log";

/// Flushes the log file writer when dropped
///
/// Hold it until the task exits; `main` drops it before `process::exit`.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber
///
/// `level` is one of trace, debug, info, warn or error. Fails on an unknown
/// level or when the log directory can't be created.
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let level = parse_log_level(level)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bibtasks={level}")));

    let console = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(filter.clone())
        .boxed();

    let (file, file_guard) = if config.local_enabled {
        std::fs::create_dir_all(&config.local_path).map_err(|e| {
            BibTaskError::Configuration(format!(
                "Failed to create log directory {}: {}",
                config.local_path, e
            ))
        })?;

        let appender = RollingFileAppender::new(
            parse_rotation(&config.local_rotation),
            &config.local_path,
            LOG_FILE_NAME,
        );
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .with_filter(filter)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry().with(console).with(file).init();

    tracing::debug!(
        file_enabled = config.local_enabled,
        path = %config.local_path,
        "Logging ready"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    level.parse::<Level>().map_err(|_| {
        BibTaskError::Configuration(format!(
            "Invalid log level '{level}', expected trace, debug, info, warn or error"
        ))
    })
}
