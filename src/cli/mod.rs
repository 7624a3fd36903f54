//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for bibtasks using clap.

pub mod commands;

use crate::domain::BibTaskError;
use clap::{Parser, Subcommand};

/// Exit code: success
pub const EXIT_OK: i32 = 0;
/// Exit code: run completed but some submissions failed
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code: configuration or input file error
pub const EXIT_CONFIG: i32 = 2;
/// Exit code: record source or task queue unreachable
pub const EXIT_UNREACHABLE: i32 = 4;
/// Exit code: any other fatal error
pub const EXIT_FATAL: i32 = 5;

/// Exit code reported for a failed command
pub fn exit_code_for(error: &BibTaskError) -> i32 {
    match error {
        BibTaskError::Configuration(_) | BibTaskError::Input(_) => EXIT_CONFIG,
        e if e.is_unreachable() => EXIT_UNREACHABLE,
        _ => EXIT_FATAL,
    }
}

/// bibtasks - INSPIRE/Invenio maintenance tasks
#[derive(Parser, Debug)]
#[command(name = "bibtasks")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bibtasks.toml", env = "BIBTASKS_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "BIBTASKS_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synchronize record PDG identifiers with a PDG snapshot
    PdgUpdate(commands::pdg_update::PdgUpdateArgs),

    /// Stage a submitted record and queue its upload
    InsertRecord(commands::insert_record::InsertRecordArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
