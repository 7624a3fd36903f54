//! Insert record command implementation
//!
//! This module implements the `insert-record` step of the web submission
//! workflow.

use crate::adapters::tasks::CommandSubmitter;
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::core::submission::RecordForwarder;
use crate::domain::BibTaskError;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the insert-record command
#[derive(Args, Debug)]
pub struct InsertRecordArgs {
    /// Submission working directory holding the record file
    pub curdir: PathBuf,

    /// Report number of the submission
    #[arg(short, long)]
    pub report_number: String,

    /// Override the staging directory
    #[arg(long)]
    pub staging_dir: Option<PathBuf>,
}

impl InsertRecordArgs {
    /// Execute the insert-record command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(
            curdir = %self.curdir.display(),
            report_number = %self.report_number,
            "Starting insert-record command"
        );

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let submitter = Arc::new(CommandSubmitter::new(&config.tasks.bin_dir));
        let mut forwarder = RecordForwarder::from_config(&config, submitter);
        if let Some(staging_dir) = &self.staging_dir {
            forwarder = forwarder.with_staging_dir(staging_dir);
        }

        match forwarder
            .insert_record(&self.curdir, &self.report_number)
            .await
        {
            Ok(task_id) => {
                println!("✅ Record submitted for upload: task #{task_id}");
                Ok(EXIT_OK)
            }
            Err(e) => {
                tracing::error!(error = %e, "Insert record failed");
                eprintln!("Insert record failed: {e}");
                let code = match e {
                    BibTaskError::WebSubmit(_) => EXIT_CONFIG,
                    ref other => exit_code_for(other),
                };
                Ok(code)
            }
        }
    }
}
