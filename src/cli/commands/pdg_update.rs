//! PDG update command implementation
//!
//! This module implements the `pdg-update` command, which reconciles record
//! PDG identifiers with a JSON snapshot and writes the change-sets.

use crate::adapters::source::create_record_source;
use crate::adapters::tasks::{CommandSubmitter, TaskSubmitter};
use crate::cli::{exit_code_for, EXIT_CONFIG, EXIT_OK, EXIT_PARTIAL};
use crate::config::load_config;
use crate::core::pdg::{ChangeKind, PdgSyncJob, PdgSyncOptions};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the pdg-update command
#[derive(Args, Debug)]
pub struct PdgUpdateArgs {
    /// JSON snapshot of PDG identifiers
    pub input_file: PathBuf,

    /// Log the intended changes without writing change-set files
    #[arg(long)]
    pub dry_run: bool,

    /// Output directory (defaults to platform.tmp_shared_dir)
    #[arg(short, long)]
    pub outdir: Option<PathBuf>,

    /// Queue the written change-sets for upload
    #[arg(long)]
    pub submit: bool,
}

impl PdgUpdateArgs {
    /// Execute the pdg-update command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(input = %self.input_file.display(), "Starting pdg-update command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let mut options = PdgSyncOptions::from_config(&config, &self.input_file);
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            options = options.with_dry_run(true);
        }
        if let Some(outdir) = &self.outdir {
            options = options.with_output_dir(outdir);
        }

        if options.dry_run {
            println!("🔍 DRY RUN MODE - change-sets will not be written");
            println!();
        }

        let source = match create_record_source(&config.source).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create record source");
                eprintln!("Failed to open record source: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let submitter = self.submit.then(|| {
            Arc::new(CommandSubmitter::new(&config.tasks.bin_dir)) as Arc<dyn TaskSubmitter>
        });

        let job = PdgSyncJob::new(source, submitter, options);
        let summary = match job.run().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "PDG update failed");
                eprintln!("PDG update failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        summary.log_summary();

        println!();
        println!("📊 PDG Update Summary:");
        println!("  Records with PDG data: {}", summary.search_hits);
        println!("  Bad records: {}", summary.bad_records);
        println!(
            "  Input elements: {} (valid {}, missing {}, invalid {})",
            summary.input_elements,
            summary.valid_elements,
            summary.missing_elements,
            summary.invalid_elements
        );
        for kind in ChangeKind::ALL {
            let path = summary
                .change_set_path(kind)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "-".to_string());
            println!("  {}: {} records ({})", kind, summary.changes_for(kind), path);
        }
        for submitted in &summary.submitted {
            println!("  Submitted {}: task #{}", submitted.kind, submitted.task_id);
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        let exit_code = if summary.is_successful() {
            println!("✅ PDG update completed successfully!");
            EXIT_OK
        } else {
            println!("⚠️  PDG update completed with failed submissions");
            for failure in &summary.failed_submissions {
                println!("  - {} ({}): {}", failure.kind, failure.path.display(), failure.message);
            }
            EXIT_PARTIAL
        };

        Ok(exit_code)
    }
}
