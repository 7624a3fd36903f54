//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the bibtasks configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_OK};
use crate::config::{load_config, SourceBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Shared Tmp Dir: {}", config.platform.tmp_shared_dir);
        println!("  Record Source: {}", config.source.backend);
        match config.source.backend {
            SourceBackend::MarcXml => {
                if let Some(path) = &config.source.marcxml_path {
                    println!("  MARCXML Dump: {path}");
                }
            }
            SourceBackend::Invenio => {
                if let Some(url) = &config.source.base_url {
                    println!("  Invenio URL: {url}");
                }
                println!(
                    "  API Key: {}",
                    if config.source.api_key.is_some() {
                        "set"
                    } else {
                        "not set"
                    }
                );
            }
        }
        println!("  Task Binaries: {}", config.tasks.bin_dir);
        println!("  PDG Search Term: {}", config.pdg.search_term);
        println!("  PDG Collection: {}", config.pdg.collection);
        println!("  Submission Staging Dir: {}", config.staging_dir());
        println!();

        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_reports_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[source]\nbackend = \"marcxml\"\n").unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }

    #[tokio::test]
    async fn test_validate_accepts_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[source]\nbackend = \"marcxml\"\nmarcxml_path = \"/tmp/hep.xml\"\n")
            .unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }
}
