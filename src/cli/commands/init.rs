//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "bibtasks.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing bibtasks configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set source.backend to 'marcxml' or 'invenio'");
                println!("  3. Put BIBTASKS_SOURCE_API_KEY in a .env file if the endpoint needs one");
                println!("  4. Validate configuration: bibtasks validate-config");
                println!("  5. Try a run: bibtasks pdg-update <snapshot.json> --dry-run");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# bibtasks Configuration File

[application]
log_level = "info"
dry_run = false

[platform]
tmp_shared_dir = "/opt/invenio/var/tmp-shared"

[source]
backend = "invenio"  # marcxml | invenio
base_url = "https://inspirehep.net"
api_key = "${BIBTASKS_API_KEY}"

[tasks]
bin_dir = "/opt/invenio/bin"

[pdg]
search_term = "084:pdg"
collection = "HEP"

[logging]
local_enabled = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# bibtasks Configuration File
# Maintenance tasks for an Invenio/INSPIRE digital library
#
# Values may reference environment variables as ${VAR}. Any key can also be
# overridden with BIBTASKS_<SECTION>_<KEY>, e.g. BIBTASKS_PDG_COLLECTION.

# ============================================================================
# Application Configuration
# ============================================================================
[application]
# Log level: trace | debug | info | warn | error
log_level = "info"

# Dry run: write reports but no change-set files
dry_run = false

# ============================================================================
# Platform Configuration
# ============================================================================
[platform]
# Shared temporary directory; default output and staging location
tmp_shared_dir = "/opt/invenio/var/tmp-shared"

# ============================================================================
# Record Source Configuration
# ============================================================================
[source]
# Backend: marcxml (local dump) | invenio (HTTP search and export)
backend = "invenio"

# MARCXML collection dump (marcxml backend)
# marcxml_path = "/opt/invenio/var/data/hep-dump.xml"

# Invenio instance (invenio backend)
base_url = "https://inspirehep.net"

# Bearer token sent with every request (optional)
api_key = "${BIBTASKS_API_KEY}"

# Request timeout in seconds (1-600)
timeout_seconds = 60

# Verify TLS certificates
tls_verify = true

# ============================================================================
# Task Queue Configuration
# ============================================================================
[tasks]
# Directory holding bibupload and the other task binaries
bin_dir = "/opt/invenio/bin"

# ============================================================================
# PDG Sync Configuration
# ============================================================================
[pdg]
# Search selecting records that currently carry PDG data
search_term = "084:pdg"

# Collection the snapshot's inspireIds must belong to
collection = "HEP"

# Prefix of every output file name
output_prefix = "PDG-update_"

# Upload priority of submitted change-sets (-10 to 10)
upload_priority = 5

# User the uploads are submitted as
task_user = "bst_pdg_update_idents"

# ============================================================================
# Web Submission Configuration
# ============================================================================
[submission]
# Record file produced by the submission in its working directory
record_file = "recmysql"

# Staging directory (defaults to platform.tmp_shared_dir)
# staging_dir = "/opt/invenio/var/tmp-shared"

# User and priority of the insert-or-replace upload
task_user = "websubmit.Insert_Record"
priority = 5

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log directory
local_path = "/var/log/bibtasks"

# Log rotation: daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BibTasksConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "bibtasks.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "bibtasks.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_parse() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config: BibTasksConfig = toml::from_str(&content).unwrap();
            assert_eq!(config.pdg.collection, "HEP");
            assert_eq!(config.tasks.bin_dir, "/opt/invenio/bin");
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("bibtasks.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_init_writes_config() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("bibtasks.toml");

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            with_examples: true,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_OK);
        assert!(fs::read_to_string(&output)
            .unwrap()
            .contains("[submission]"));
    }
}
