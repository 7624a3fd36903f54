//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BibTasksConfig, SourceBackend};
use super::secret_string;
use crate::domain::errors::BibTaskError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BibTasksConfig
/// 4. Applies environment variable overrides (BIBTASKS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsing fails, a referenced
/// environment variable is unset, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use bibtasks::config::loader::load_config;
///
/// let config = load_config("bibtasks.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BibTasksConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(BibTaskError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        BibTaskError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: BibTasksConfig = toml::from_str(&contents)
        .map_err(|e| BibTaskError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        BibTaskError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left as they are.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&cap[0], &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(BibTaskError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using BIBTASKS_* prefix
///
/// Environment variables follow the pattern: BIBTASKS_<SECTION>_<KEY>,
/// for example BIBTASKS_SOURCE_BASE_URL or BIBTASKS_PDG_SEARCH_TERM.
fn apply_env_overrides(config: &mut BibTasksConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("BIBTASKS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("BIBTASKS_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Platform overrides
    if let Ok(val) = std::env::var("BIBTASKS_PLATFORM_TMP_SHARED_DIR") {
        config.platform.tmp_shared_dir = val;
    }

    // Source overrides
    if let Ok(val) = std::env::var("BIBTASKS_SOURCE_BACKEND") {
        config.source.backend = match val.to_lowercase().as_str() {
            "marcxml" => SourceBackend::MarcXml,
            "invenio" => SourceBackend::Invenio,
            other => {
                return Err(BibTaskError::Configuration(format!(
                    "Invalid BIBTASKS_SOURCE_BACKEND '{other}'. Must be one of: marcxml, invenio"
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("BIBTASKS_SOURCE_MARCXML_PATH") {
        config.source.marcxml_path = Some(val);
    }
    if let Ok(val) = std::env::var("BIBTASKS_SOURCE_BASE_URL") {
        config.source.base_url = Some(val);
    }
    if let Ok(val) = std::env::var("BIBTASKS_SOURCE_API_KEY") {
        config.source.api_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("BIBTASKS_SOURCE_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.source.timeout_seconds = timeout;
        }
    }

    // Task overrides
    if let Ok(val) = std::env::var("BIBTASKS_TASKS_BIN_DIR") {
        config.tasks.bin_dir = val;
    }

    // PDG overrides
    if let Ok(val) = std::env::var("BIBTASKS_PDG_SEARCH_TERM") {
        config.pdg.search_term = val;
    }
    if let Ok(val) = std::env::var("BIBTASKS_PDG_COLLECTION") {
        config.pdg.collection = val;
    }

    // Submission overrides
    if let Ok(val) = std::env::var("BIBTASKS_SUBMISSION_STAGING_DIR") {
        config.submission.staging_dir = Some(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("BIBTASKS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("BIBTASKS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("BIBTASKS_LOADER_TEST_VAR", "test_value");
        let input = "api_key = \"${BIBTASKS_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "api_key = \"test_value\"");
        std::env::remove_var("BIBTASKS_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("BIBTASKS_LOADER_MISSING_VAR");
        let input = "api_key = \"${BIBTASKS_LOADER_MISSING_VAR}\"";
        let result = substitute_env_vars(input);
        assert!(result.is_err());
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        let input = "# api_key = \"${BIBTASKS_LOADER_UNSET_IN_COMMENT}\"";
        assert_eq!(substitute_env_vars(input).unwrap(), input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[source]
backend = "marcxml"
marcxml_path = "/data/hep.xml"

[pdg]
collection = "HEP"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.source.backend, SourceBackend::MarcXml);
        assert_eq!(config.pdg.search_term, "084:pdg");
        assert_eq!(config.submission.record_file, "recmysql");
    }

    #[test]
    fn test_load_config_invalid_backend_config() {
        let toml_content = r#"
[source]
backend = "invenio"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("source.base_url"));
    }
}
