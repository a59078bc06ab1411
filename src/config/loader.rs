//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BackendKind, CobsConfig};
use crate::domain::errors::CobsError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CobsConfig
/// 4. Applies environment variable overrides (COBS_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns a `Configuration` error if the file is missing or unreadable, a referenced
/// environment variable is unset, the TOML is malformed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use cobs::config::loader::load_config;
///
/// let config = load_config("cobs.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CobsConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CobsError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CobsError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text with the same substitution, override and validation
/// steps as [`load_config`]
pub fn parse_config(contents: &str) -> Result<CobsConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: CobsConfig = toml::from_str(&contents)
        .map_err(|e| CobsError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        CobsError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied unchanged.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CobsError::Configuration(e.to_string()))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CobsError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using COBS_* prefix
///
/// Environment variables follow the pattern: COBS_<SECTION>_<KEY>
/// For example: COBS_EVENTLOG_STREAM, COBS_BUILD_MAX_JOBS
fn apply_env_overrides(config: &mut CobsConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("COBS_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("COBS_APPLICATION_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    if let Ok(val) = std::env::var("COBS_BACKEND") {
        config.backend = match val.to_lowercase().as_str() {
            "file" => BackendKind::File,
            "eventlog" => BackendKind::EventLog,
            other => {
                return Err(CobsError::Configuration(format!(
                    "Invalid COBS_BACKEND '{}'. Must be one of: file, eventlog",
                    other
                )))
            }
        };
    }

    // File overrides
    if let Ok(val) = std::env::var("COBS_FILE_SOURCE_PATH") {
        config.file.source_path = val;
    }
    if let Ok(val) = std::env::var("COBS_FILE_RESULTS_DIR") {
        config.file.results_dir = val;
    }

    // Event log overrides
    if let Ok(val) = std::env::var("COBS_EVENTLOG_DIRECTORY") {
        config.eventlog.directory = val;
    }
    if let Ok(val) = std::env::var("COBS_EVENTLOG_STREAM") {
        config.eventlog.stream = val;
    }

    // Build overrides
    if let Ok(val) = std::env::var("COBS_BUILD_MAX_JOBS") {
        if let Ok(max_jobs) = val.parse() {
            config.build.max_jobs = max_jobs;
        }
    }

    if let Ok(val) = std::env::var("COBS_SCENARIOS_RECORDED_PATH") {
        config.scenarios.recorded_path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("COBS_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("COBS_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("COBS_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
