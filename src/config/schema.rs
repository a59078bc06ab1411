//! Configuration schema types
//!
//! This module defines the configuration structure for CObs. Every section has
//! defaults, so an empty file is a valid event-log configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Comma-separated source and result files, single-job builds
    File,
    /// Append-only log store with checkpointed, resumable builds
    #[default]
    EventLog,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::EventLog => write!(f, "eventlog"),
        }
    }
}

/// Main CObs configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CobsConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Backend the build reads from and publishes to
    #[serde(default)]
    pub backend: BackendKind,

    /// Flat-file backend settings
    #[serde(default)]
    pub file: FileConfig,

    /// Event-log backend settings
    #[serde(default)]
    pub eventlog: EventLogConfig,

    /// Build queue settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Scenario engine settings
    #[serde(default)]
    pub scenarios: ScenariosConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CobsConfig {
    /// Validates the configuration
    ///
    /// Only the settings of the selected backend are checked.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        match self.backend {
            BackendKind::File => self.file.validate()?,
            BackendKind::EventLog => self.eventlog.validate()?,
        }
        self.scenarios.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (compute the queue, skip all commits)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Flat-file backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    /// Comma-separated source data
    #[serde(default = "default_source_path")]
    pub source_path: String,

    /// Directory receiving `ResultsData.txt` and `Aggregates.txt`
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
}

impl FileConfig {
    fn validate(&self) -> Result<(), String> {
        if self.source_path.trim().is_empty() {
            return Err("file.source_path cannot be empty".to_string());
        }
        if self.results_dir.trim().is_empty() {
            return Err("file.results_dir cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            source_path: default_source_path(),
            results_dir: default_results_dir(),
        }
    }
}

/// Event-log backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogConfig {
    /// Directory of the JSON-lines log store
    #[serde(default = "default_eventlog_directory")]
    pub directory: String,

    /// Stream name prefix; streams are `<stream>-source` and `<stream>-results`
    #[serde(default = "default_stream")]
    pub stream: String,
}

impl EventLogConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("eventlog.directory cannot be empty".to_string());
        }

        let pattern = Regex::new(r"^[A-Za-z0-9_-]+$").map_err(|e| e.to_string())?;
        if !pattern.is_match(&self.stream) {
            return Err(format!(
                "Invalid eventlog.stream '{}'. Use letters, digits, '_' or '-'",
                self.stream
            ));
        }
        Ok(())
    }
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            directory: default_eventlog_directory(),
            stream: default_stream(),
        }
    }
}

/// Build queue configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Cap on jobs per invocation; 0 builds the whole queue
    #[serde(default)]
    pub max_jobs: usize,
}

/// Scenario engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenariosConfig {
    /// Recorded scenario document
    #[serde(default = "default_recorded_path")]
    pub recorded_path: String,
}

impl ScenariosConfig {
    fn validate(&self) -> Result<(), String> {
        if self.recorded_path.trim().is_empty() {
            return Err("scenarios.recorded_path cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for ScenariosConfig {
    fn default() -> Self {
        Self {
            recorded_path: default_recorded_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_source_path() -> String {
    "SourceData.txt".to_string()
}

fn default_results_dir() -> String {
    "CObsResults".to_string()
}

fn default_eventlog_directory() -> String {
    "cobs-log".to_string()
}

fn default_stream() -> String {
    "cobs".to_string()
}

fn default_recorded_path() -> String {
    "scenarios.json".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
