//! Configuration management for CObs.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! CObs uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `COBS_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation of the selected backend
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cobs::config::{load_config, BackendKind};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cobs.toml")?;
//!
//! if config.backend == BackendKind::EventLog {
//!     println!("Log store: {}", config.eventlog.directory);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry run
//! - [`BackendKind`] - `file` or `eventlog`
//! - [`FileConfig`] - flat-file source and results directory
//! - [`EventLogConfig`] - log store directory and stream name
//! - [`BuildConfig`] - job cap per invocation
//! - [`ScenariosConfig`] - recorded scenario document
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! `backend` is a top-level key and must come before the first table.
//!
//! ```toml
//! backend = "eventlog"
//!
//! [application]
//! log_level = "info"
//!
//! [eventlog]
//! directory = "${COBS_DATA_DIR}/log"
//! stream = "county-42"
//!
//! [build]
//! max_jobs = 0
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, BackendKind, BuildConfig, CobsConfig, EventLogConfig, FileConfig,
    LoggingConfig, ScenariosConfig,
};
