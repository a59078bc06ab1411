//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - human-readable console output
//! - optional JSON file logs with daily or hourly rotation
//! - log level from configuration, overridable with `RUST_LOG`
//!
//! # Example
//!
//! ```no_run
//! use cobs::logging::init_logging;
//! use cobs::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(jobs = 3, "Build queued");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a build phase transition
///
/// # Example
///
/// ```no_run
/// use cobs::log_build_phase;
/// use cobs::core::build::BuildPhase;
///
/// log_build_phase!(BuildPhase::ScenarioRunning, 42);
/// ```
#[macro_export]
macro_rules! log_build_phase {
    ($phase:expr, $index:expr) => {
        tracing::debug!(
            phase = %$phase,
            timeline_index = $index,
            "Build phase"
        );
    };
}

/// Log a committed build job
///
/// # Example
///
/// ```no_run
/// use cobs::log_job_committed;
///
/// log_job_committed!(42, 3, 10);
/// ```
#[macro_export]
macro_rules! log_job_committed {
    ($index:expr, $committed:expr, $planned:expr) => {
        tracing::info!(
            timeline_index = $index,
            committed = $committed,
            planned = $planned,
            progress_pct = ($committed as f64 / $planned as f64 * 100.0),
            "Build job committed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cobs::log_error_with_context;
/// use cobs::domain::CobsError;
///
/// let error = CobsError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
