//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the CObs configuration file.

use crate::config::load_config;
use crate::config::schema::BackendKind;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        // load_config validates, so a loaded config is a valid one
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Backend: {}", config.backend);

        match config.backend {
            BackendKind::File => {
                println!("  Source File: {}", config.file.source_path);
                println!("  Results Directory: {}", config.file.results_dir);
            }
            BackendKind::EventLog => {
                println!("  Log Directory: {}", config.eventlog.directory);
                println!("  Stream: {}", config.eventlog.stream);
            }
        }

        let max_jobs = match config.build.max_jobs {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        };
        println!("  Max Jobs: {max_jobs}");
        println!("  Recorded Scenarios: {}", config.scenarios.recorded_path);
        println!();
        Ok(0)
    }
}
