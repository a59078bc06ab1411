//! Build command implementation
//!
//! This module implements the `build` command: read the configured source, run
//! every pending job and publish the results.

use crate::adapters::store::create_backend;
use crate::config::load_config;
use crate::core::build::{BuildOptions, BuildOrchestrator, BuildOutcome};
use crate::core::scenario::RecordedScenarioEngine;
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Dry run mode - compute every job without registering or committing
    #[arg(long)]
    pub dry_run: bool,

    /// Override the cap on jobs built in this invocation (0 builds the whole queue)
    #[arg(long)]
    pub max_jobs: Option<usize>,
}

impl BuildArgs {
    /// Execute the build command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting build command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(e.exit_code());
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if let Some(max_jobs) = self.max_jobs {
            tracing::info!(max_jobs, "Overriding job cap from CLI");
            config.build.max_jobs = max_jobs;
        }

        let recorded = RecordedScenarioEngine::from_path(&config.scenarios.recorded_path).await;
        let engine = match recorded {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!(
                    path = %config.scenarios.recorded_path,
                    error = %e,
                    "Failed to load recorded scenarios"
                );
                eprintln!("Failed to load scenarios: {e}");
                return Ok(e.exit_code());
            }
        };

        let backend = match create_backend(&config).await {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open backend");
                eprintln!("Failed to open {} backend: {e}", config.backend);
                return Ok(e.exit_code());
            }
        };

        if config.application.dry_run {
            println!("DRY RUN MODE - no results will be published");
            println!();
        }

        let options = BuildOptions {
            dry_run: config.application.dry_run,
            max_jobs: config.build.max_jobs,
        };

        let mut orchestrator =
            BuildOrchestrator::new(backend.source, backend.sink, Arc::new(engine), options)
                .with_shutdown_signal(shutdown_signal);

        let summary = match orchestrator.execute().await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Build failed: {e}");
                return Ok(e.exit_code());
            }
        };

        println!("Build Summary:");
        println!("  Backend: {}", config.backend);
        println!("  Outcome: {}", summary.outcome.as_str());
        println!("  Source days: {}", summary.source_days);
        println!("  Jobs planned: {}", summary.jobs_planned);
        println!("  Jobs committed: {}", summary.jobs_committed);
        if summary.max_index >= 0 {
            println!(
                "  Timeline: {} ..= {}",
                summary.build_from_index, summary.max_index
            );
        }
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        println!();

        let exit_code = match summary.outcome {
            BuildOutcome::Interrupted => {
                println!("Build interrupted gracefully. Committed jobs are kept.");
                println!("Run the same command to resume.");
                130
            }
            BuildOutcome::UpToDate => {
                println!("Results are already up to date.");
                0
            }
            BuildOutcome::DryRun => {
                println!("Dry run complete: {} job(s) computed.", summary.jobs_built);
                0
            }
            BuildOutcome::Completed => {
                if summary.jobs_remaining() > 0 || !summary.drained {
                    println!("Build completed; more source remains for the next run.");
                } else {
                    println!("Build completed successfully!");
                }
                0
            }
        };

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_defaults() {
        let args = BuildArgs {
            dry_run: false,
            max_jobs: None,
        };

        assert!(!args.dry_run);
        assert!(args.max_jobs.is_none());
    }

    #[tokio::test]
    async fn test_missing_config_is_configuration_exit_code() {
        let args = BuildArgs {
            dry_run: true,
            max_jobs: None,
        };
        let (_tx, rx) = watch::channel(false);
        let code = args
            .execute("/nonexistent/cobs.toml", rx)
            .await
            .unwrap();
        assert_eq!(code, 2);
    }
}
