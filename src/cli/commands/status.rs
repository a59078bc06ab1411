//! Status command implementation
//!
//! This module implements the `status` command for displaying the latest published
//! build and how much source is still waiting to be built.

use crate::adapters::eventlog::{read_published, EventLogSource};
use crate::adapters::flatfile::{FlatFileSink, AGGREGATES_FILE, RESULTS_FILE};
use crate::adapters::store::{create_log_store, SeriesSource};
use crate::config::load_config;
use crate::config::schema::{BackendKind, CobsConfig};
use crate::domain::CobsError;
use chrono::{DateTime, Utc};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also print the aggregates of the latest published job
    #[arg(long)]
    pub aggregates: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking build status");

        println!("Build Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        let result = match config.backend {
            BackendKind::File => self.file_status(&config).await,
            BackendKind::EventLog => self.eventlog_status(&config).await,
        };

        match result {
            Ok(()) => Ok(0),
            Err(e) => {
                println!("Failed to read status");
                println!("   Error: {}", e);
                Ok(e.exit_code())
            }
        }
    }

    async fn file_status(&self, config: &CobsConfig) -> Result<(), CobsError> {
        let sink = FlatFileSink::new(&config.file.results_dir);
        println!("Backend: file");
        println!("  Results directory: {}", config.file.results_dir);

        for (name, path) in [
            (RESULTS_FILE, sink.results_path()),
            (AGGREGATES_FILE, sink.aggregates_path()),
        ] {
            match tokio::fs::metadata(&path).await {
                Ok(meta) => {
                    let modified = meta
                        .modified()
                        .ok()
                        .map(|t| DateTime::<Utc>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    println!("  {name}: {} bytes, written {modified}", meta.len());
                }
                Err(_) => println!("  {name}: not written yet"),
            }
        }

        if self.aggregates {
            if let Ok(line) = tokio::fs::read_to_string(sink.aggregates_path()).await {
                println!("  Aggregates: {}", line.trim_end());
            }
        }

        println!();
        Ok(())
    }

    async fn eventlog_status(&self, config: &CobsConfig) -> Result<(), CobsError> {
        let store = create_log_store(config)?;
        let stream = &config.eventlog.stream;

        println!("Backend: eventlog");
        println!("  Log directory: {}", config.eventlog.directory);
        println!("  Stream: {stream}");
        println!();

        let published = read_published(store.as_ref(), stream).await?;

        match published.latest_ready() {
            Some(ready) => {
                println!("Latest published build:");
                println!("  Build: {}", ready.build_id);
                println!(
                    "  Timeline: {} ..= {} (rebuilt from {})",
                    ready.min_index, ready.max_index, ready.build_from_index
                );
                println!(
                    "  Checkpoint: {}",
                    ready.checkpoint_id.as_deref().unwrap_or("none")
                );

                if self.aggregates {
                    if let Some(aggregates) =
                        published.job_aggregates(ready.build_id, ready.max_index)
                    {
                        let reff = aggregates.current_r_effective;
                        let dt = aggregates.current_doubling_time;
                        println!(
                            "  R-effective: {} / {} / {}",
                            reff.lower, reff.baseline, reff.upper
                        );
                        println!(
                            "  Doubling time: {} / {} / {}{}",
                            dt.lower,
                            dt.baseline,
                            dt.upper,
                            if aggregates.doubling_time_unstable {
                                " (unstable)"
                            } else {
                                ""
                            }
                        );
                    }
                }
            }
            None => {
                println!("No completed build found.");
                if let Some(index) = published.latest_series_index() {
                    println!("  Partial results published up to index {index}");
                }
            }
        }
        println!("  Builds registered: {}", published.builds.len());
        println!();

        let source = EventLogSource::new(store, stream.as_str());
        match source.read_series().await {
            Ok(series) => {
                let pending = match (series.build_from_index(), series.max_index()) {
                    (Some(from), Some(max)) if from <= max => (max - from + 1) as usize,
                    _ => 0,
                };
                println!("Source:");
                println!("  Checkpointed days: {}", series.days.len());
                println!("  Pending indices: {pending}");
            }
            Err(CobsError::Access(message)) => {
                println!("Source: {message}");
                println!("Run 'cobs ingest <file>' to add source data.");
            }
            Err(e) => return Err(e),
        }

        println!();
        Ok(())
    }
}
