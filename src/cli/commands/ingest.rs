//! Ingest command implementation
//!
//! Validates a comma-separated source file and appends it to the event log's source
//! stream as one checkpointed batch.

use crate::adapters::eventlog::append_batch;
use crate::adapters::flatfile::parse_rows;
use crate::adapters::store::create_log_store;
use crate::config::load_config;
use crate::domain::CobsError;
use clap::Args;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Comma-separated source file (date, cases, tests, positivity, mortality, hospitalizations)
    pub source: String,
}

impl IngestArgs {
    /// Execute the ingest command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(source = %self.source, "Starting ingest command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(e.exit_code());
            }
        };

        let content = match tokio::fs::read_to_string(&self.source).await {
            Ok(content) => content,
            Err(e) => {
                let err = CobsError::Access(format!("{}: {e}", self.source));
                eprintln!("Failed to read source file: {err}");
                return Ok(err.exit_code());
            }
        };

        // Every row must validate before anything is appended.
        let days = match parse_rows(&content) {
            Ok(days) => days,
            Err(e) => {
                tracing::error!(error = %e, "Source file rejected");
                eprintln!("Source file rejected: {e}");
                return Ok(e.exit_code());
            }
        };

        if days.is_empty() {
            println!("Source file has no rows; nothing ingested.");
            return Ok(0);
        }

        let store = match create_log_store(&config) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Failed to open log store: {e}");
                return Ok(e.exit_code());
            }
        };

        let checkpoint = match append_batch(store.as_ref(), &config.eventlog.stream, &days).await
        {
            Ok(checkpoint) => checkpoint,
            Err(e) => {
                tracing::error!(error = %e, "Ingest failed");
                eprintln!("Ingest failed: {e}");
                return Ok(e.exit_code());
            }
        };

        println!("Ingested {} day(s)", days.len());
        println!("  Stream: {}-source", config.eventlog.stream);
        println!("  Checkpoint: {checkpoint}");
        Ok(0)
    }
}
