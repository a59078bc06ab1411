//! Backend factory
//!
//! This module provides factory functions to create the source and sink pair based on
//! configuration.

use crate::adapters::eventlog::{EventLogSink, EventLogSource, JsonlLogStore, LogStore};
use crate::adapters::flatfile::{FlatFileSink, FlatFileSource};
use crate::adapters::store::traits::{ResultsSink, SeriesSource};
use crate::config::schema::{BackendKind, CobsConfig};
use crate::domain::Result;
use std::sync::Arc;

/// The source and sink a build runs against
pub struct Backend {
    pub kind: BackendKind,
    pub source: Arc<dyn SeriesSource + Send + Sync>,
    pub sink: Arc<dyn ResultsSink + Send + Sync>,
}

/// Create the source and sink based on the configuration
///
/// The event-log backend shares one log store between the source reader and the
/// results sink, since commits append to both streams.
///
/// # Errors
///
/// Returns an error if the log store directory cannot be opened
pub async fn create_backend(config: &CobsConfig) -> Result<Backend> {
    match config.backend {
        BackendKind::File => {
            tracing::info!(
                source = %config.file.source_path,
                results_dir = %config.file.results_dir,
                "Creating flat-file backend"
            );

            Ok(Backend {
                kind: BackendKind::File,
                source: Arc::new(FlatFileSource::new(&config.file.source_path)),
                sink: Arc::new(FlatFileSink::new(&config.file.results_dir)),
            })
        }
        BackendKind::EventLog => {
            let store = create_log_store(config)?;

            tracing::info!(
                directory = %config.eventlog.directory,
                stream = %config.eventlog.stream,
                "Creating event-log backend"
            );

            Ok(Backend {
                kind: BackendKind::EventLog,
                source: Arc::new(EventLogSource::new(store.clone(), &config.eventlog.stream)),
                sink: Arc::new(EventLogSink::new(store, &config.eventlog.stream)),
            })
        }
    }
}

/// Open the configured JSON-lines log store
///
/// # Errors
///
/// Returns an `Access` error if the directory cannot be created
pub fn create_log_store(config: &CobsConfig) -> Result<Arc<dyn LogStore>> {
    let store = JsonlLogStore::open(&config.eventlog.directory)?;
    Ok(Arc::new(store))
}
