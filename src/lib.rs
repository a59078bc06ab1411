// CObs - Checkpointed outbreak metrics builder
// Copyright (c) 2025 CObs Contributors
// Licensed under the MIT License

//! # CObs - checkpointed outbreak metrics builder
//!
//! CObs turns a daily series of observed outbreak data (cases, tests, positivity,
//! mortality, hospitalizations) into derived metrics such as R-effective and doubling
//! time, with lower, baseline and upper bounds taken across a set of transmission
//! scenarios.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Validating** source rows and proving the series is day-contiguous
//! - **Rolling** short (±2 day) and long (±50 day) window averages
//! - **Extracting** per-day and aggregate bounds from scenario runs
//! - **Building** one job per pending timeline index, resumable after a crash
//! - **Publishing** results to an append-only event log or to flat files
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (timeline, scenarios, bounds, source reconciliation, builds)
//! - [`adapters`] - Storage backends (event log, flat file)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cobs::adapters::eventlog::{append_batch, EventLogSink, EventLogSource, MemoryLogStore};
//! use cobs::core::build::{BuildOptions, BuildOrchestrator};
//! use cobs::core::scenario::RecordedScenarioEngine;
//! use std::sync::Arc;
//!
//! # async fn example(days: Vec<cobs::domain::RawDay>, scenarios: &str)
//! #     -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryLogStore::new());
//! append_batch(store.as_ref(), "county", &days).await?;
//!
//! let mut orchestrator = BuildOrchestrator::new(
//!     Arc::new(EventLogSource::new(store.clone(), "county")),
//!     Arc::new(EventLogSink::new(store, "county")),
//!     Arc::new(RecordedScenarioEngine::from_json(scenarios)?),
//!     BuildOptions::default(),
//! );
//!
//! let summary = orchestrator.execute().await?;
//! println!("Committed {} job(s)", summary.jobs_committed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Checkpoints and Resumption
//!
//! Ingested days arrive in batches closed by a checkpoint. A build publishes results
//! for every index from the earliest changed day onwards, one job per index. After
//! each job it appends a progress mark to the source stream, and after a build that
//! consumed everything it clears the newest checkpoint. A crashed or interrupted build
//! therefore resumes from the first index that was not yet committed.
//!
//! ## Error Handling
//!
//! CObs uses the [`domain::CobsError`] type for all errors:
//!
//! ```rust,no_run
//! use cobs::domain::CobsError;
//!
//! fn example() -> Result<(), CobsError> {
//!     let config = cobs::config::load_config("cobs.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! CObs uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!(timeline_index = 42, "Job committed");
//! warn!(remaining = 3, "Build stopped early");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
