//! Core business logic for CObs.
//!
//! # Modules
//!
//! - [`timeline`] - Day validation, timeline seeding and rolling windows
//! - [`scenario`] - Scenario engine contract and the recorded-output engine
//! - [`bounds`] - Lower, baseline and upper extraction across scenarios
//! - [`source`] - Checkpointed source reconciliation
//! - [`build`] - Build queue orchestration
//!
//! # Build Workflow
//!
//! 1. **Read**: Replay the source, validate every day, reconcile checkpoint batches
//! 2. **Gate**: Require more days than the engine's largest minimum lag
//! 3. **Plan**: Queue one job per index from the build-from point
//! 4. **Compute**: Rolling windows, scenario runs, bound extraction per job
//! 5. **Commit**: Append each job's results, then mark or clear the checkpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use cobs::adapters::store::create_backend;
//! use cobs::config::load_config;
//! use cobs::core::build::{BuildOptions, BuildOrchestrator};
//! use cobs::core::scenario::RecordedScenarioEngine;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("cobs.toml")?;
//! let backend = create_backend(&config).await?;
//! let engine = Arc::new(RecordedScenarioEngine::from_path(&config.scenarios.recorded_path).await?);
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let mut orchestrator = BuildOrchestrator::new(
//!     backend.source,
//!     backend.sink,
//!     engine,
//!     BuildOptions::default(),
//! )
//! .with_shutdown_signal(shutdown_rx);
//!
//! let summary = orchestrator.execute().await?;
//! println!("Committed: {}", summary.jobs_committed);
//! # Ok(())
//! # }
//! ```

pub mod bounds;
pub mod build;
pub mod scenario;
pub mod source;
pub mod timeline;
