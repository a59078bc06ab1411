//! Storage backends for CObs.
//!
//! This module provides the two backends a build can run against:
//!
//! - [`store`] - the [`SeriesSource`](store::SeriesSource) / [`ResultsSink`](store::ResultsSink)
//!   capability pair and the factory that picks a backend from configuration
//! - [`eventlog`] - append-only log streams with checkpointed, resumable commits
//! - [`flatfile`] - comma-separated source and result files
//!
//! # Design Pattern
//!
//! Adapters isolate storage behind traits so the build orchestrator never knows which
//! backend it is talking to. Tests run the event-log backend over
//! [`MemoryLogStore`](eventlog::MemoryLogStore).
//!
//! # Event Log Streams
//!
//! A stream name `s` owns two streams:
//!
//! - `s-source`: `source-day-received` events closed by `checkpoint` events, plus the
//!   `checkpoint-progress-mark` and `checkpoint-clear` events builds append
//! - `s-results`: `build-event`, `results-day-received`, `aggregates-received` and
//!   `results-ready` events
//!
//! ```rust,no_run
//! use cobs::adapters::eventlog::{append_batch, JsonlLogStore};
//! use cobs::domain::RawDay;
//! use chrono::NaiveDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonlLogStore::open("cobs-log")?;
//! let day = RawDay::new(NaiveDate::from_ymd_opt(2020, 10, 1).unwrap(), 12, 300, 4.5, 0, 3);
//! let checkpoint = append_batch(&store, "cobs", &[day]).await?;
//! println!("Checkpoint: {checkpoint}");
//! # Ok(())
//! # }
//! ```

pub mod eventlog;
pub mod flatfile;
pub mod store;
