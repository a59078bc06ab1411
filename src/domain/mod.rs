//! Domain models and types for CObs.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`BuildId`], [`CheckpointId`], [`ScenarioId`])
//! - **Observed day models** ([`RawDay`], [`RollingDay`])
//! - **Published result models** ([`ResultsDay`], [`Aggregates`], [`Bounds`])
//! - **Error types** ([`CobsError`], [`RowViolation`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CobsError>`]:
//!
//! ```rust
//! use cobs::domain::{CobsError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = cobs::config::load_config("cobs.toml")?;
//!     Ok(())
//! }
//! ```

pub mod day;
pub mod errors;
pub mod ids;
pub mod result;
pub mod results;

// Re-export commonly used types for convenience
pub use day::{RawDay, RollingDay, WindowAverages};
pub use errors::{CobsError, RowViolation};
pub use ids::{BuildId, CheckpointId, ScenarioId};
pub use result::Result;
pub use results::{Aggregates, Bounds, ObservedInputs, ProjectedMetrics, Provenance, ResultsDay};
