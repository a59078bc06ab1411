//! Checkpointed source reading
//!
//! Turns a decoded source log into a contiguous, seeded series plus the first date
//! whose results must be published again.

pub mod model;
pub mod reconcile;

pub use model::{BatchPartition, SourceBatch, SourceEntry, SourceSeries};
pub use reconcile::{partition_batches, reconcile};
