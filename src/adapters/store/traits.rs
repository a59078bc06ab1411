//! Read and commit capability traits
//!
//! A build reads from one [`SeriesSource`] and publishes through one [`ResultsSink`].
//! Both the flat-file and the event-log backends implement the pair.

use crate::core::build::BuildJob;
use crate::core::source::SourceSeries;
use crate::domain::{BuildId, CheckpointId, Result};
use async_trait::async_trait;

/// Source of the observed day series
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Reads, validates and reconciles the source
    ///
    /// # Errors
    ///
    /// Returns `RowValidation`, `Decode`, `Contiguity` or `Access` errors; the first
    /// failure ends the read.
    async fn read_series(&self) -> Result<SourceSeries>;
}

/// Read-side facts a commit records alongside the results
#[derive(Debug, Clone, PartialEq)]
pub struct CommitContext {
    /// Newest checkpoint in the source at read time
    pub checkpoint: Option<CheckpointId>,
    /// Source position the build read up to
    pub read_position: Option<u64>,
    pub build_from_index: i32,
    pub max_index: i32,
    /// Whether the queue reaches the newest checkpointed day
    pub drained: bool,
}

/// Destination for build results
#[async_trait]
pub trait ResultsSink: Send + Sync {
    /// Whether committed jobs survive a crash individually
    ///
    /// Resumable sinks get one job per pending index; others get a single job for
    /// the newest index.
    fn supports_resume(&self) -> bool;

    /// Establishes this build's expected append position
    async fn register_build(&self, build_id: BuildId) -> Result<()>;

    /// Whether another build has appended since this build's last append
    async fn is_superseded(&self) -> Result<bool>;

    /// Commits one job
    ///
    /// `is_last` marks the final job of the build, after which the sink publishes its
    /// completion records.
    ///
    /// # Errors
    ///
    /// Returns `CommitConflict` if the expected-position precondition fails.
    async fn commit_job(&self, job: &BuildJob, context: &CommitContext, is_last: bool)
        -> Result<()>;
}
