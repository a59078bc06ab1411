//! Source read models

use crate::domain::{CheckpointId, RawDay};
use chrono::NaiveDate;

/// One decoded entry of the source log, in stream order
///
/// Days are already validated but not yet indexed.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEntry {
    /// A validated source day
    Day(RawDay),
    /// Closes the batch of days seen since the previous checkpoint
    Checkpoint(CheckpointId),
    /// A committed prefix of a checkpoint's batch, up to a timeline index
    ProgressMark {
        checkpoint: CheckpointId,
        handled_index: i32,
    },
    /// A checkpoint whose batch, and every earlier batch, is fully committed
    Clear(CheckpointId),
}

/// Days delimited by one checkpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBatch {
    pub checkpoint: CheckpointId,
    pub days: Vec<RawDay>,
}

/// Batches split by how far earlier builds got through them
///
/// `marked` batches count as handled only up to `handled_index`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchPartition {
    pub handled: Vec<SourceBatch>,
    pub marked: Vec<SourceBatch>,
    pub unhandled: Vec<SourceBatch>,
    pub handled_index: Option<i32>,
}

/// A reconciled source series, ready to build
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSeries {
    /// Merged, contiguous and seeded days in timeline order
    pub days: Vec<RawDay>,
    /// Newest checkpoint in the source, if any
    pub last_checkpoint: Option<CheckpointId>,
    /// First date whose results must be (re)published; `None` for an empty series
    pub build_from: Option<NaiveDate>,
    /// Position of the last event read, for event-log sources
    pub read_position: Option<u64>,
}

impl SourceSeries {
    /// Timeline index of `build_from`
    ///
    /// A `build_from` past the last day maps to one past the maximum index.
    pub fn build_from_index(&self) -> Option<i32> {
        let build_from = self.build_from?;
        let first = self.days.first()?.date;
        Some((build_from - first).num_days() as i32)
    }

    /// Highest timeline index, or `None` for an empty series
    pub fn max_index(&self) -> Option<i32> {
        self.days.last().and_then(|day| day.timeline_index)
    }
}
