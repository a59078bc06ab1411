//! Event types and payloads
//!
//! Source stream: `source-day-received`, `checkpoint`, `checkpoint-progress-mark`,
//! `checkpoint-clear`. Results stream: `build-event`, `results-day-received`,
//! `aggregates-received`, `results-ready`.

use crate::core::timeline::UncheckedDay;
use crate::domain::{Aggregates, BuildId, RawDay, ResultsDay};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const SOURCE_DAY_RECEIVED: &str = "source-day-received";
pub const CHECKPOINT: &str = "checkpoint";
pub const CHECKPOINT_PROGRESS_MARK: &str = "checkpoint-progress-mark";
pub const CHECKPOINT_CLEAR: &str = "checkpoint-clear";
pub const BUILD_EVENT: &str = "build-event";
pub const RESULTS_DAY_RECEIVED: &str = "results-day-received";
pub const AGGREGATES_RECEIVED: &str = "aggregates-received";
pub const RESULTS_READY: &str = "results-ready";

/// Name of the source stream for a base stream name
pub fn source_stream(stream: &str) -> String {
    format!("{stream}-source")
}

/// Name of the results stream for a base stream name
pub fn results_stream(stream: &str) -> String {
    format!("{stream}-results")
}

/// One observed day as ingested
///
/// Fields are signed so that negative values reach validation and are reported as
/// such rather than as decode failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDayPayload {
    pub date: String,
    pub daily_new_cases: i64,
    pub tests: i64,
    pub positivity: f64,
    pub mortality: i64,
    pub hospitalizations: i64,
}

impl SourceDayPayload {
    pub fn as_unchecked(&self) -> UncheckedDay<'_> {
        UncheckedDay {
            date: &self.date,
            daily_new_cases: self.daily_new_cases,
            tests: self.tests,
            positivity: self.positivity,
            mortality: self.mortality,
            hospitalizations: self.hospitalizations,
        }
    }
}

impl From<&RawDay> for SourceDayPayload {
    fn from(day: &RawDay) -> Self {
        Self {
            date: day.date.format("%Y-%m-%d").to_string(),
            daily_new_cases: day.daily_new_cases.into(),
            tests: day.tests.into(),
            positivity: day.positivity,
            mortality: day.mortality.into(),
            hospitalizations: day.hospitalizations.into(),
        }
    }
}

/// Closes a batch; the checkpoint id is the event's own id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPayload {
    #[serde(default)]
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointProgressMarkPayload {
    pub checkpoint_id: String,
    pub handled_index_cutoff: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointClearPayload {
    pub checkpoint_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildEventPayload {
    pub build_id: BuildId,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsDayPayload {
    pub build_id: BuildId,
    pub series_index: i32,
    pub series_day: NaiveDate,
    #[serde(flatten)]
    pub day: ResultsDay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatesPayload {
    pub build_id: BuildId,
    pub series_index: i32,
    pub series_day: NaiveDate,
    pub aggregates: Aggregates,
}

/// Completion record of a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsReadyPayload {
    pub build_id: BuildId,
    /// Position of the build's `build-event`
    pub build_position: u64,
    pub checkpoint_id: Option<String>,
    pub read_position: Option<u64>,
    pub min_index: i32,
    pub build_from_index: i32,
    pub max_index: i32,
}
