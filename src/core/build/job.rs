//! Build jobs

use crate::domain::{Aggregates, ResultsDay};
use chrono::NaiveDate;

/// Results for one queued timeline index, ready to commit
///
/// Created by the orchestrator, consumed by a results sink, discarded after commit.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildJob {
    /// Timeline index the job was built at
    pub time_series_index: i32,
    /// Date of that index
    pub time_series_day: NaiveDate,
    /// Rows from the earliest run-up index through `time_series_index`
    pub results_days: Vec<ResultsDay>,
    /// Aggregates at `time_series_index`
    pub aggregates: Aggregates,
}

impl BuildJob {
    /// Lowest timeline index among the job's rows
    pub fn min_index(&self) -> i32 {
        self.results_days
            .first()
            .map(|day| day.timeline_index)
            .unwrap_or(self.time_series_index)
    }
}
