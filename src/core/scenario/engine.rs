//! Scenario engine contract
//!
//! The propagation mathematics live outside this crate. A build only needs the engine
//! to name its scenarios, declare its minimum lags, and run one scenario over a
//! rolling series.

use crate::domain::{Provenance, Result, RollingDay, ScenarioId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scenario's projection for one timeline index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Timeline index; negative during the run-up period
    pub timeline_index: i32,
    /// Calendar date of the index
    pub date: NaiveDate,
    pub actual_daily_new_cases: i64,
    #[serde(default)]
    pub admissions_with_churn: i64,
    /// 9-day delta-cases over delta-time ratio
    #[serde(default)]
    pub delta_cases_ratio: f64,
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub r_effective: f64,
    #[serde(default)]
    pub doubling_time: f64,
    #[serde(default)]
    pub provenance: Provenance,
}

/// Whole-scenario totals and current values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioAggregates {
    pub projected_total_mortality: i64,
    pub projected_total_seroprevalence: f64,
    pub current_growth_rate: f64,
    pub current_r_effective: f64,
}

/// The output of running one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRun {
    pub scenario: ScenarioId,
    /// Outcomes in ascending timeline order, run-up included
    pub outcomes: Vec<ScenarioOutcome>,
    pub aggregates: ScenarioAggregates,
}

impl ScenarioRun {
    /// Outcome at `timeline_index`, if the scenario produced one
    pub fn outcome_at(&self, timeline_index: i32) -> Option<&ScenarioOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.timeline_index == timeline_index)
    }
}

/// Scenario engine contract
///
/// Implementations are pure with respect to the series they are given; the
/// orchestrator calls them once per build job.
pub trait ScenarioEngine: Send + Sync {
    /// Engine-declared minimum lags, in days
    ///
    /// A build needs at least `max(lags) + 1` validated days.
    fn minimum_lags(&self) -> &[u32];

    /// Generates the scenario parameter set, in a stable order
    fn generate_parameters(&self) -> Result<Vec<ScenarioId>>;

    /// Runs one scenario over a rolling series
    fn run(&self, scenario: &ScenarioId, days: &[RollingDay]) -> Result<ScenarioRun>;

    /// Largest declared lag, or 0 when none are declared
    fn max_lag(&self) -> u32 {
        self.minimum_lags().iter().copied().max().unwrap_or(0)
    }
}

/// Lowest timeline index produced by any run
///
/// Returns `None` when no run produced an outcome.
pub fn min_run_up_index(runs: &[ScenarioRun]) -> Option<i32> {
    runs.iter()
        .flat_map(|run| run.outcomes.iter().map(|o| o.timeline_index))
        .min()
}
