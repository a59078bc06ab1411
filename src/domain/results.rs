//! Published result models
//!
//! These are the rows a build commits: one [`ResultsDay`] per timeline index from the
//! start of the run-up period, and one [`Aggregates`] row per build job.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a scenario value came from
///
/// Carried through to result rows for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Not reported by the engine
    #[default]
    Unknown,
    /// Synthesized during the pre-series run-up
    RunUp,
    /// Computed once the observed series had enough days
    Observed,
}

impl Provenance {
    /// Ordinal used by the flat-file format
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::RunUp => 1,
            Self::Observed => 2,
        }
    }
}

/// Lower, baseline and upper values of one metric
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub lower: T,
    pub baseline: T,
    pub upper: T,
}

impl<T> Bounds<T> {
    /// Creates bounds from three values
    pub fn new(lower: T, baseline: T, upper: T) -> Self {
        Self {
            lower,
            baseline,
            upper,
        }
    }

    /// Applies `f` to each bound
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Bounds<U> {
        Bounds {
            lower: f(self.lower),
            baseline: f(self.baseline),
            upper: f(self.upper),
        }
    }

    /// The three values in lower, baseline, upper order
    pub fn to_array(self) -> [T; 3] {
        [self.lower, self.baseline, self.upper]
    }
}

/// Observed inputs copied onto post-run-up result rows
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservedInputs {
    pub mortality: u32,
    pub hospitalizations: u32,
    pub tests: u32,
    pub positivity: f64,
    pub rolling_mortality: f64,
    pub rolling_hospitalizations: f64,
    pub rolling_tests: f64,
    pub rolling_positivity: f64,
}

/// Scenario metrics copied from the three selected scenarios
///
/// Zero incidence growth and R-eff at the stability threshold are stored as 0, never
/// as an infinity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectedMetrics {
    pub admissions_with_churn: Bounds<i64>,
    pub delta_cases_ratio: Bounds<f64>,
    pub growth_rate: Bounds<f64>,
    pub r_effective: Bounds<f64>,
    pub doubling_time: Bounds<f64>,
}

/// One published row per timeline index
///
/// Run-up rows (negative index) carry only case counts and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsDay {
    pub timeline_index: i32,
    pub date: NaiveDate,
    pub observed: Option<ObservedInputs>,
    pub provenance: Bounds<Provenance>,
    pub actual_daily_new_cases: Bounds<i64>,
    pub projected: Option<ProjectedMetrics>,
}

impl ResultsDay {
    /// Whether this row lies in the run-up period
    pub fn is_run_up(&self) -> bool {
        self.timeline_index < 0
    }
}

/// Build-wide aggregates taken at the most recent timeline index
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aggregates {
    /// Current R-effective, rounded to 2 decimals
    pub current_r_effective: Bounds<f64>,
    /// Current doubling time in days; 0 means undefined or unstable growth
    pub current_doubling_time: Bounds<i32>,
    /// Whether the growth regime is unstable
    pub doubling_time_unstable: bool,
    pub projected_total_seroprevalence: Bounds<f64>,
    pub projected_total_mortality: Bounds<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provenance_ordinals() {
        assert_eq!(Provenance::Unknown.ordinal(), 0);
        assert_eq!(Provenance::RunUp.ordinal(), 1);
        assert_eq!(Provenance::Observed.ordinal(), 2);
    }

    #[test]
    fn test_bounds_map() {
        let b = Bounds::new(1, 2, 3).map(|v| v * 10);
        assert_eq!(b.to_array(), [10, 20, 30]);
    }
}
