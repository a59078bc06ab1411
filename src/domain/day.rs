//! Observed day models
//!
//! A [`RawDay`] is one validated row of observed data. A [`RollingDay`] adds the short
//! and long window averages computed over its neighbourhood in the series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One validated day of observed data, uniquely keyed by date
///
/// `timeline_index` stays `None` until the whole series has been proven contiguous
/// and seeded; it never changes afterwards.
///
/// # Examples
///
/// ```
/// use cobs::domain::RawDay;
/// use chrono::NaiveDate;
///
/// let day = RawDay::new(NaiveDate::from_ymd_opt(2020, 10, 1).unwrap(), 120, 4000, 3.0, 2, 15);
/// assert!(day.timeline_index.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDay {
    /// Position in the contiguous series, once seeded
    pub timeline_index: Option<i32>,
    /// Calendar date
    pub date: NaiveDate,
    /// Daily new cases
    pub daily_new_cases: u32,
    /// Tests performed
    pub tests: u32,
    /// Test positivity percentage, in [0, 100]
    pub positivity: f64,
    /// Daily mortality
    pub mortality: u32,
    /// Daily hospitalizations
    pub hospitalizations: u32,
}

impl RawDay {
    /// Creates an unindexed day
    pub fn new(
        date: NaiveDate,
        daily_new_cases: u32,
        tests: u32,
        positivity: f64,
        mortality: u32,
        hospitalizations: u32,
    ) -> Self {
        Self {
            timeline_index: None,
            date,
            daily_new_cases,
            tests,
            positivity,
            mortality,
            hospitalizations,
        }
    }

    /// Compares observed values, ignoring the timeline index
    ///
    /// Equal dates imply equal eventual indices, so the index is not part of the comparison.
    pub fn same_observation(&self, other: &RawDay) -> bool {
        self.date == other.date
            && self.daily_new_cases == other.daily_new_cases
            && self.tests == other.tests
            && self.positivity == other.positivity
            && self.mortality == other.mortality
            && self.hospitalizations == other.hospitalizations
    }
}

/// Averages of the five observed metrics over one window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowAverages {
    pub daily_new_cases: f64,
    pub tests: f64,
    pub positivity: f64,
    pub mortality: f64,
    pub hospitalizations: f64,
}

/// A raw day with its rolling averages
///
/// Derived, never persisted on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingDay {
    /// The underlying observation
    pub raw: RawDay,
    /// Averages over the ±2 day window
    pub short: WindowAverages,
    /// Mortality averaged over the ±50 day window
    pub long_mortality: f64,
    /// Hospitalizations averaged over the ±50 day window
    pub long_hospitalizations: f64,
}

impl RollingDay {
    /// Timeline index of the underlying day
    ///
    /// Rolling days are only ever built from a seeded series.
    pub fn timeline_index(&self) -> i32 {
        self.raw.timeline_index.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(cases: u32) -> RawDay {
        RawDay::new(
            NaiveDate::from_ymd_opt(2020, 10, 1).unwrap(),
            cases,
            100,
            5.0,
            1,
            2,
        )
    }

    #[test]
    fn test_same_observation_ignores_index() {
        let a = day(10);
        let mut b = day(10);
        b.timeline_index = Some(4);
        assert!(a.same_observation(&b));
    }

    #[test]
    fn test_same_observation_detects_correction() {
        assert!(!day(10).same_observation(&day(11)));
    }
}
