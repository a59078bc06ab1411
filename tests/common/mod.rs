//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use cobs::core::scenario::{
    RecordedScenario, RecordedScenarioEngine, ScenarioAggregates, ScenarioOutcome,
};
use cobs::domain::{Provenance, RawDay, ScenarioId};

pub const STREAM: &str = "county";

/// Days recorded by the fixture engine before the series starts
pub const RUN_UP_DAYS: i32 = 3;

/// Last index the fixture engine has outcomes for
pub const ENGINE_HORIZON: i32 = 60;

pub fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 10, 1).unwrap()
}

pub fn date_at(index: i32) -> NaiveDate {
    if index >= 0 {
        start().checked_add_days(Days::new(index as u64)).unwrap()
    } else {
        start()
            .checked_sub_days(Days::new(index.unsigned_abs() as u64))
            .unwrap()
    }
}

pub fn day(index: i32, cases: u32) -> RawDay {
    RawDay::new(date_at(index), cases, 1000 + cases, 5.0, cases % 4, cases % 7)
}

/// Contiguous days for indices `from..to`
pub fn days(from: i32, to: i32) -> Vec<RawDay> {
    (from..to).map(|i| day(i, 100 + i as u32)).collect()
}

fn scenario(name: &str, scale: f64) -> RecordedScenario {
    let outcomes = (-RUN_UP_DAYS..=ENGINE_HORIZON)
        .map(|i| ScenarioOutcome {
            timeline_index: i,
            date: date_at(i),
            actual_daily_new_cases: ((i + RUN_UP_DAYS + 10) as f64 * scale) as i64,
            admissions_with_churn: ((i + RUN_UP_DAYS) as f64 * scale) as i64,
            delta_cases_ratio: 0.1 * scale,
            growth_rate: 0.04 * scale,
            r_effective: 0.9 + 0.1 * scale,
            doubling_time: 10.0 / scale,
            provenance: if i < 0 {
                Provenance::RunUp
            } else {
                Provenance::Observed
            },
        })
        .collect();

    RecordedScenario {
        id: ScenarioId::new(name),
        outcomes,
        aggregates: ScenarioAggregates {
            projected_total_mortality: (1000.0 * scale) as i64,
            projected_total_seroprevalence: 0.1 * scale,
            current_growth_rate: 0.0,
            current_r_effective: 0.0,
        },
    }
}

/// Three scenarios with case counts at 0.5x, 1x and 1.5x of a common curve
pub fn engine(lags: Vec<u32>) -> RecordedScenarioEngine {
    RecordedScenarioEngine::new(
        lags,
        vec![
            scenario("low", 0.5),
            scenario("mid", 1.0),
            scenario("high", 1.5),
        ],
    )
    .unwrap()
}
