//! Results-day and aggregates extraction
//!
//! Days: the three scenarios are chosen once by actual daily new cases, and every
//! other metric is copied from those same scenarios. Aggregates: the same three
//! scenarios are chosen at the latest index, then each metric family is re-ranked
//! on its own values.

use super::growth::{doubling_time, is_unstable, round_2dp};
use super::select::{rank_three, select_bounds};
use crate::core::scenario::{
    min_run_up_index, ScenarioAggregates, ScenarioOutcome, ScenarioRun,
};
use crate::domain::{
    Aggregates, CobsError, ObservedInputs, ProjectedMetrics, Result, ResultsDay,
    RollingDay,
};

/// Extracts the results row for one timeline index
///
/// Non-negative indices must exist in `series`; their rows also carry the observed
/// inputs and the projected metrics of the selected scenarios.
///
/// # Errors
///
/// Returns `CobsError::Engine` if no scenario produced an outcome at `timeline_index`,
/// or if a non-negative index lies outside the series.
pub fn extract_results_day(
    timeline_index: i32,
    runs: &[ScenarioRun],
    series: &[RollingDay],
) -> Result<ResultsDay> {
    let outcomes = outcomes_at(timeline_index, runs);
    let picked = select_bounds(&outcomes, |o| o.actual_daily_new_cases).ok_or_else(|| {
        CobsError::Engine(format!("no scenario outcomes at index {timeline_index}"))
    })?;

    let provenance = picked.map(|o| o.provenance);
    let actual_daily_new_cases = picked.map(|o| o.actual_daily_new_cases);

    if timeline_index < 0 {
        return Ok(ResultsDay {
            timeline_index,
            date: outcomes[0].date,
            observed: None,
            provenance,
            actual_daily_new_cases,
            projected: None,
        });
    }

    let day = series.get(timeline_index as usize).ok_or_else(|| {
        CobsError::Engine(format!(
            "index {timeline_index} is beyond the {}-day series",
            series.len()
        ))
    })?;

    Ok(ResultsDay {
        timeline_index,
        date: day.raw.date,
        observed: Some(observed_inputs(day)),
        provenance,
        actual_daily_new_cases,
        projected: Some(ProjectedMetrics {
            admissions_with_churn: picked.map(|o| o.admissions_with_churn),
            delta_cases_ratio: picked.map(|o| finite_or_zero(o.delta_cases_ratio)),
            growth_rate: picked.map(|o| finite_or_zero(o.growth_rate)),
            r_effective: picked.map(|o| finite_or_zero(o.r_effective)),
            doubling_time: picked.map(|o| finite_or_zero(o.doubling_time)),
        }),
    })
}

/// Extracts every results row from the earliest run-up index through `last_index`
pub fn extract_results_days(
    runs: &[ScenarioRun],
    series: &[RollingDay],
    last_index: i32,
) -> Result<Vec<ResultsDay>> {
    let first_index = min_run_up_index(runs)
        .ok_or_else(|| CobsError::Engine("scenario runs produced no outcomes".to_string()))?
        .min(0);

    (first_index..=last_index)
        .map(|index| extract_results_day(index, runs, series))
        .collect()
}

/// Extracts the aggregates at `latest_index`
///
/// A single scenario yields equal lower, baseline and upper values.
pub fn extract_aggregates(latest_index: i32, runs: &[ScenarioRun]) -> Result<Aggregates> {
    let current: Vec<&ScenarioRun> = runs
        .iter()
        .filter(|run| run.outcome_at(latest_index).is_some())
        .collect();

    let picked = select_bounds(&current, |run| {
        run.outcome_at(latest_index)
            .map(|o| o.actual_daily_new_cases)
            .unwrap_or_default()
    })
    .ok_or_else(|| CobsError::Engine(format!("no scenario outcomes at index {latest_index}")))?;

    let selected = picked.map(|run| run.aggregates).to_array();
    let metric = |f: fn(&ScenarioAggregates) -> f64| selected.map(|a| finite_or_zero(f(&a)));

    let mortality = rank_three(selected.map(|a| a.projected_total_mortality), Ord::cmp);
    let seroprevalence = rank_three(
        metric(|a| a.projected_total_seroprevalence),
        f64::total_cmp,
    );
    let growth = rank_three(metric(|a| a.current_growth_rate), f64::total_cmp);
    let r_effective =
        rank_three(metric(|a| a.current_r_effective), f64::total_cmp).map(round_2dp);

    let current_doubling_time = growth.map(doubling_time);

    Ok(Aggregates {
        current_r_effective: r_effective,
        current_doubling_time,
        doubling_time_unstable: is_unstable(&r_effective, &current_doubling_time),
        projected_total_seroprevalence: seroprevalence,
        projected_total_mortality: mortality,
    })
}

/// Engine values that are NaN or infinite carry no meaningful growth and publish as 0
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn outcomes_at(timeline_index: i32, runs: &[ScenarioRun]) -> Vec<&ScenarioOutcome> {
    runs.iter()
        .filter_map(|run| run.outcome_at(timeline_index))
        .collect()
}

fn observed_inputs(day: &RollingDay) -> ObservedInputs {
    ObservedInputs {
        mortality: day.raw.mortality,
        hospitalizations: day.raw.hospitalizations,
        tests: day.raw.tests,
        positivity: day.raw.positivity,
        rolling_mortality: day.short.mortality,
        rolling_hospitalizations: day.short.hospitalizations,
        rolling_tests: day.short.tests,
        rolling_positivity: day.short.positivity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::{populate_rolling, seed_timeline};
    use crate::domain::{Provenance, RawDay, ScenarioId};
    use chrono::{Days, NaiveDate};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 10, 1).unwrap()
    }

    fn outcome(index: i32, cases: i64, growth: f64) -> ScenarioOutcome {
        let date = if index >= 0 {
            start().checked_add_days(Days::new(index as u64)).unwrap()
        } else {
            start().checked_sub_days(Days::new(index.unsigned_abs() as u64)).unwrap()
        };
        ScenarioOutcome {
            timeline_index: index,
            date,
            actual_daily_new_cases: cases,
            admissions_with_churn: cases * 2,
            delta_cases_ratio: 0.5,
            growth_rate: growth,
            r_effective: 1.0 + growth,
            doubling_time: 10.0,
            provenance: if index < 0 {
                Provenance::RunUp
            } else {
                Provenance::Observed
            },
        }
    }

    fn run(name: &str, outcomes: Vec<ScenarioOutcome>, aggregates: ScenarioAggregates) -> ScenarioRun {
        ScenarioRun {
            scenario: ScenarioId::new(name),
            outcomes,
            aggregates,
        }
    }

    fn series(len: u32) -> Vec<RollingDay> {
        let mut raw: Vec<RawDay> = (0..len)
            .map(|i| {
                RawDay::new(
                    start().checked_add_days(Days::new(i as u64)).unwrap(),
                    10 + i,
                    100,
                    5.0,
                    i,
                    1,
                )
            })
            .collect();
        assert!(seed_timeline(&mut raw));
        populate_rolling(&raw)
    }

    fn three_runs() -> Vec<ScenarioRun> {
        vec![
            run(
                "beta-high",
                vec![outcome(-1, 50, 0.0), outcome(0, 60, 0.10), outcome(1, 70, 0.12)],
                ScenarioAggregates {
                    projected_total_mortality: 100,
                    projected_total_seroprevalence: 0.30,
                    current_growth_rate: 0.12,
                    current_r_effective: 1.234,
                },
            ),
            run(
                "beta-low",
                vec![outcome(-1, 5, 0.0), outcome(0, 6, -0.05), outcome(1, 7, -0.04)],
                ScenarioAggregates {
                    projected_total_mortality: 900,
                    projected_total_seroprevalence: 0.10,
                    current_growth_rate: -0.04,
                    current_r_effective: 0.871,
                },
            ),
            run(
                "beta-mid",
                vec![outcome(-1, 20, 0.0), outcome(0, 30, 0.03), outcome(1, 35, 0.05)],
                ScenarioAggregates {
                    projected_total_mortality: 400,
                    projected_total_seroprevalence: 0.20,
                    current_growth_rate: 0.05,
                    current_r_effective: 1.05,
                },
            ),
        ]
    }

    #[test]
    fn test_non_finite_engine_values_publish_as_zero() {
        let mut runs = three_runs();
        let high = &mut runs[0];
        high.outcomes[2].doubling_time = f64::INFINITY;
        high.outcomes[2].growth_rate = f64::NAN;
        high.outcomes[2].r_effective = f64::NEG_INFINITY;
        high.outcomes[2].delta_cases_ratio = f64::NAN;
        high.aggregates.current_r_effective = f64::NAN;
        high.aggregates.projected_total_seroprevalence = f64::INFINITY;

        let row = extract_results_day(1, &runs, &series(2)).unwrap();
        assert!(!serde_json::to_string(&row).unwrap().contains("null"));

        let projected = row.projected.unwrap();
        assert_eq!(projected.doubling_time.upper, 0.0);
        assert_eq!(projected.growth_rate.upper, 0.0);
        assert_eq!(projected.r_effective.upper, 0.0);
        assert_eq!(projected.delta_cases_ratio.upper, 0.0);

        let aggregates = extract_aggregates(1, &runs).unwrap();
        assert_eq!(aggregates.current_r_effective.to_array(), [0.0, 0.87, 1.05]);
        assert_eq!(
            aggregates.projected_total_seroprevalence.to_array(),
            [0.0, 0.10, 0.20]
        );
    }

    #[test]
    fn test_run_up_row_has_cases_and_provenance_only() {
        let row = extract_results_day(-1, &three_runs(), &series(2)).unwrap();
        assert!(row.is_run_up());
        assert_eq!(row.actual_daily_new_cases.to_array(), [5, 20, 50]);
        assert_eq!(row.provenance.lower, Provenance::RunUp);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2020, 9, 30).unwrap());
        assert!(row.observed.is_none());
        assert!(row.projected.is_none());
    }

    #[test]
    fn test_observed_row_copies_selected_scenarios() {
        let row = extract_results_day(1, &three_runs(), &series(2)).unwrap();
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2020, 10, 2).unwrap());
        assert_eq!(row.actual_daily_new_cases.to_array(), [7, 35, 70]);

        let projected = row.projected.unwrap();
        // Growth follows the case-count choice, not its own ordering.
        assert_eq!(projected.growth_rate.to_array(), [-0.04, 0.05, 0.12]);
        assert_eq!(projected.admissions_with_churn.to_array(), [14, 70, 140]);

        let observed = row.observed.unwrap();
        assert_eq!(observed.mortality, 1);
        assert_eq!(observed.tests, 100);
        assert_eq!(observed.rolling_mortality, 0.5);
    }

    #[test]
    fn test_extract_results_days_spans_run_up() {
        let rows = extract_results_days(&three_runs(), &series(2), 1).unwrap();
        let indices: Vec<_> = rows.iter().map(|r| r.timeline_index).collect();
        assert_eq!(indices, vec![-1, 0, 1]);
    }

    #[test]
    fn test_missing_outcomes_is_engine_error() {
        assert!(matches!(
            extract_results_day(5, &three_runs(), &series(2)),
            Err(CobsError::Engine(_))
        ));
        assert!(matches!(extract_aggregates(5, &three_runs()), Err(CobsError::Engine(_))));
    }

    #[test]
    fn test_aggregates_rank_each_metric_independently() {
        let aggregates = extract_aggregates(1, &three_runs()).unwrap();

        assert_eq!(aggregates.projected_total_mortality.to_array(), [100, 400, 900]);
        assert_eq!(
            aggregates.projected_total_seroprevalence.to_array(),
            [0.10, 0.20, 0.30]
        );
        assert_eq!(aggregates.current_r_effective.to_array(), [0.87, 1.05, 1.23]);
        // Growth -0.04, 0.05, 0.12 -> -17, 14, 6
        assert_eq!(aggregates.current_doubling_time.to_array(), [-17, 14, 6]);
        assert!(aggregates.doubling_time_unstable);
    }

    #[test]
    fn test_single_scenario_aggregates() {
        let runs = vec![run(
            "only",
            vec![outcome(0, 10, 0.1)],
            ScenarioAggregates {
                projected_total_mortality: 7,
                projected_total_seroprevalence: 0.5,
                current_growth_rate: 0.1,
                current_r_effective: 1.5,
            },
        )];
        let aggregates = extract_aggregates(0, &runs).unwrap();
        assert_eq!(aggregates.projected_total_mortality.to_array(), [7, 7, 7]);
        assert_eq!(aggregates.current_doubling_time.to_array(), [7, 7, 7]);
        assert!(!aggregates.doubling_time_unstable);
    }
}
