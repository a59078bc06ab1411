//! Rolling window averages
//!
//! Windows are clamped at the series boundaries without padding, so the divisor is
//! always the number of days actually inside the window.

use crate::domain::{RawDay, RollingDay, WindowAverages};

/// Radius of the short window (±2 days)
pub const SHORT_WINDOW_RADIUS: usize = 2;

/// Radius of the long window (±50 days)
pub const LONG_WINDOW_RADIUS: usize = 50;

/// Computes the rolling day at `index` of a seeded series
///
/// Returns `None` if `index` is outside the series.
///
/// # Examples
///
/// ```
/// use cobs::core::timeline::{compute_rolling, seed_timeline};
/// use cobs::domain::RawDay;
/// use chrono::NaiveDate;
///
/// let mut days: Vec<RawDay> = (1..=10)
///     .map(|d| RawDay::new(NaiveDate::from_ymd_opt(2020, 10, d).unwrap(), d, 0, 0.0, 0, 0))
///     .collect();
/// seed_timeline(&mut days);
///
/// // Index 0 averages days 0..=2 only: (1 + 2 + 3) / 3
/// let rolling = compute_rolling(0, &days).unwrap();
/// assert_eq!(rolling.short.daily_new_cases, 2.0);
/// ```
pub fn compute_rolling(index: usize, series: &[RawDay]) -> Option<RollingDay> {
    let raw = series.get(index)?.clone();

    let short = window(index, SHORT_WINDOW_RADIUS, series);
    let long = window(index, LONG_WINDOW_RADIUS, series);

    let long_averages = averages(long);

    Some(RollingDay {
        raw,
        short: averages(short),
        long_mortality: long_averages.mortality,
        long_hospitalizations: long_averages.hospitalizations,
    })
}

/// Computes rolling days for the whole series
pub fn populate_rolling(series: &[RawDay]) -> Vec<RollingDay> {
    (0..series.len())
        .filter_map(|index| compute_rolling(index, series))
        .collect()
}

fn window(index: usize, radius: usize, series: &[RawDay]) -> &[RawDay] {
    let start = index.saturating_sub(radius);
    let end = (index + radius).min(series.len().saturating_sub(1));
    &series[start..=end]
}

fn averages(days: &[RawDay]) -> WindowAverages {
    let n = days.len() as f64;
    let mean = |f: fn(&RawDay) -> f64| days.iter().map(f).sum::<f64>() / n;

    WindowAverages {
        daily_new_cases: mean(|d| d.daily_new_cases as f64),
        tests: mean(|d| d.tests as f64),
        positivity: mean(|d| d.positivity),
        mortality: mean(|d| d.mortality as f64),
        hospitalizations: mean(|d| d.hospitalizations as f64),
    }
}
