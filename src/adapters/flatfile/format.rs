//! Flat-file row formats
//!
//! Comma-separated, one line per record. Results rows follow `ResultsDay` field order:
//! index, date, the eight observed inputs, three provenance ordinals, then lower,
//! baseline and upper for admissions, cases, delta ratio, growth rate, R-effective and
//! doubling time. Run-up rows write 0 for the fields they do not carry.

use crate::domain::{Aggregates, Bounds, ResultsDay};
use std::fmt::Display;

/// Number of fields in a results line
pub const RESULTS_FIELDS: usize = 31;

/// Number of fields in an aggregates line
pub const AGGREGATES_FIELDS: usize = 13;

/// Formats one results row
pub fn results_line(day: &ResultsDay) -> String {
    let observed = day.observed.unwrap_or_default();
    let projected = day.projected.unwrap_or_default();

    let mut fields: Vec<String> = vec![
        day.timeline_index.to_string(),
        day.date.format("%Y-%m-%d").to_string(),
        observed.mortality.to_string(),
        observed.hospitalizations.to_string(),
        observed.tests.to_string(),
        observed.positivity.to_string(),
        observed.rolling_mortality.to_string(),
        observed.rolling_hospitalizations.to_string(),
        observed.rolling_tests.to_string(),
        observed.rolling_positivity.to_string(),
    ];
    push_bounds(&mut fields, day.provenance.map(|p| p.ordinal()));
    push_bounds(&mut fields, projected.admissions_with_churn);
    push_bounds(&mut fields, day.actual_daily_new_cases);
    push_bounds(&mut fields, projected.delta_cases_ratio);
    push_bounds(&mut fields, projected.growth_rate);
    push_bounds(&mut fields, projected.r_effective);
    push_bounds(&mut fields, projected.doubling_time);

    fields.join(",")
}

/// Formats the aggregates row
pub fn aggregates_line(aggregates: &Aggregates) -> String {
    let mut fields = Vec::with_capacity(AGGREGATES_FIELDS);
    push_bounds(&mut fields, aggregates.current_r_effective);
    push_bounds(&mut fields, aggregates.current_doubling_time);
    fields.push(u8::from(aggregates.doubling_time_unstable).to_string());
    push_bounds(&mut fields, aggregates.projected_total_seroprevalence);
    push_bounds(&mut fields, aggregates.projected_total_mortality);

    fields.join(",")
}

fn push_bounds<T: Display>(fields: &mut Vec<String>, bounds: Bounds<T>) {
    fields.extend(bounds.to_array().iter().map(ToString::to_string));
}
