//! Bound extraction across the scenario set

pub mod extract;
pub mod growth;
pub mod select;

pub use extract::{extract_aggregates, extract_results_day, extract_results_days};
pub use growth::{doubling_time, has_meaningful_growth, is_unstable, round_2dp};
pub use select::{rank_three, select_bounds};
