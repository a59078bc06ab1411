//! Day validation, timeline seeding and rolling averages

pub mod rolling;
pub mod series;
pub mod validator;

pub use rolling::{
    compute_rolling, populate_rolling, LONG_WINDOW_RADIUS, SHORT_WINDOW_RADIUS,
};
pub use series::{merge_by_date, seed_timeline};
pub use validator::{parse_date, validate_event, validate_row, UncheckedDay, SOURCE_COLUMNS};
