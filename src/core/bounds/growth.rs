//! Growth-rate derived values

use crate::domain::Bounds;

/// Growth rates at or below this are treated as extreme decay
pub const MIN_MEANINGFUL_GROWTH: f64 = -0.9;

/// Growth rates strictly inside this band around zero are treated as flat
pub const FLAT_GROWTH_BAND: f64 = 0.02;

/// Doubling time in days for a daily growth rate
///
/// Defined as `round(ln 2 / ln(1 + g))` for `g` in `[-0.9, -0.02]` or `(0.02, inf)`;
/// any other rate, NaN included, yields 0.
///
/// # Examples
///
/// ```
/// use cobs::core::bounds::doubling_time;
///
/// assert_eq!(doubling_time(0.05), 14);
/// assert_eq!(doubling_time(0.01), 0);
/// assert!(doubling_time(-0.05) < 0);
/// ```
pub fn doubling_time(growth_rate: f64) -> i32 {
    if !has_meaningful_growth(growth_rate) {
        return 0;
    }
    round_half_even(std::f64::consts::LN_2 / growth_rate.ln_1p()) as i32
}

/// Whether a growth rate yields a defined doubling time
pub fn has_meaningful_growth(growth_rate: f64) -> bool {
    (MIN_MEANINGFUL_GROWTH..=-FLAT_GROWTH_BAND).contains(&growth_rate)
        || growth_rate > FLAT_GROWTH_BAND
}

/// Relative distance from a midpoint still treated as a tie
///
/// Decimal inputs such as 1.135 have no exact binary form and scale to 113.4999...;
/// they round as the decimal they were written as.
const TIE_TOLERANCE: f64 = 1e-9;

/// Rounds to 2 decimal places, ties to even
///
/// # Examples
///
/// ```
/// use cobs::core::bounds::round_2dp;
///
/// assert_eq!(round_2dp(1.125), 1.12);
/// assert_eq!(round_2dp(1.135), 1.14);
/// ```
pub fn round_2dp(value: f64) -> f64 {
    round_half_even(value * 100.0) / 100.0
}

/// Rounds to the nearest integer, ties to even
pub fn round_half_even(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let floor = value.floor();
    let distance = value - floor - 0.5;
    if distance.abs() <= TIE_TOLERANCE * value.abs().max(1.0) {
        if floor % 2.0 == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        value.round()
    }
}

/// Whether the growth regime is unstable
///
/// True when the R-effective band straddles 1 (lower below 1.1 and upper above 0.9),
/// or when any doubling time is 0.
pub fn is_unstable(r_effective: &Bounds<f64>, doubling_time: &Bounds<i32>) -> bool {
    let straddles_one = !(r_effective.lower >= 1.1 || r_effective.upper <= 0.9);
    straddles_one || doubling_time.to_array().contains(&0)
}
