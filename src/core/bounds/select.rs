//! Lower, median and upper selection by case count

use crate::domain::Bounds;

/// Picks lower, baseline and upper items by an integer key
///
/// Lower is the first minimum and upper the first maximum, both in input order.
/// Baseline sits at rank `n / 2` of a stable ascending sort, so ties keep input order.
/// Returns `None` for an empty slice; a single item fills all three bounds.
///
/// # Examples
///
/// ```
/// use cobs::core::bounds::select_bounds;
///
/// let cases = [30, 10, 20, 10];
/// let picked = select_bounds(&cases, |c| *c as i64).unwrap();
/// assert_eq!(picked.map(|c| *c).to_array(), [10, 20, 30]);
/// ```
pub fn select_bounds<T>(items: &[T], key: impl Fn(&T) -> i64) -> Option<Bounds<&T>> {
    if items.is_empty() {
        return None;
    }

    let mut ranked: Vec<&T> = items.iter().collect();
    ranked.sort_by_key(|item| key(*item));

    let lower = ranked[0];
    let baseline = ranked[items.len() / 2];

    let mut upper = &items[0];
    for item in &items[1..] {
        if key(item) > key(upper) {
            upper = item;
        }
    }

    Some(Bounds::new(lower, baseline, upper))
}

/// Sorts three values ascending into bounds
pub fn rank_three<T: Copy>(values: [T; 3], cmp: impl Fn(&T, &T) -> std::cmp::Ordering) -> Bounds<T> {
    let mut values = values;
    values.sort_by(|a, b| cmp(a, b));
    Bounds::new(values[0], values[1], values[2])
}
