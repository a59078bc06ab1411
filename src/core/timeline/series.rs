//! Timeline contiguity and index seeding

use crate::domain::RawDay;
use chrono::Days;
use std::collections::BTreeMap;

/// Sorts days by date and, if they are day-contiguous, seeds ascending indices from 0
///
/// Returns `false` and leaves every index unset when any gap (or duplicate date) exists.
/// A series of zero or one day is trivially contiguous.
///
/// # Examples
///
/// ```
/// use cobs::core::timeline::seed_timeline;
/// use cobs::domain::RawDay;
/// use chrono::NaiveDate;
///
/// let d = |day| RawDay::new(NaiveDate::from_ymd_opt(2020, 10, day).unwrap(), 1, 1, 1.0, 0, 0);
/// let mut days = vec![d(2), d(1), d(3)];
/// assert!(seed_timeline(&mut days));
/// assert_eq!(days[0].timeline_index, Some(0));
/// assert_eq!(days[2].date, NaiveDate::from_ymd_opt(2020, 10, 3).unwrap());
/// ```
pub fn seed_timeline(days: &mut [RawDay]) -> bool {
    days.sort_by_key(|day| day.date);

    let contiguous = days
        .windows(2)
        .all(|pair| pair[0].date.checked_add_days(Days::new(1)) == Some(pair[1].date));

    if !contiguous {
        for day in days.iter_mut() {
            day.timeline_index = None;
        }
        return false;
    }

    for (index, day) in days.iter_mut().enumerate() {
        day.timeline_index = Some(index as i32);
    }

    true
}

/// Merges day sets in order, later days overwriting earlier ones with the same date
pub fn merge_by_date<'a>(sets: impl IntoIterator<Item = &'a [RawDay]>) -> Vec<RawDay> {
    let mut merged: BTreeMap<chrono::NaiveDate, RawDay> = BTreeMap::new();
    for set in sets {
        for day in set {
            merged.insert(day.date, day.clone());
        }
    }
    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32, cases: u32) -> RawDay {
        RawDay::new(
            NaiveDate::from_ymd_opt(2020, 10, d).unwrap(),
            cases,
            1,
            1.0,
            0,
            0,
        )
    }

    #[test]
    fn test_contiguous_series_is_seeded_in_date_order() {
        let mut days = vec![day(3, 3), day(1, 1), day(2, 2)];
        assert!(seed_timeline(&mut days));
        let indices: Vec<_> = days.iter().map(|d| d.timeline_index).collect();
        assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
        let cases: Vec<_> = days.iter().map(|d| d.daily_new_cases).collect();
        assert_eq!(cases, vec![1, 2, 3]);
    }

    #[test]
    fn test_gap_leaves_indices_unset() {
        let mut days = vec![day(1, 1), day(2, 2), day(4, 4)];
        assert!(!seed_timeline(&mut days));
        assert!(days.iter().all(|d| d.timeline_index.is_none()));
    }

    #[test]
    fn test_duplicate_date_is_not_contiguous() {
        let mut days = vec![day(1, 1), day(1, 2)];
        assert!(!seed_timeline(&mut days));
    }

    #[test]
    fn test_trivial_series() {
        let mut empty: Vec<RawDay> = Vec::new();
        assert!(seed_timeline(&mut empty));

        let mut single = vec![day(9, 1)];
        assert!(seed_timeline(&mut single));
        assert_eq!(single[0].timeline_index, Some(0));
    }

    #[test]
    fn test_merge_by_date_last_write_wins() {
        let first = vec![day(1, 1), day(2, 2)];
        let second = vec![day(2, 20), day(3, 3)];
        let merged = merge_by_date([first.as_slice(), second.as_slice()]);
        let cases: Vec<_> = merged.iter().map(|d| d.daily_new_cases).collect();
        assert_eq!(cases, vec![1, 20, 3]);
    }
}
