//! Checkpointed source reconciliation
//!
//! A single forward pass over the decoded source log. Batches close at each
//! checkpoint; days after the last checkpoint are not yet checkpointed and are left
//! out. The newest clear marks its batch and every earlier one handled; the newest
//! progress mark makes the remaining batches up to its own partially handled.

use super::model::{BatchPartition, SourceBatch, SourceEntry, SourceSeries};
use crate::core::timeline::{merge_by_date, seed_timeline};
use crate::domain::{CheckpointId, CobsError, RawDay, Result};
use chrono::{Days, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Groups entries into checkpoint batches
///
/// Returns the batches, the newest clear and the newest progress mark.
fn collect_batches(
    entries: impl IntoIterator<Item = SourceEntry>,
) -> (Vec<SourceBatch>, Option<CheckpointId>, Option<(CheckpointId, i32)>) {
    let mut batches = Vec::new();
    let mut pending = Vec::new();
    let mut cleared = None;
    let mut marked = None;

    for entry in entries {
        match entry {
            SourceEntry::Day(day) => pending.push(day),
            SourceEntry::Checkpoint(checkpoint) => batches.push(SourceBatch {
                checkpoint,
                days: std::mem::take(&mut pending),
            }),
            SourceEntry::ProgressMark {
                checkpoint,
                handled_index,
            } => marked = Some((checkpoint, handled_index)),
            SourceEntry::Clear(checkpoint) => cleared = Some(checkpoint),
        }
    }

    if !pending.is_empty() {
        tracing::debug!(
            days = pending.len(),
            "Ignoring source days after the last checkpoint"
        );
    }

    (batches, cleared, marked)
}

/// Splits batches into handled, marked and unhandled
///
/// A clear or mark naming no known batch has no effect.
pub fn partition_batches(
    batches: Vec<SourceBatch>,
    cleared: Option<&CheckpointId>,
    marked: Option<(&CheckpointId, i32)>,
) -> BatchPartition {
    let position = |id: &CheckpointId| batches.iter().position(|b| &b.checkpoint == id);

    let cleared_at = cleared.and_then(position);
    let marked_at = marked.and_then(|(id, _)| position(id));

    let mut partition = BatchPartition {
        handled_index: marked_at.and(marked.map(|(_, index)| index)),
        ..BatchPartition::default()
    };

    for (i, batch) in batches.into_iter().enumerate() {
        if cleared_at.is_some_and(|at| i <= at) {
            partition.handled.push(batch);
        } else if marked_at.is_some_and(|at| i <= at) {
            partition.marked.push(batch);
        } else {
            partition.unhandled.push(batch);
        }
    }

    partition
}

/// Reconciles decoded source entries into a buildable series
///
/// # Errors
///
/// Returns `CobsError::Contiguity` when the merged batch days have a date gap.
///
/// # Examples
///
/// ```
/// use cobs::core::source::{reconcile, SourceEntry};
/// use cobs::domain::{CheckpointId, RawDay};
/// use chrono::NaiveDate;
///
/// let date = |d| NaiveDate::from_ymd_opt(2020, 10, d).unwrap();
/// let a = CheckpointId::new("a").unwrap();
///
/// let entries = vec![
///     SourceEntry::Day(RawDay::new(date(1), 1, 1, 1.0, 0, 0)),
///     SourceEntry::Day(RawDay::new(date(2), 1, 1, 1.0, 0, 0)),
///     SourceEntry::Checkpoint(a.clone()),
///     SourceEntry::Clear(a),
/// ];
///
/// let series = reconcile(entries, Some(4)).unwrap();
/// assert_eq!(series.days.len(), 2);
/// assert_eq!(series.build_from, Some(date(3)));
/// ```
pub fn reconcile(
    entries: impl IntoIterator<Item = SourceEntry>,
    read_position: Option<u64>,
) -> Result<SourceSeries> {
    let (batches, cleared, marked) = collect_batches(entries);
    let last_checkpoint = batches.last().map(|b| b.checkpoint.clone());

    let mut days = merge_by_date(batches.iter().map(|b| b.days.as_slice()));
    if !seed_timeline(&mut days) {
        return Err(CobsError::Contiguity);
    }

    let index_of: HashMap<NaiveDate, i32> = days
        .iter()
        .filter_map(|d| d.timeline_index.map(|i| (d.date, i)))
        .collect();

    let partition = partition_batches(
        batches,
        cleared.as_ref(),
        marked.as_ref().map(|(id, index)| (id, *index)),
    );

    let (handled, unhandled) = split_days(&partition, &index_of);
    let build_from = build_from(&days, &handled, &unhandled);

    tracing::debug!(
        days = days.len(),
        handled_batches = partition.handled.len(),
        marked_batches = partition.marked.len(),
        unhandled_batches = partition.unhandled.len(),
        handled_days = handled.len(),
        build_from = ?build_from,
        "Reconciled source batches"
    );

    Ok(SourceSeries {
        days,
        last_checkpoint,
        build_from,
        read_position,
    })
}

/// Builds the handled map and the unhandled day list
///
/// Handled: every day of handled batches, then marked-batch days at or below the
/// cutoff, later batches overwriting earlier ones. Everything else is unhandled.
fn split_days(
    partition: &BatchPartition,
    index_of: &HashMap<NaiveDate, i32>,
) -> (BTreeMap<NaiveDate, RawDay>, Vec<RawDay>) {
    let mut handled = BTreeMap::new();
    let mut unhandled = Vec::new();

    for day in partition.handled.iter().flat_map(|b| &b.days) {
        handled.insert(day.date, day.clone());
    }

    let cutoff = partition.handled_index.unwrap_or(i32::MIN);
    for day in partition.marked.iter().flat_map(|b| &b.days) {
        let index = index_of.get(&day.date).copied().unwrap_or(i32::MAX);
        if index <= cutoff {
            handled.insert(day.date, day.clone());
        } else {
            unhandled.push(day.clone());
        }
    }

    unhandled.extend(partition.unhandled.iter().flat_map(|b| b.days.iter().cloned()));

    (handled, unhandled)
}

/// Day after the newest handled date, pulled back to the earliest corrected day
fn build_from(
    days: &[RawDay],
    handled: &BTreeMap<NaiveDate, RawDay>,
    unhandled: &[RawDay],
) -> Option<NaiveDate> {
    let Some((&newest, _)) = handled.last_key_value() else {
        return days.first().map(|d| d.date);
    };

    let mut build_from = newest.checked_add_days(Days::new(1)).unwrap_or(newest);

    for day in unhandled {
        let corrected = handled
            .get(&day.date)
            .is_some_and(|published| !published.same_observation(day));
        if corrected && day.date < build_from {
            tracing::info!(date = %day.date, "Source correction invalidates published results");
            build_from = day.date;
        }
    }

    Some(build_from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 10, d).unwrap()
    }

    fn day(d: u32, cases: u32) -> SourceEntry {
        SourceEntry::Day(RawDay::new(date(d), cases, 10, 1.0, 0, 0))
    }

    fn cp(id: &str) -> CheckpointId {
        CheckpointId::new(id).unwrap()
    }

    fn batch_of(range: std::ops::RangeInclusive<u32>, id: &str) -> Vec<SourceEntry> {
        let mut entries: Vec<SourceEntry> = range.map(|d| day(d, d)).collect();
        entries.push(SourceEntry::Checkpoint(cp(id)));
        entries
    }

    #[test]
    fn test_cleared_batch_sets_build_from_after_it() {
        let mut entries = batch_of(1..=5, "a");
        entries.push(SourceEntry::Clear(cp("a")));
        entries.extend(batch_of(6..=8, "b"));

        let series = reconcile(entries, Some(11)).unwrap();
        assert_eq!(series.days.len(), 8);
        assert_eq!(series.build_from, Some(date(6)));
        assert_eq!(series.build_from_index(), Some(5));
        assert_eq!(series.last_checkpoint, Some(cp("b")));
        assert_eq!(series.read_position, Some(11));
    }

    #[test]
    fn test_correction_pulls_build_from_back() {
        let mut entries = batch_of(1..=5, "a");
        entries.push(SourceEntry::Clear(cp("a")));
        entries.push(day(3, 999));
        entries.extend(batch_of(6..=8, "b"));

        let series = reconcile(entries, None).unwrap();
        assert_eq!(series.build_from, Some(date(3)));
        // The correction wins in the merged series.
        assert_eq!(series.days[2].daily_new_cases, 999);
    }

    #[test]
    fn test_identical_resubmission_does_not_move_build_from() {
        let mut entries = batch_of(1..=5, "a");
        entries.push(SourceEntry::Clear(cp("a")));
        entries.push(day(3, 3));
        entries.extend(batch_of(6..=8, "b"));

        let series = reconcile(entries, None).unwrap();
        assert_eq!(series.build_from, Some(date(6)));
    }

    #[test]
    fn test_nothing_handled_builds_from_first_day() {
        let entries = batch_of(1..=4, "a");
        let series = reconcile(entries, None).unwrap();
        assert_eq!(series.build_from, Some(date(1)));
        assert_eq!(series.build_from_index(), Some(0));
        assert_eq!(series.max_index(), Some(3));
    }

    #[test]
    fn test_progress_mark_handles_prefix_of_batch() {
        let mut entries = batch_of(1..=6, "a");
        entries.push(SourceEntry::ProgressMark {
            checkpoint: cp("a"),
            handled_index: 3,
        });

        let series = reconcile(entries, None).unwrap();
        // Indices 0..=3 handled, so the build resumes at index 4.
        assert_eq!(series.build_from, Some(date(5)));
    }

    #[test]
    fn test_clear_overrides_older_mark() {
        let mut entries = batch_of(1..=3, "a");
        entries.push(SourceEntry::ProgressMark {
            checkpoint: cp("a"),
            handled_index: 0,
        });
        entries.push(SourceEntry::Clear(cp("a")));

        let series = reconcile(entries, None).unwrap();
        assert_eq!(series.build_from, Some(date(4)));
    }

    #[test]
    fn test_days_after_last_checkpoint_are_ignored() {
        let mut entries = batch_of(1..=3, "a");
        entries.push(day(4, 4));

        let series = reconcile(entries, None).unwrap();
        assert_eq!(series.days.len(), 3);
        assert_eq!(series.last_checkpoint, Some(cp("a")));
    }

    #[test]
    fn test_unknown_clear_has_no_effect() {
        let mut entries = batch_of(1..=3, "a");
        entries.push(SourceEntry::Clear(cp("zzz")));

        let series = reconcile(entries, None).unwrap();
        assert_eq!(series.build_from, Some(date(1)));
    }

    #[test]
    fn test_gap_across_batches_is_contiguity_error() {
        let mut entries = batch_of(1..=3, "a");
        entries.extend(batch_of(5..=6, "b"));

        assert!(matches!(
            reconcile(entries, None),
            Err(CobsError::Contiguity)
        ));
    }

    #[test]
    fn test_no_batches_gives_empty_series() {
        let series = reconcile(vec![day(1, 1)], Some(1)).unwrap();
        assert!(series.days.is_empty());
        assert_eq!(series.build_from, None);
        assert_eq!(series.max_index(), None);
    }

    #[test]
    fn test_partition_batches() {
        let batch = |id: &str| SourceBatch {
            checkpoint: cp(id),
            days: Vec::new(),
        };
        let partition = partition_batches(
            vec![batch("a"), batch("b"), batch("c"), batch("d")],
            Some(&cp("a")),
            Some((&cp("c"), 7)),
        );

        let ids = |batches: &[SourceBatch]| {
            batches
                .iter()
                .map(|b| b.checkpoint.as_str().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&partition.handled), vec!["a"]);
        assert_eq!(ids(&partition.marked), vec!["b", "c"]);
        assert_eq!(ids(&partition.unhandled), vec!["d"]);
        assert_eq!(partition.handled_index, Some(7));
    }
}
