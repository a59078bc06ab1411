//! Minimum-data gate and job queue planning

use crate::core::source::SourceSeries;
use crate::domain::{CobsError, Result};

/// How the results sink publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMode {
    /// One job per index from the build-from point, resumable per job
    Incremental,
    /// A single job at the newest index
    OneShot,
}

/// The indices a build will process, in ascending order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    pub indices: Vec<i32>,
    pub build_from_index: i32,
    pub max_index: i32,
    /// False when a job cap left later indices for the next build
    pub drained: bool,
}

impl BuildPlan {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }
}

/// Fails unless there are more days than the largest engine lag
///
/// # Examples
///
/// ```
/// use cobs::core::build::check_minimum_data;
///
/// assert!(check_minimum_data(10, &[3, 10]).is_err());
/// assert!(check_minimum_data(11, &[3, 10]).is_ok());
/// ```
pub fn check_minimum_data(available: usize, lags: &[u32]) -> Result<()> {
    let max_lag = lags.iter().copied().max().unwrap_or(0) as usize;
    if available <= max_lag {
        return Err(CobsError::InsufficientData {
            available,
            minimum: max_lag + 1,
        });
    }
    Ok(())
}

/// Plans the job queue for a reconciled series
///
/// Incremental plans cover `max(build_from_index, max_lag) ..= max_index`, cut to
/// `max_jobs` when it is non-zero. One-shot plans hold only `max_index`. An empty
/// series plans nothing.
pub fn plan_queue(
    series: &SourceSeries,
    max_lag: u32,
    mode: QueueMode,
    max_jobs: usize,
) -> BuildPlan {
    let Some(max_index) = series.max_index() else {
        return BuildPlan {
            indices: Vec::new(),
            build_from_index: 0,
            max_index: -1,
            drained: true,
        };
    };
    let build_from_index = series.build_from_index().unwrap_or(0);

    let mut indices: Vec<i32> = match mode {
        QueueMode::OneShot => vec![max_index],
        QueueMode::Incremental => {
            let first = build_from_index.max(max_lag as i32);
            (first..=max_index).collect()
        }
    };

    let mut drained = true;
    if max_jobs > 0 && indices.len() > max_jobs {
        indices.truncate(max_jobs);
        drained = false;
    }

    BuildPlan {
        indices,
        build_from_index,
        max_index,
        drained,
    }
}
