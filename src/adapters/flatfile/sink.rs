//! Flat-file results sink
//!
//! Each commit overwrites `ResultsData.txt` and `Aggregates.txt` in the results
//! directory. Both files are staged next to their targets and renamed only after
//! both writes succeed, so a failed commit leaves the previous pair in place.

use super::format::{aggregates_line, results_line};
use crate::adapters::store::{CommitContext, ResultsSink};
use crate::core::build::BuildJob;
use crate::domain::{BuildId, CobsError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// File name of the per-day results
pub const RESULTS_FILE: &str = "ResultsData.txt";

/// File name of the aggregates line
pub const AGGREGATES_FILE: &str = "Aggregates.txt";

const STAGING_SUFFIX: &str = ".tmp";

/// Writes build results as two flat files
pub struct FlatFileSink {
    results_dir: PathBuf,
}

impl FlatFileSink {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_path(&self) -> PathBuf {
        self.results_dir.join(RESULTS_FILE)
    }

    pub fn aggregates_path(&self) -> PathBuf {
        self.results_dir.join(AGGREGATES_FILE)
    }
}

#[async_trait]
impl ResultsSink for FlatFileSink {
    fn supports_resume(&self) -> bool {
        false
    }

    async fn register_build(&self, build_id: BuildId) -> Result<()> {
        tracing::debug!(build_id = %build_id, dir = %self.results_dir.display(), "Flat-file build registered");
        Ok(())
    }

    async fn is_superseded(&self) -> Result<bool> {
        Ok(false)
    }

    async fn commit_job(
        &self,
        job: &BuildJob,
        _context: &CommitContext,
        _is_last: bool,
    ) -> Result<()> {
        tokio::fs::create_dir_all(&self.results_dir)
            .await
            .map_err(|e| access(&self.results_dir, e))?;

        let mut results = String::new();
        for day in &job.results_days {
            results.push_str(&results_line(day));
            results.push('\n');
        }
        let aggregates = format!("{}\n", aggregates_line(&job.aggregates));

        let results_path = self.results_path();
        let aggregates_path = self.aggregates_path();
        let results_staged = staged(&results_path);
        let aggregates_staged = staged(&aggregates_path);

        write_staged(&results_staged, &results).await?;
        if let Err(e) = write_staged(&aggregates_staged, &aggregates).await {
            let _ = tokio::fs::remove_file(&results_staged).await;
            return Err(e);
        }

        tokio::fs::rename(&results_staged, &results_path)
            .await
            .map_err(|e| access(&results_path, e))?;
        tokio::fs::rename(&aggregates_staged, &aggregates_path)
            .await
            .map_err(|e| access(&aggregates_path, e))?;

        tracing::info!(
            job = job.time_series_index,
            rows = job.results_days.len(),
            dir = %self.results_dir.display(),
            "Wrote flat-file results"
        );

        Ok(())
    }
}

fn staged(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

async fn write_staged(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| access(path, e))
}

fn access(path: &Path, err: std::io::Error) -> CobsError {
    CobsError::Access(format!("{}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Aggregates, Bounds, Provenance, ResultsDay};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn job(index: i32) -> BuildJob {
        let date = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();
        BuildJob {
            time_series_index: index,
            time_series_day: date,
            results_days: (-1..=index)
                .map(|i| ResultsDay {
                    timeline_index: i,
                    date,
                    observed: None,
                    provenance: Bounds::new(Provenance::RunUp, Provenance::RunUp, Provenance::RunUp),
                    actual_daily_new_cases: Bounds::new(1, 2, 3),
                    projected: None,
                })
                .collect(),
            aggregates: Aggregates::default(),
        }
    }

    fn context() -> CommitContext {
        CommitContext {
            checkpoint: None,
            read_position: None,
            build_from_index: 0,
            max_index: 1,
            drained: true,
        }
    }

    #[tokio::test]
    async fn test_commit_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let sink = FlatFileSink::new(dir.path().join("CObsResults"));

        sink.commit_job(&job(1), &context(), true).await.unwrap();

        let results = tokio::fs::read_to_string(sink.results_path()).await.unwrap();
        assert_eq!(results.lines().count(), 3);
        assert!(results.starts_with("-1,2020-10-01,"));

        let aggregates = tokio::fs::read_to_string(sink.aggregates_path()).await.unwrap();
        assert_eq!(aggregates.trim_end().split(',').count(), 13);

        assert!(!staged(&sink.results_path()).exists());
        assert!(!staged(&sink.aggregates_path()).exists());
    }

    #[tokio::test]
    async fn test_commit_overwrites_previous_results() {
        let dir = TempDir::new().unwrap();
        let sink = FlatFileSink::new(dir.path());

        sink.commit_job(&job(3), &context(), true).await.unwrap();
        sink.commit_job(&job(0), &context(), true).await.unwrap();

        let results = tokio::fs::read_to_string(sink.results_path()).await.unwrap();
        assert_eq!(results.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_flat_file_sink_is_not_resumable() {
        let sink = FlatFileSink::new("unused");
        assert!(!sink.supports_resume());
        sink.register_build(BuildId::new()).await.unwrap();
        assert!(!sink.is_superseded().await.unwrap());
    }
}
