//! Flat-file series source

use crate::adapters::store::SeriesSource;
use crate::core::source::SourceSeries;
use crate::core::timeline::{seed_timeline, validate_row};
use crate::domain::{CobsError, RawDay, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Reads a comma-separated source file
///
/// Each non-blank line is one day: date, cases, tests, positivity, mortality,
/// hospitalizations. A flat file has no checkpoints, so every build republishes from
/// the first day.
pub struct FlatFileSource {
    path: PathBuf,
}

impl FlatFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SeriesSource for FlatFileSource {
    async fn read_series(&self) -> Result<SourceSeries> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CobsError::Access(format!("{}: {e}", self.path.display())))?;

        let mut days = parse_rows(&content)?;
        if !seed_timeline(&mut days) {
            return Err(CobsError::Contiguity);
        }

        tracing::debug!(
            path = %self.path.display(),
            days = days.len(),
            "Read flat source file"
        );

        Ok(SourceSeries {
            build_from: days.first().map(|day| day.date),
            days,
            last_checkpoint: None,
            read_position: None,
        })
    }
}

/// Validates every row of a flat source file
///
/// Blank lines are skipped but still count towards the line ordinal.
pub fn parse_rows(content: &str) -> Result<Vec<RawDay>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let fields: Vec<&str> = line.split(',').collect();
            validate_row(&fields).map_err(|violation| CobsError::RowValidation {
                ordinal: i + 1,
                violation,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RowViolation;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    async fn source_with(content: &str) -> (TempDir, FlatFileSource) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("SourceData.txt");
        tokio::fs::write(&path, content).await.unwrap();
        (dir, FlatFileSource::new(path))
    }

    #[tokio::test]
    async fn test_reads_and_seeds_rows() {
        let (_dir, source) = source_with(
            "2020-10-02,20,400,5,1,2\n\n2020-10-01, 10 ,300,4.5,0,1\n2020-10-03,30,500,6,2,3\n",
        )
        .await;

        let series = source.read_series().await.unwrap();
        assert_eq!(series.days.len(), 3);
        assert_eq!(series.days[0].daily_new_cases, 10);
        assert_eq!(series.max_index(), Some(2));
        assert_eq!(series.build_from_index(), Some(0));
        assert!(series.last_checkpoint.is_none());
        assert!(series.read_position.is_none());
    }

    #[tokio::test]
    async fn test_row_error_reports_line_number() {
        let (_dir, source) =
            source_with("2020-10-01,10,300,4.5,0,1\n\n2020-10-02,10,-300,4.5,0,1\n").await;

        let err = source.read_series().await.unwrap_err();
        match err {
            CobsError::RowValidation { ordinal, violation } => {
                assert_eq!(ordinal, 3);
                assert_eq!(violation, RowViolation::TestsNegative);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_gap_is_contiguity_error() {
        let (_dir, source) = source_with("2020-10-01,1,1,1,1,1\n2020-10-03,1,1,1,1,1\n").await;
        assert!(matches!(
            source.read_series().await,
            Err(CobsError::Contiguity)
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_access_error() {
        let source = FlatFileSource::new("/nonexistent/cobs/SourceData.txt");
        assert!(matches!(
            source.read_series().await,
            Err(CobsError::Access(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_file_is_empty_series() {
        let (_dir, source) = source_with("\n\n").await;
        let series = source.read_series().await.unwrap();
        assert!(series.days.is_empty());
        assert!(series.build_from.is_none());
    }

    #[test]
    fn test_parse_rows_dates() {
        let days = parse_rows("2020-10-01,1,2,3,4,5").unwrap();
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2020, 10, 1).unwrap());
        assert_eq!(days[0].hospitalizations, 5);
    }
}
