//! Build summary and reporting

use crate::domain::BuildId;
use std::time::Duration;

/// How a build ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Every planned job was committed
    Completed,
    /// No jobs were needed
    UpToDate,
    /// A shutdown request stopped the build between jobs
    Interrupted,
    /// Jobs were computed but nothing was committed
    DryRun,
}

impl BuildOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::UpToDate => "up-to-date",
            Self::Interrupted => "interrupted",
            Self::DryRun => "dry-run",
        }
    }
}

/// Summary of a build invocation
#[derive(Debug, Clone)]
pub struct BuildSummary {
    /// Registered build, if the build committed anything
    pub build_id: Option<BuildId>,

    pub outcome: BuildOutcome,

    /// Number of validated source days
    pub source_days: usize,

    /// Number of queued jobs
    pub jobs_planned: usize,

    /// Number of jobs computed
    pub jobs_built: usize,

    /// Number of jobs durably committed
    pub jobs_committed: usize,

    pub build_from_index: i32,

    pub max_index: i32,

    /// Whether the build consumed the source up to its newest checkpoint
    pub drained: bool,

    /// Duration of the build
    pub duration: Duration,
}

impl BuildSummary {
    /// Create a new empty summary
    pub fn new(outcome: BuildOutcome) -> Self {
        Self {
            build_id: None,
            outcome,
            source_days: 0,
            jobs_planned: 0,
            jobs_built: 0,
            jobs_committed: 0,
            build_from_index: 0,
            max_index: -1,
            drained: true,
            duration: Duration::from_secs(0),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Jobs planned but not committed
    pub fn jobs_remaining(&self) -> usize {
        self.jobs_planned.saturating_sub(self.jobs_committed)
    }

    /// Whether the build left nothing for a later run
    pub fn is_complete(&self) -> bool {
        matches!(
            self.outcome,
            BuildOutcome::Completed | BuildOutcome::UpToDate
        ) && self.drained
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            build_id = ?self.build_id.map(|id| id.to_string()),
            outcome = self.outcome.as_str(),
            source_days = self.source_days,
            jobs_planned = self.jobs_planned,
            jobs_built = self.jobs_built,
            jobs_committed = self.jobs_committed,
            build_from_index = self.build_from_index,
            max_index = self.max_index,
            drained = self.drained,
            duration_ms = self.duration.as_millis() as u64,
            "Build finished"
        );

        if self.jobs_remaining() > 0 && self.outcome != BuildOutcome::DryRun {
            tracing::warn!(
                remaining = self.jobs_remaining(),
                "Build stopped before committing every planned job; the next build resumes from the last progress mark"
            );
        }
    }
}
