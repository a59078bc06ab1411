//! Build queue orchestrator
//!
//! Reads the source, plans the job queue and runs every job through rolling
//! population, scenario runs and bound extraction before handing it to the sink.
//! Supersession is polled before every phase transition; a shutdown request is
//! honoured only between jobs, so a job is never left half committed.

use super::job::BuildJob;
use super::phase::BuildPhase;
use super::queue::{check_minimum_data, plan_queue, QueueMode};
use super::summary::{BuildOutcome, BuildSummary};
use crate::adapters::store::{CommitContext, ResultsSink, SeriesSource};
use crate::core::bounds::{extract_aggregates, extract_results_days};
use crate::core::scenario::{ScenarioEngine, ScenarioRun};
use crate::core::timeline::populate_rolling;
use crate::domain::{BuildId, CobsError, RawDay, Result};
use crate::{log_build_phase, log_job_committed};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Per-invocation build options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Compute every job but register and commit nothing
    pub dry_run: bool,
    /// Cap on jobs per invocation; 0 means no cap
    pub max_jobs: usize,
}

/// Runs one build invocation
pub struct BuildOrchestrator {
    source: Arc<dyn SeriesSource + Send + Sync>,
    sink: Arc<dyn ResultsSink + Send + Sync>,
    engine: Arc<dyn ScenarioEngine>,
    options: BuildOptions,
    shutdown_signal: Option<watch::Receiver<bool>>,
    phase: BuildPhase,
    registered: bool,
}

impl BuildOrchestrator {
    /// Create a new orchestrator
    pub fn new(
        source: Arc<dyn SeriesSource + Send + Sync>,
        sink: Arc<dyn ResultsSink + Send + Sync>,
        engine: Arc<dyn ScenarioEngine>,
        options: BuildOptions,
    ) -> Self {
        Self {
            source,
            sink,
            engine,
            options,
            shutdown_signal: None,
            phase: BuildPhase::Idle,
            registered: false,
        }
    }

    /// Stop between jobs once `signal` turns true
    pub fn with_shutdown_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Current phase
    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Execute the build
    ///
    /// Jobs committed before an error stay committed; the next build resumes after them.
    /// An orchestrator runs once; executing it again is an `Engine` error.
    pub async fn execute(&mut self) -> Result<BuildSummary> {
        if self.phase.is_terminal() {
            return Err(CobsError::Engine(format!(
                "build already finished in phase {}",
                self.phase
            )));
        }
        let start_time = Instant::now();

        match self.run().await {
            Ok(summary) => {
                self.phase = BuildPhase::Done;
                let summary = summary.with_duration(start_time.elapsed());
                summary.log_summary();
                Ok(summary)
            }
            Err(e) => {
                let failed_in = self.phase;
                self.phase = BuildPhase::Aborted;
                tracing::error!(
                    phase = %failed_in,
                    error = %e,
                    duration_ms = start_time.elapsed().as_millis() as u64,
                    "Build aborted"
                );
                Err(e)
            }
        }
    }

    async fn run(&mut self) -> Result<BuildSummary> {
        tracing::info!(dry_run = self.options.dry_run, "Starting build");

        let series = self.source.read_series().await?;
        check_minimum_data(series.days.len(), self.engine.minimum_lags())?;

        let mode = if self.sink.supports_resume() {
            QueueMode::Incremental
        } else {
            QueueMode::OneShot
        };
        let plan = plan_queue(&series, self.engine.max_lag(), mode, self.options.max_jobs);

        tracing::info!(
            days = series.days.len(),
            build_from_index = plan.build_from_index,
            max_index = plan.max_index,
            jobs = plan.len(),
            drained = plan.drained,
            "Build queue planned"
        );

        let mut summary = BuildSummary::new(BuildOutcome::Completed);
        summary.source_days = series.days.len();
        summary.jobs_planned = plan.len();
        summary.build_from_index = plan.build_from_index;
        summary.max_index = plan.max_index;
        summary.drained = plan.drained;

        if self.options.dry_run {
            summary.outcome = BuildOutcome::DryRun;
        } else {
            let build_id = BuildId::new();
            self.sink.register_build(build_id).await?;
            self.registered = true;
            summary.build_id = Some(build_id);
            tracing::info!(build_id = %build_id, "Build registered");
        }
        self.transition(BuildPhase::Registered, plan.build_from_index)
            .await?;

        if plan.is_empty() {
            tracing::info!("Results are up to date");
            summary.outcome = BuildOutcome::UpToDate;
            return Ok(summary);
        }

        let context = CommitContext {
            checkpoint: series.last_checkpoint.clone(),
            read_position: series.read_position,
            build_from_index: plan.build_from_index,
            max_index: plan.max_index,
            drained: plan.drained,
        };

        for (n, &index) in plan.indices.iter().enumerate() {
            if self.shutdown_requested() {
                tracing::warn!(
                    timeline_index = index,
                    committed = summary.jobs_committed,
                    "Shutdown requested, stopping before next job"
                );
                summary.outcome = BuildOutcome::Interrupted;
                summary.drained = false;
                break;
            }

            let job = self.build_job(index, &series.days).await?;
            summary.jobs_built += 1;

            if self.options.dry_run {
                tracing::info!(
                    timeline_index = index,
                    rows = job.results_days.len(),
                    "Dry run: job built, not committed"
                );
                continue;
            }

            self.transition(BuildPhase::Committed, index).await?;
            let is_last = n + 1 == plan.len();
            self.sink.commit_job(&job, &context, is_last).await?;
            summary.jobs_committed += 1;
            log_job_committed!(index, summary.jobs_committed, plan.len());
        }

        Ok(summary)
    }

    /// Runs every compute phase for one timeline index
    async fn build_job(&mut self, index: i32, days: &[RawDay]) -> Result<BuildJob> {
        let end = usize::try_from(index)
            .ok()
            .filter(|&end| end < days.len())
            .ok_or_else(|| {
                CobsError::Engine(format!("job index {index} outside {}-day series", days.len()))
            })?;

        self.transition(BuildPhase::Populating, index).await?;
        let rolling = populate_rolling(&days[..=end]);

        self.transition(BuildPhase::ScenarioGenerating, index).await?;
        let scenarios = self.engine.generate_parameters()?;
        if scenarios.is_empty() {
            return Err(CobsError::Engine(
                "scenario engine generated no scenarios".to_string(),
            ));
        }

        self.transition(BuildPhase::ScenarioRunning, index).await?;
        let runs = scenarios
            .iter()
            .map(|scenario| self.engine.run(scenario, &rolling))
            .collect::<Result<Vec<ScenarioRun>>>()?;

        self.transition(BuildPhase::ExtractingDays, index).await?;
        let results_days = extract_results_days(&runs, &rolling, index)?;

        self.transition(BuildPhase::ExtractingAggregates, index)
            .await?;
        let aggregates = extract_aggregates(index, &runs)?;

        Ok(BuildJob {
            time_series_index: index,
            time_series_day: days[end].date,
            results_days,
            aggregates,
        })
    }

    /// Polls for supersession, then moves to `phase`
    async fn transition(&mut self, phase: BuildPhase, index: i32) -> Result<()> {
        if self.registered && self.sink.is_superseded().await? {
            tracing::warn!(
                from = %self.phase,
                to = %phase,
                "Build superseded by a newer build"
            );
            return Err(CobsError::Superseded);
        }

        self.phase = phase;
        log_build_phase!(phase, index);
        Ok(())
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|signal| *signal.borrow())
    }
}
