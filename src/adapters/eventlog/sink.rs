//! Event-log commit protocol
//!
//! `register_build` appends a `build-event` and remembers its position. Every later
//! results append expects the stream to still end at the position this build last
//! wrote, so any foreign append surfaces as supersession (when polled) or as a
//! commit conflict (when appending).

use super::events::{
    results_stream, source_stream, AggregatesPayload, BuildEventPayload, CheckpointClearPayload,
    CheckpointProgressMarkPayload, ResultsDayPayload, ResultsReadyPayload, AGGREGATES_RECEIVED,
    BUILD_EVENT, CHECKPOINT_CLEAR, CHECKPOINT_PROGRESS_MARK, RESULTS_DAY_RECEIVED, RESULTS_READY,
};
use super::store::{ExpectedPosition, LogStore, NewEvent};
use crate::adapters::store::{CommitContext, ResultsSink};
use crate::core::build::BuildJob;
use crate::domain::{BuildId, CobsError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy)]
struct Registration {
    build_id: BuildId,
    build_position: u64,
    expected: u64,
}

/// Publishes build results to the `<stream>-results` stream
pub struct EventLogSink {
    store: Arc<dyn LogStore>,
    stream: String,
    registration: Mutex<Option<Registration>>,
}

impl EventLogSink {
    pub fn new(store: Arc<dyn LogStore>, stream: impl Into<String>) -> Self {
        Self {
            store,
            stream: stream.into(),
            registration: Mutex::new(None),
        }
    }

    async fn registration(&self) -> Result<Registration> {
        self.registration
            .lock()
            .await
            .ok_or_else(|| CobsError::Access("build is not registered".to_string()))
    }

    async fn append_results(&self, events: Vec<NewEvent>) -> Result<u64> {
        let mut guard = self.registration.lock().await;
        let registration = guard
            .as_mut()
            .ok_or_else(|| CobsError::Access("build is not registered".to_string()))?;

        let position = self
            .store
            .append(
                &results_stream(&self.stream),
                ExpectedPosition::At(registration.expected),
                events,
            )
            .await?;
        registration.expected = position;
        Ok(position)
    }

    fn job_events(build_id: BuildId, job: &BuildJob) -> Result<Vec<NewEvent>> {
        let mut events = job
            .results_days
            .iter()
            .map(|day| {
                NewEvent::new(
                    RESULTS_DAY_RECEIVED,
                    &ResultsDayPayload {
                        build_id,
                        series_index: job.time_series_index,
                        series_day: job.time_series_day,
                        day: day.clone(),
                    },
                )
            })
            .collect::<Result<Vec<_>>>()?;

        events.push(NewEvent::new(
            AGGREGATES_RECEIVED,
            &AggregatesPayload {
                build_id,
                series_index: job.time_series_index,
                series_day: job.time_series_day,
                aggregates: job.aggregates,
            },
        )?);

        Ok(events)
    }

    /// Marks or clears the checkpoint on the source stream
    async fn mark_source(&self, job: &BuildJob, context: &CommitContext, clear: bool) -> Result<()> {
        let Some(checkpoint) = &context.checkpoint else {
            return Ok(());
        };

        let event = if clear {
            NewEvent::new(
                CHECKPOINT_CLEAR,
                &CheckpointClearPayload {
                    checkpoint_id: checkpoint.to_string(),
                },
            )?
        } else {
            NewEvent::new(
                CHECKPOINT_PROGRESS_MARK,
                &CheckpointProgressMarkPayload {
                    checkpoint_id: checkpoint.to_string(),
                    handled_index_cutoff: job.time_series_index,
                },
            )?
        };

        self.store
            .append(
                &source_stream(&self.stream),
                ExpectedPosition::Any,
                vec![event],
            )
            .await?;

        tracing::debug!(
            checkpoint = %checkpoint,
            cleared = clear,
            handled_index = job.time_series_index,
            "Source checkpoint updated"
        );
        Ok(())
    }
}

#[async_trait]
impl ResultsSink for EventLogSink {
    fn supports_resume(&self) -> bool {
        true
    }

    async fn register_build(&self, build_id: BuildId) -> Result<()> {
        let event = NewEvent::new(
            BUILD_EVENT,
            &BuildEventPayload {
                build_id,
                timestamp: Utc::now(),
            },
        )?;
        let position = self
            .store
            .append(&results_stream(&self.stream), ExpectedPosition::Any, vec![event])
            .await?;

        *self.registration.lock().await = Some(Registration {
            build_id,
            build_position: position,
            expected: position,
        });
        Ok(())
    }

    async fn is_superseded(&self) -> Result<bool> {
        let registration = self.registration().await?;
        let last = self.store.read_last(&results_stream(&self.stream)).await?;
        Ok(last.map_or(true, |event| event.position != registration.expected))
    }

    async fn commit_job(
        &self,
        job: &BuildJob,
        context: &CommitContext,
        is_last: bool,
    ) -> Result<()> {
        let registration = self.registration().await?;

        let events = Self::job_events(registration.build_id, job)?;
        let count = events.len();
        let position = self.append_results(events).await?;

        tracing::debug!(
            timeline_index = job.time_series_index,
            events = count,
            position,
            "Job results appended"
        );

        if !is_last {
            return self.mark_source(job, context, false).await;
        }

        let ready = NewEvent::new(
            RESULTS_READY,
            &ResultsReadyPayload {
                build_id: registration.build_id,
                build_position: registration.build_position,
                checkpoint_id: context.checkpoint.as_ref().map(ToString::to_string),
                read_position: context.read_position,
                min_index: job.min_index(),
                build_from_index: context.build_from_index,
                max_index: context.max_index,
            },
        )?;
        self.append_results(vec![ready]).await?;

        self.mark_source(job, context, context.drained).await
    }
}
