//! Event-log series source

use super::events::{
    source_stream, CheckpointClearPayload, CheckpointProgressMarkPayload, SourceDayPayload,
    CHECKPOINT, CHECKPOINT_CLEAR, CHECKPOINT_PROGRESS_MARK, SOURCE_DAY_RECEIVED,
};
use super::store::{LogStore, RecordedEvent};
use crate::adapters::store::SeriesSource;
use crate::core::source::{reconcile, SourceEntry, SourceSeries};
use crate::core::timeline::validate_event;
use crate::domain::{CheckpointId, CobsError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Reads the `<stream>-source` stream of a log store
pub struct EventLogSource {
    store: Arc<dyn LogStore>,
    stream: String,
}

impl EventLogSource {
    pub fn new(store: Arc<dyn LogStore>, stream: impl Into<String>) -> Self {
        Self {
            store,
            stream: stream.into(),
        }
    }
}

#[async_trait]
impl SeriesSource for EventLogSource {
    async fn read_series(&self) -> Result<SourceSeries> {
        let stream = source_stream(&self.stream);
        let events = self
            .store
            .read_stream(&stream)
            .await?
            .filter(|events| !events.is_empty())
            .ok_or_else(|| CobsError::Access("source stream is empty".to_string()))?;

        let read_position = events.last().map(|event| event.position);

        let mut entries = Vec::with_capacity(events.len());
        for (i, event) in events.iter().enumerate() {
            if let Some(entry) = decode_entry(i + 1, event)? {
                entries.push(entry);
            }
        }

        tracing::debug!(
            stream = %stream,
            events = events.len(),
            read_position = ?read_position,
            "Read source stream"
        );

        reconcile(entries, read_position)
    }
}

/// Decodes one source event; unrelated event types yield `None`
fn decode_entry(ordinal: usize, event: &RecordedEvent) -> Result<Option<SourceEntry>> {
    let entry = match event.event_type.as_str() {
        SOURCE_DAY_RECEIVED => {
            let payload: SourceDayPayload = decode(ordinal, event)?;
            let day = validate_event(&payload.as_unchecked())
                .map_err(|violation| CobsError::RowValidation { ordinal, violation })?;
            SourceEntry::Day(day)
        }
        CHECKPOINT => SourceEntry::Checkpoint(CheckpointId::from_event_id(event.event_id)),
        CHECKPOINT_PROGRESS_MARK => {
            let payload: CheckpointProgressMarkPayload = decode(ordinal, event)?;
            SourceEntry::ProgressMark {
                checkpoint: checkpoint_id(ordinal, payload.checkpoint_id)?,
                handled_index: payload.handled_index_cutoff,
            }
        }
        CHECKPOINT_CLEAR => {
            let payload: CheckpointClearPayload = decode(ordinal, event)?;
            SourceEntry::Clear(checkpoint_id(ordinal, payload.checkpoint_id)?)
        }
        _ => return Ok(None),
    };
    Ok(Some(entry))
}

fn decode<T: DeserializeOwned>(ordinal: usize, event: &RecordedEvent) -> Result<T> {
    serde_json::from_value(event.data.clone()).map_err(|e| CobsError::Decode {
        ordinal,
        message: format!("{}: {e}", event.event_type),
    })
}

fn checkpoint_id(ordinal: usize, id: String) -> Result<CheckpointId> {
    CheckpointId::new(id).map_err(|message| CobsError::Decode { ordinal, message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::eventlog::ingest::append_batch;
    use crate::adapters::eventlog::store::{ExpectedPosition, NewEvent};
    use crate::adapters::eventlog::MemoryLogStore;
    use crate::domain::{RawDay, RowViolation};
    use chrono::NaiveDate;
    use serde_json::json;

    fn day(d: u32) -> RawDay {
        RawDay::new(NaiveDate::from_ymd_opt(2020, 10, d).unwrap(), d, 10, 1.0, 0, 0)
    }

    #[tokio::test]
    async fn test_missing_or_empty_stream_is_access_error() {
        let store = Arc::new(MemoryLogStore::new());
        let source = EventLogSource::new(store, "cobs");
        match source.read_series().await {
            Err(CobsError::Access(message)) => assert_eq!(message, "source stream is empty"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reads_checkpointed_batch() {
        let store = Arc::new(MemoryLogStore::new());
        let checkpoint = append_batch(store.as_ref(), "cobs", &[day(1), day(2), day(3)])
            .await
            .unwrap();

        let source = EventLogSource::new(store, "cobs");
        let series = source.read_series().await.unwrap();
        assert_eq!(series.days.len(), 3);
        assert_eq!(series.last_checkpoint, Some(checkpoint));
        assert_eq!(series.read_position, Some(3));
    }

    #[tokio::test]
    async fn test_invalid_day_reports_event_ordinal() {
        let store = Arc::new(MemoryLogStore::new());
        let bad = json!({
            "date": "2020-10-02", "daily_new_cases": 1, "tests": -4,
            "positivity": 1.0, "mortality": 0, "hospitalizations": 0
        });
        let events = vec![
            NewEvent::new(SOURCE_DAY_RECEIVED, &SourceDayPayload::from(&day(1))).unwrap(),
            NewEvent::new(SOURCE_DAY_RECEIVED, &bad).unwrap(),
        ];
        store
            .append("cobs-source", ExpectedPosition::Any, events)
            .await
            .unwrap();

        let source = EventLogSource::new(store, "cobs");
        match source.read_series().await {
            Err(CobsError::RowValidation { ordinal, violation }) => {
                assert_eq!(ordinal, 2);
                assert_eq!(violation, RowViolation::TestsNegative);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_payload_is_decode_error() {
        let store = Arc::new(MemoryLogStore::new());
        let events = vec![NewEvent::new(SOURCE_DAY_RECEIVED, &json!({ "date": 7 })).unwrap()];
        store
            .append("cobs-source", ExpectedPosition::Any, events)
            .await
            .unwrap();

        let source = EventLogSource::new(store, "cobs");
        assert!(matches!(
            source.read_series().await,
            Err(CobsError::Decode { ordinal: 1, .. })
        ));
    }
}
