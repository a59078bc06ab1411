//! Source ingestion

use super::events::{
    source_stream, CheckpointPayload, SourceDayPayload, CHECKPOINT, SOURCE_DAY_RECEIVED,
};
use super::store::{ExpectedPosition, LogStore, NewEvent};
use crate::domain::{CheckpointId, RawDay, Result};

/// Appends days as one checkpointed batch
///
/// Writes one `source-day-received` event per day followed by a `checkpoint`, in a
/// single append. Returns the new checkpoint's id.
pub async fn append_batch(
    store: &dyn LogStore,
    stream: &str,
    days: &[RawDay],
) -> Result<CheckpointId> {
    let mut events = days
        .iter()
        .map(|day| NewEvent::new(SOURCE_DAY_RECEIVED, &SourceDayPayload::from(day)))
        .collect::<Result<Vec<_>>>()?;

    let checkpoint = NewEvent::new(CHECKPOINT, &CheckpointPayload { days: days.len() })?;
    let checkpoint_id = CheckpointId::from_event_id(checkpoint.event_id);
    events.push(checkpoint);

    let stream = source_stream(stream);
    let position = store.append(&stream, ExpectedPosition::Any, events).await?;

    tracing::info!(
        stream = %stream,
        days = days.len(),
        checkpoint = %checkpoint_id,
        position,
        "Ingested source batch"
    );

    Ok(checkpoint_id)
}
