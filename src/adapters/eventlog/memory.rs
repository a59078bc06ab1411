//! In-memory log store

use super::store::{ExpectedPosition, LogStore, NewEvent, RecordedEvent};
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Log store held in process memory
///
/// Shares the append semantics of the file-backed store; used by tests.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    streams: Mutex<HashMap<String, Vec<RecordedEvent>>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn read_stream(&self, stream: &str) -> Result<Option<Vec<RecordedEvent>>> {
        Ok(self.streams.lock().await.get(stream).cloned())
    }

    async fn read_last(&self, stream: &str) -> Result<Option<RecordedEvent>> {
        Ok(self
            .streams
            .lock()
            .await
            .get(stream)
            .and_then(|events| events.last().cloned()))
    }

    async fn append(
        &self,
        stream: &str,
        expected: ExpectedPosition,
        events: Vec<NewEvent>,
    ) -> Result<u64> {
        let mut streams = self.streams.lock().await;

        let current = streams
            .get(stream)
            .and_then(|events| events.last())
            .map(|event| event.position);
        expected.check(stream, current)?;

        if events.is_empty() {
            return Ok(current.unwrap_or_default());
        }

        let recorded = streams.entry(stream.to_string()).or_default();
        let mut next = current.map_or(0, |p| p + 1);
        for event in events {
            recorded.push(RecordedEvent::record(event, next));
            next += 1;
        }

        Ok(next.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CobsError;
    use serde_json::json;

    fn event(kind: &str) -> NewEvent {
        NewEvent::new(kind, &json!({})).unwrap()
    }

    #[tokio::test]
    async fn test_append_assigns_dense_positions() {
        let store = MemoryLogStore::new();
        assert!(store.read_stream("s").await.unwrap().is_none());

        let last = store
            .append("s", ExpectedPosition::NoStream, vec![event("a"), event("b")])
            .await
            .unwrap();
        assert_eq!(last, 1);

        let last = store
            .append("s", ExpectedPosition::At(1), vec![event("c")])
            .await
            .unwrap();
        assert_eq!(last, 2);

        let events = store.read_stream("s").await.unwrap().unwrap();
        let positions: Vec<_> = events.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(store.read_last("s").await.unwrap().unwrap().event_type, "c");
    }

    #[tokio::test]
    async fn test_conflicting_append_writes_nothing() {
        let store = MemoryLogStore::new();
        store
            .append("s", ExpectedPosition::Any, vec![event("a")])
            .await
            .unwrap();

        let result = store
            .append("s", ExpectedPosition::At(5), vec![event("b")])
            .await;
        assert!(matches!(result, Err(CobsError::CommitConflict { .. })));
        assert_eq!(store.read_stream("s").await.unwrap().unwrap().len(), 1);
    }
}
