//! Append-only log store contract
//!
//! Streams are named sequences of events. Positions are 0-based and dense within a
//! stream. Appends carry an expected-position precondition; a mismatch rejects the
//! whole append.

use crate::domain::{CobsError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Precondition on the stream's last position at append time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedPosition {
    /// Append regardless of the stream's state
    Any,
    /// The stream must not exist yet
    NoStream,
    /// The stream's last event must be at this position
    At(u64),
}

impl fmt::Display for ExpectedPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::NoStream => f.write_str("no stream"),
            Self::At(position) => write!(f, "{position}"),
        }
    }
}

impl ExpectedPosition {
    /// Checks the precondition against a stream's current last position
    ///
    /// # Errors
    ///
    /// Returns `CobsError::CommitConflict` when the precondition does not hold.
    pub fn check(self, stream: &str, current: Option<u64>) -> Result<()> {
        let holds = match self {
            Self::Any => true,
            Self::NoStream => current.is_none(),
            Self::At(position) => current == Some(position),
        };

        if holds {
            return Ok(());
        }

        Err(CobsError::CommitConflict {
            stream: stream.to_string(),
            expected: self.to_string(),
            actual: current.map_or_else(|| "no stream".to_string(), |p| p.to_string()),
        })
    }
}

/// An event to append
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub data: serde_json::Value,
}

impl NewEvent {
    /// Serializes a payload into a new event with a fresh id
    pub fn new(event_type: &str, payload: &impl Serialize) -> Result<Self> {
        Ok(Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.to_string(),
            data: serde_json::to_value(payload)?,
        })
    }
}

/// An event as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub position: u64,
    pub event_id: Uuid,
    pub event_type: String,
    pub data: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl RecordedEvent {
    pub(crate) fn record(event: NewEvent, position: u64) -> Self {
        Self {
            position,
            event_id: event.event_id,
            event_type: event.event_type,
            data: event.data,
            recorded_at: Utc::now(),
        }
    }
}

/// Append-only log store
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Reads a whole stream forwards, or `None` if it does not exist
    async fn read_stream(&self, stream: &str) -> Result<Option<Vec<RecordedEvent>>>;

    /// Reads the last event of a stream, or `None` if it does not exist
    async fn read_last(&self, stream: &str) -> Result<Option<RecordedEvent>>;

    /// Appends events atomically, returning the position of the last one
    ///
    /// # Errors
    ///
    /// Returns `CobsError::CommitConflict` if `expected` does not hold.
    async fn append(
        &self,
        stream: &str,
        expected: ExpectedPosition,
        events: Vec<NewEvent>,
    ) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_position_check() {
        assert!(ExpectedPosition::Any.check("s", None).is_ok());
        assert!(ExpectedPosition::Any.check("s", Some(3)).is_ok());
        assert!(ExpectedPosition::NoStream.check("s", None).is_ok());
        assert!(ExpectedPosition::At(3).check("s", Some(3)).is_ok());

        let err = ExpectedPosition::At(3).check("s", Some(4)).unwrap_err();
        match err {
            CobsError::CommitConflict {
                stream,
                expected,
                actual,
            } => {
                assert_eq!(stream, "s");
                assert_eq!(expected, "3");
                assert_eq!(actual, "4");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(ExpectedPosition::NoStream.check("s", Some(0)).is_err());
        assert!(ExpectedPosition::At(0).check("s", None).is_err());
    }

    #[test]
    fn test_new_event_serializes_payload() {
        #[derive(Serialize)]
        struct Payload {
            checkpoint_id: &'static str,
        }

        let event = NewEvent::new("checkpoint-clear", &Payload { checkpoint_id: "a" }).unwrap();
        assert_eq!(event.event_type, "checkpoint-clear");
        assert_eq!(event.data["checkpoint_id"], "a");
    }
}
