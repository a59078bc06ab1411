//! Domain identifier types
//!
//! Newtype wrappers keep build, checkpoint and scenario identifiers from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of one build invocation
///
/// Assigned when the build registers itself on the results stream; every event the
/// build commits carries it.
///
/// # Examples
///
/// ```
/// use cobs::domain::ids::BuildId;
///
/// let a = BuildId::new();
/// let b = BuildId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(Uuid);

impl BuildId {
    /// Creates a fresh random build id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing uuid
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying uuid
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for BuildId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a checkpoint event in the source stream
///
/// Opaque to everything but the reconciliation pass, which only compares ids for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckpointId(String);

impl CheckpointId {
    /// Creates a checkpoint id, rejecting blank values
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Checkpoint ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Checkpoint id for a source event id
    pub fn from_event_id(id: Uuid) -> Self {
        Self(id.to_string())
    }

    /// Returns the checkpoint id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CheckpointId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of one scenario produced by the scenario engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScenarioId(String);

impl ScenarioId {
    /// Creates a scenario id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the scenario id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_id_rejects_blank() {
        assert!(CheckpointId::new("").is_err());
        assert!(CheckpointId::new("   ").is_err());
        assert_eq!(CheckpointId::new("cp-1").unwrap().as_str(), "cp-1");
    }

    #[test]
    fn test_checkpoint_id_from_event_id() {
        let id = Uuid::new_v4();
        assert_eq!(CheckpointId::from_event_id(id).as_str(), id.to_string());
    }

    #[test]
    fn test_build_id_serializes_as_plain_uuid() {
        let id = BuildId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
        let back: BuildId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
