//! Build phases

use std::fmt;

/// Orchestrator state
///
/// `Populating` through `Committed` repeat once per queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    Registered,
    Populating,
    ScenarioGenerating,
    ScenarioRunning,
    ExtractingDays,
    ExtractingAggregates,
    Committed,
    Done,
    Aborted,
}

impl BuildPhase {
    /// Kebab-case name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Registered => "registered",
            Self::Populating => "populating",
            Self::ScenarioGenerating => "scenario-generating",
            Self::ScenarioRunning => "scenario-running",
            Self::ExtractingDays => "extracting-days",
            Self::ExtractingAggregates => "extracting-aggregates",
            Self::Committed => "committed",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Whether the build has finished, successfully or not
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
