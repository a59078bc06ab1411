//! Scenario engine contract and the recorded-output engine

pub mod engine;
pub mod recorded;

pub use engine::{
    min_run_up_index, ScenarioAggregates, ScenarioEngine, ScenarioOutcome, ScenarioRun,
};
pub use recorded::{RecordedScenario, RecordedScenarioEngine};
