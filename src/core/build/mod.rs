//! Build queue orchestration

pub mod job;
pub mod orchestrator;
pub mod phase;
pub mod queue;
pub mod summary;

pub use job::BuildJob;
pub use orchestrator::{BuildOptions, BuildOrchestrator};
pub use phase::BuildPhase;
pub use queue::{check_minimum_data, plan_queue, BuildPlan, QueueMode};
pub use summary::{BuildOutcome, BuildSummary};
