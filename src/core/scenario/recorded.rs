//! Scenario engine backed by recorded engine output
//!
//! Replays per-scenario outcome series captured from a real propagation run. For a
//! series ending at index `i`, each scenario's outcomes are cut back to indices `<= i`
//! and its current growth rate and R-effective are taken from the last kept outcome.

use super::engine::{ScenarioAggregates, ScenarioEngine, ScenarioOutcome, ScenarioRun};
use crate::domain::{CobsError, Result, RollingDay, ScenarioId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One recorded scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedScenario {
    pub id: ScenarioId,
    pub outcomes: Vec<ScenarioOutcome>,
    #[serde(default)]
    pub aggregates: ScenarioAggregates,
}

#[derive(Debug, Deserialize)]
struct RecordedDocument {
    #[serde(default)]
    minimum_lags: Vec<u32>,
    scenarios: Vec<RecordedScenario>,
}

/// Replays recorded scenario output
#[derive(Debug, Clone)]
pub struct RecordedScenarioEngine {
    minimum_lags: Vec<u32>,
    scenarios: Vec<RecordedScenario>,
}

impl RecordedScenarioEngine {
    /// Creates an engine from in-memory scenarios
    ///
    /// # Errors
    ///
    /// Returns `CobsError::Engine` if there are no scenarios or an id repeats.
    pub fn new(minimum_lags: Vec<u32>, mut scenarios: Vec<RecordedScenario>) -> Result<Self> {
        if scenarios.is_empty() {
            return Err(CobsError::Engine(
                "recorded engine has no scenarios".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for scenario in &mut scenarios {
            if !seen.insert(scenario.id.clone()) {
                return Err(CobsError::Engine(format!(
                    "duplicate scenario id '{}'",
                    scenario.id
                )));
            }
            scenario.outcomes.sort_by_key(|o| o.timeline_index);
        }

        Ok(Self {
            minimum_lags,
            scenarios,
        })
    }

    /// Parses an engine from its JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let document: RecordedDocument = serde_json::from_str(json)?;
        Self::new(document.minimum_lags, document.scenarios)
    }

    /// Loads an engine from a JSON file
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            CobsError::Io(format!(
                "failed to read recorded scenarios '{}': {e}",
                path.display()
            ))
        })?;

        let engine = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            scenarios = engine.scenarios.len(),
            "Loaded recorded scenarios"
        );
        Ok(engine)
    }
}

impl ScenarioEngine for RecordedScenarioEngine {
    fn minimum_lags(&self) -> &[u32] {
        &self.minimum_lags
    }

    fn generate_parameters(&self) -> Result<Vec<ScenarioId>> {
        Ok(self.scenarios.iter().map(|s| s.id.clone()).collect())
    }

    fn run(&self, scenario: &ScenarioId, days: &[RollingDay]) -> Result<ScenarioRun> {
        let recorded = self
            .scenarios
            .iter()
            .find(|s| &s.id == scenario)
            .ok_or_else(|| CobsError::Engine(format!("unknown scenario '{scenario}'")))?;

        let last_index = days
            .last()
            .map(RollingDay::timeline_index)
            .ok_or_else(|| CobsError::Engine("cannot run a scenario over no days".to_string()))?;

        let outcomes: Vec<ScenarioOutcome> = recorded
            .outcomes
            .iter()
            .filter(|o| o.timeline_index <= last_index)
            .cloned()
            .collect();

        let mut aggregates = recorded.aggregates;
        if let Some(current) = outcomes.last() {
            aggregates.current_growth_rate = current.growth_rate;
            aggregates.current_r_effective = current.r_effective;
        }

        Ok(ScenarioRun {
            scenario: scenario.clone(),
            outcomes,
            aggregates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::{populate_rolling, seed_timeline};
    use crate::domain::RawDay;
    use chrono::{Days, NaiveDate};

    const DOCUMENT: &str = r#"{
        "minimum_lags": [2, 4],
        "scenarios": [
            {
                "id": "low",
                "outcomes": [
                    {"timeline_index": 1, "date": "2020-10-02", "actual_daily_new_cases": 11, "growth_rate": 0.1, "r_effective": 1.2},
                    {"timeline_index": -1, "date": "2020-09-30", "actual_daily_new_cases": 9},
                    {"timeline_index": 0, "date": "2020-10-01", "actual_daily_new_cases": 10, "growth_rate": 0.05, "r_effective": 1.1}
                ],
                "aggregates": {"projected_total_mortality": 100, "projected_total_seroprevalence": 0.1, "current_growth_rate": 0.0, "current_r_effective": 0.0}
            }
        ]
    }"#;

    fn days(len: u32) -> Vec<RollingDay> {
        let start = NaiveDate::from_ymd_opt(2020, 10, 1).unwrap();
        let mut raw: Vec<RawDay> = (0..len)
            .map(|i| RawDay::new(start.checked_add_days(Days::new(i as u64)).unwrap(), 1, 1, 1.0, 0, 0))
            .collect();
        seed_timeline(&mut raw);
        populate_rolling(&raw)
    }

    #[test]
    fn test_from_json_sorts_outcomes() {
        let engine = RecordedScenarioEngine::from_json(DOCUMENT).unwrap();
        assert_eq!(engine.minimum_lags(), &[2, 4]);
        assert_eq!(engine.max_lag(), 4);

        let run = engine.run(&ScenarioId::new("low"), &days(2)).unwrap();
        let indices: Vec<_> = run.outcomes.iter().map(|o| o.timeline_index).collect();
        assert_eq!(indices, vec![-1, 0, 1]);
    }

    #[tokio::test]
    async fn test_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scenarios.json");
        std::fs::write(&path, DOCUMENT).unwrap();

        let engine = RecordedScenarioEngine::from_path(&path).await.unwrap();
        assert_eq!(engine.max_lag(), 4);

        let missing = RecordedScenarioEngine::from_path(dir.path().join("absent.json")).await;
        assert!(matches!(missing, Err(CobsError::Io(_))));
    }

    #[test]
    fn test_run_truncates_to_series_end() {
        let engine = RecordedScenarioEngine::from_json(DOCUMENT).unwrap();
        let run = engine.run(&ScenarioId::new("low"), &days(1)).unwrap();

        assert_eq!(run.outcomes.len(), 2);
        assert_eq!(run.aggregates.current_growth_rate, 0.05);
        assert_eq!(run.aggregates.current_r_effective, 1.1);
        assert_eq!(run.aggregates.projected_total_mortality, 100);
    }

    #[test]
    fn test_unknown_scenario_and_empty_series() {
        let engine = RecordedScenarioEngine::from_json(DOCUMENT).unwrap();
        assert!(matches!(
            engine.run(&ScenarioId::new("nope"), &days(1)),
            Err(CobsError::Engine(_))
        ));
        assert!(matches!(
            engine.run(&ScenarioId::new("low"), &[]),
            Err(CobsError::Engine(_))
        ));
    }

    #[test]
    fn test_rejects_empty_and_duplicate_scenarios() {
        assert!(RecordedScenarioEngine::new(vec![], vec![]).is_err());

        let scenario = RecordedScenario {
            id: ScenarioId::new("a"),
            outcomes: vec![],
            aggregates: ScenarioAggregates::default(),
        };
        let result = RecordedScenarioEngine::new(vec![], vec![scenario.clone(), scenario]);
        assert!(matches!(result, Err(CobsError::Engine(_))));
    }

    #[test]
    fn test_malformed_document() {
        let result = RecordedScenarioEngine::from_json("{ not json");
        assert!(matches!(result, Err(CobsError::Serialization(_))));
    }
}
