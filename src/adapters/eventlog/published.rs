//! Read-back of published results

use super::events::{
    results_stream, AggregatesPayload, BuildEventPayload, ResultsDayPayload, ResultsReadyPayload,
    AGGREGATES_RECEIVED, BUILD_EVENT, RESULTS_DAY_RECEIVED, RESULTS_READY,
};
use super::store::LogStore;
use crate::domain::{Aggregates, BuildId, CobsError, Result, ResultsDay};
use serde::de::DeserializeOwned;

/// Everything on a results stream, decoded
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishedResults {
    pub builds: Vec<BuildEventPayload>,
    pub results_days: Vec<ResultsDayPayload>,
    pub aggregates: Vec<AggregatesPayload>,
    pub ready: Vec<ResultsReadyPayload>,
}

impl PublishedResults {
    /// Most recent completed build
    pub fn latest_ready(&self) -> Option<&ResultsReadyPayload> {
        self.ready.last()
    }

    /// Rows a build published for one job
    pub fn job_days(&self, build_id: BuildId, series_index: i32) -> Vec<ResultsDay> {
        self.results_days
            .iter()
            .filter(|p| p.build_id == build_id && p.series_index == series_index)
            .map(|p| p.day.clone())
            .collect()
    }

    /// Aggregates a build published for one job
    pub fn job_aggregates(&self, build_id: BuildId, series_index: i32) -> Option<Aggregates> {
        self.aggregates
            .iter()
            .rev()
            .find(|p| p.build_id == build_id && p.series_index == series_index)
            .map(|p| p.aggregates)
    }

    /// Highest series index with published aggregates
    pub fn latest_series_index(&self) -> Option<i32> {
        self.aggregates.iter().map(|p| p.series_index).max()
    }
}

/// Reads and decodes the `<stream>-results` stream
///
/// A missing stream reads as empty.
///
/// # Errors
///
/// Returns `CobsError::Decode` with the 1-based event ordinal for a malformed payload.
pub async fn read_published(store: &dyn LogStore, stream: &str) -> Result<PublishedResults> {
    let events = store
        .read_stream(&results_stream(stream))
        .await?
        .unwrap_or_default();

    let mut published = PublishedResults::default();
    for (i, event) in events.iter().enumerate() {
        let ordinal = i + 1;
        match event.event_type.as_str() {
            BUILD_EVENT => published.builds.push(decode(ordinal, &event.data)?),
            RESULTS_DAY_RECEIVED => published.results_days.push(decode(ordinal, &event.data)?),
            AGGREGATES_RECEIVED => published.aggregates.push(decode(ordinal, &event.data)?),
            RESULTS_READY => published.ready.push(decode(ordinal, &event.data)?),
            other => tracing::debug!(event_type = other, ordinal, "Skipping unknown results event"),
        }
    }

    Ok(published)
}

fn decode<T: DeserializeOwned>(ordinal: usize, data: &serde_json::Value) -> Result<T> {
    T::deserialize(data).map_err(|e| CobsError::Decode {
        ordinal,
        message: e.to_string(),
    })
}
