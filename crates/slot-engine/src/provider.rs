//! The scheduling-provider contract consumed by the batch loader.
//!
//! Rate limiting and authentication against the real upstream belong to the
//! implementation; the engine only ever issues the two bulk calls below.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::model::{BusyBlock, DateRange, WorkerId, WorkerRecord};

/// A source of worker availability and committed busy time.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Worker records, with weekly windows, for the given ids. Ids the
    /// provider does not know are simply absent from the result.
    async fn get_workers(&self, ids: &[WorkerId]) -> Result<Vec<WorkerRecord>, ProviderError>;

    /// Every busy block of the given workers overlapping `range`.
    async fn get_busy_blocks(
        &self,
        ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<BusyBlock>, ProviderError>;
}

/// Provider backed by in-memory records, e.g. a JSON fixture.
///
/// ```json
/// {
///   "workers": [{ "id": "ana", "weeklyWindows": [{ "weekday": 1, "startTime": "09:00", "endTime": "17:00" }] }],
///   "busyBlocks": [{ "workerId": "ana", "start": "2026-03-16T12:00:00Z", "end": "2026-03-16T13:00:00Z" }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InMemoryProvider {
    #[serde(default)]
    pub workers: Vec<WorkerRecord>,
    #[serde(default)]
    pub busy_blocks: Vec<BusyBlock>,
}

impl InMemoryProvider {
    pub fn new(workers: Vec<WorkerRecord>, busy_blocks: Vec<BusyBlock>) -> Self {
        Self {
            workers,
            busy_blocks,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[async_trait]
impl ProviderClient for InMemoryProvider {
    async fn get_workers(&self, ids: &[WorkerId]) -> Result<Vec<WorkerRecord>, ProviderError> {
        Ok(self
            .workers
            .iter()
            .filter(|w| ids.contains(&w.id))
            .cloned()
            .collect())
    }

    async fn get_busy_blocks(
        &self,
        ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<BusyBlock>, ProviderError> {
        Ok(self
            .busy_blocks
            .iter()
            .filter(|b| ids.contains(&b.worker_id))
            .filter(|b| {
                // Malformed blocks are passed through untouched; the engine
                // reports them.
                let first = b.start.date_naive().min(b.end.date_naive());
                let last = b.start.date_naive().max(b.end.date_naive());
                first <= range.end && last >= range.start
            })
            .cloned()
            .collect())
    }
}
