//! Bulk-load everything a month computation needs in two provider calls.
//!
//! Worker records and busy blocks are fetched concurrently and joined. Each
//! fetch gets a per-attempt timeout and at most one retry; the join as a whole
//! honours the caller's deadline. Any failure fails the load: slots must never
//! be derived from an incomplete busy-block set.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{ProviderError, Result, SlotError};
use crate::model::{BusyBlock, DateRange, WorkerId, WorkerRecord, YearMonth};
use crate::provider::ProviderClient;

/// Raw provider data for one month, indexed by worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthData {
    pub workers: BTreeMap<WorkerId, WorkerRecord>,
    pub blocks_by_worker: BTreeMap<WorkerId, Vec<BusyBlock>>,
    /// The date range busy blocks were requested for.
    pub busy_range: Option<DateRange>,
}

impl MonthData {
    /// Index already-fetched records, dropping anything for workers outside
    /// `worker_ids`.
    pub fn from_records(
        worker_ids: &BTreeSet<WorkerId>,
        workers: Vec<WorkerRecord>,
        blocks: Vec<BusyBlock>,
    ) -> Self {
        let workers: BTreeMap<WorkerId, WorkerRecord> = workers
            .into_iter()
            .filter(|w| worker_ids.contains(&w.id))
            .map(|w| (w.id.clone(), w))
            .collect();

        let mut blocks_by_worker: BTreeMap<WorkerId, Vec<BusyBlock>> = BTreeMap::new();
        let mut ignored = 0usize;
        for block in blocks {
            if worker_ids.contains(&block.worker_id) {
                blocks_by_worker
                    .entry(block.worker_id.clone())
                    .or_default()
                    .push(block);
            } else {
                ignored += 1;
            }
        }
        if ignored > 0 {
            debug!(ignored, "ignoring busy blocks of unrequested workers");
        }

        Self {
            workers,
            blocks_by_worker,
            busy_range: None,
        }
    }
}

/// Fetch worker records and busy blocks for `month` with two concurrent calls.
///
/// # Errors
/// Returns `SlotError::ProviderUnavailable` or `SlotError::ProviderTimeout`
/// when either fetch still fails after the bounded retry, or when `deadline`
/// elapses before both have completed.
pub async fn load_month<P>(
    provider: &P,
    worker_ids: &BTreeSet<WorkerId>,
    month: YearMonth,
    config: &EngineConfig,
    deadline: Option<Duration>,
) -> Result<MonthData>
where
    P: ProviderClient + ?Sized,
{
    let ids: Vec<WorkerId> = worker_ids.iter().cloned().collect();
    let range = month.padded_range(config.busy_padding_days);

    debug!(
        workers = ids.len(),
        from = %range.start,
        to = %range.end,
        "loading month"
    );

    let fetch_both = async {
        tokio::try_join!(
            fetch_with_retry("workers", config, || provider.get_workers(&ids)),
            fetch_with_retry("busy blocks", config, || {
                provider.get_busy_blocks(&ids, range)
            }),
        )
    };

    let (workers, blocks) = match deadline {
        Some(deadline) => tokio::time::timeout(deadline, fetch_both)
            .await
            .map_err(|_| {
                SlotError::ProviderTimeout(format!(
                    "request deadline of {} ms elapsed before provider data arrived",
                    deadline.as_millis()
                ))
            })??,
        None => fetch_both.await?,
    };

    debug!(
        workers = workers.len(),
        busy_blocks = blocks.len(),
        "provider data loaded"
    );

    let mut data = MonthData::from_records(worker_ids, workers, blocks);
    data.busy_range = Some(range);
    Ok(data)
}

/// Run `fetch` with a per-attempt timeout, retrying up to
/// `config.max_retries` times.
async fn fetch_with_retry<T, F, Fut>(
    what: &'static str,
    config: &EngineConfig,
    mut fetch: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, ProviderError>>,
{
    let attempts = config.max_retries + 1;
    let mut attempt = 0;
    loop {
        attempt += 1;
        let error = match tokio::time::timeout(config.fetch_timeout(), fetch()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e,
            Err(_) => ProviderError::Timeout,
        };

        if attempt >= attempts {
            return Err(match error {
                ProviderError::Timeout => SlotError::ProviderTimeout(format!(
                    "{} fetch timed out after {} attempt(s)",
                    what, attempt
                )),
                ProviderError::Unavailable(reason) => SlotError::ProviderUnavailable(format!(
                    "{} fetch failed after {} attempt(s): {}",
                    what, attempt, reason
                )),
            });
        }

        warn!(fetch = what, attempt, error = %error, "provider fetch failed, retrying");
    }
}
