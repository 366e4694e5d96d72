//! Combine per-worker candidate starts into the slots offered for a date.
//!
//! Which combination applies is an [`AggregationPolicy`]: by default any one
//! assigned worker can serve a slot, so candidates are unioned. Services that
//! need every assigned worker at once use the intersection instead.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::model::{Slot, WorkerId};

/// How candidate starts from several workers are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationPolicy {
    /// A slot is offered when at least one worker has it. The slot lists every
    /// worker who could serve it.
    #[default]
    AnyWorker,
    /// A slot is offered only when every assigned worker has it.
    AllWorkers,
}

impl AggregationPolicy {
    /// Aggregate one date's candidates.
    ///
    /// `candidates` maps each worker that produced candidates to its sorted
    /// starts; `assigned` is the number of workers assigned to the service,
    /// including any that produced nothing. Output is sorted by start and
    /// each slot's `worker_ids` are sorted.
    pub fn aggregate(
        self,
        candidates: &BTreeMap<WorkerId, Vec<DateTime<Tz>>>,
        assigned: usize,
    ) -> Vec<Slot> {
        let mut by_instant: BTreeMap<DateTime<Utc>, Slot> = BTreeMap::new();

        // BTreeMap iteration keeps worker ids in sorted order per slot.
        for (worker, starts) in candidates {
            for start in starts {
                let slot = by_instant
                    .entry(start.with_timezone(&Utc))
                    .or_insert_with(|| Slot {
                        start: *start,
                        worker_ids: Vec::new(),
                    });
                if slot.worker_ids.last() != Some(worker) {
                    slot.worker_ids.push(worker.clone());
                }
            }
        }

        by_instant
            .into_values()
            .filter(|slot| match self {
                AggregationPolicy::AnyWorker => true,
                AggregationPolicy::AllWorkers => assigned > 0 && slot.worker_ids.len() == assigned,
            })
            .collect()
    }
}

/// Union (or intersect, per `policy`) candidates for a single date.
pub fn aggregate_slots(
    candidates: &BTreeMap<WorkerId, Vec<DateTime<Tz>>>,
    assigned: usize,
    policy: AggregationPolicy,
) -> Vec<Slot> {
    policy.aggregate(candidates, assigned)
}
