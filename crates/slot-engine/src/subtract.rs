//! Subtract busy blocks from open intervals.
//!
//! Busy blocks are sorted and merged once per worker into a [`BusySchedule`].
//! Each open interval is then swept against the merged periods: periods fully
//! outside are ignored, periods over an edge truncate, periods strictly inside
//! split the interval in two.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::model::{BusyBlock, Interval, WorkerId};
use crate::warning::{self, DataQualityWarning, WarningKind};

/// One worker's busy time as sorted, non-overlapping `[start, end)` periods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusySchedule {
    periods: Vec<(DateTime<Utc>, DateTime<Utc>)>,
}

impl BusySchedule {
    /// Build from raw blocks. Blocks with `end <= start` are ignored.
    pub fn from_blocks<'a>(blocks: impl IntoIterator<Item = &'a BusyBlock>) -> Self {
        let mut periods: Vec<(DateTime<Utc>, DateTime<Utc>)> = blocks
            .into_iter()
            .filter(|b| b.is_well_formed())
            .map(|b| (b.start, b.end))
            .collect();

        periods.sort_unstable();

        let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(periods.len());
        for (start, end) in periods {
            if let Some(last) = merged.last_mut() {
                if start <= last.1 {
                    // Overlapping or adjacent: extend the current period.
                    last.1 = last.1.max(end);
                    continue;
                }
            }
            merged.push((start, end));
        }

        Self { periods: merged }
    }

    pub fn periods(&self) -> &[(DateTime<Utc>, DateTime<Utc>)] {
        &self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Free time left in `open` after removing every busy period.
    ///
    /// `open` must be sorted and non-overlapping; the result is too.
    pub fn subtract(&self, open: &[Interval]) -> Vec<Interval> {
        let mut free = Vec::with_capacity(open.len());

        for interval in open {
            let tz = interval.start.timezone();
            let open_start = interval.start.with_timezone(&Utc);
            let open_end = interval.end.with_timezone(&Utc);

            // First period that ends after the interval starts.
            let first = self.periods.partition_point(|&(_, end)| end <= open_start);

            let mut cursor = open_start;
            for &(busy_start, busy_end) in &self.periods[first..] {
                if busy_start >= open_end {
                    break;
                }
                if cursor < busy_start {
                    free.push(Interval::new(
                        cursor.with_timezone(&tz),
                        busy_start.with_timezone(&tz),
                    ));
                }
                cursor = cursor.max(busy_end);
            }

            if cursor < open_end {
                free.push(Interval::new(cursor.with_timezone(&tz), interval.end));
            }
        }

        free
    }
}

/// Free intervals: `open` minus every well-formed block in `busy`.
pub fn subtract_busy(open: &[Interval], busy: &[BusyBlock]) -> Vec<Interval> {
    BusySchedule::from_blocks(busy).subtract(open)
}

/// Group blocks by worker into schedules.
///
/// Malformed blocks are dropped and recorded as warnings so they cannot
/// corrupt the sweep.
pub fn schedules_by_worker<'a>(
    blocks: impl IntoIterator<Item = &'a BusyBlock>,
    tz: Tz,
    warnings: &mut Vec<DataQualityWarning>,
) -> BTreeMap<WorkerId, BusySchedule> {
    let mut grouped: BTreeMap<WorkerId, Vec<&BusyBlock>> = BTreeMap::new();
    for block in blocks {
        if !block.is_well_formed() {
            let detail = format!(
                "busy block ends at {} which is not after its start {}",
                block.end.to_rfc3339(),
                block.start.to_rfc3339()
            );
            let malformed =
                DataQualityWarning::new(WarningKind::MalformedBusyBlock, &block.worker_id, detail)
                    .on_date(block.local_date(tz));
            warning::record(warnings, malformed);
            continue;
        }
        grouped.entry(block.worker_id.clone()).or_default().push(block);
    }

    grouped
        .into_iter()
        .map(|(worker, blocks)| (worker, BusySchedule::from_blocks(blocks)))
        .collect()
}
