//! Discretize free intervals into candidate slot start times.
//!
//! Candidates are stepped in local minutes-since-midnight from each free
//! interval's start and only converted to absolute instants at the end. Every
//! candidate is then re-checked in absolute time so that a DST transition
//! inside the interval can never produce a slot that overruns it.
//!
//! A free interval that starts in the second occurrence of a repeated
//! fall-back hour reads its wall-clock times with the interval's own offset,
//! so its opening candidates are not lost to the earlier occurrence.

use chrono::{DateTime, Duration, NaiveDate, Offset, Utc};
use chrono_tz::Tz;

use crate::dst::{self, DstPolicy};
use crate::model::{Interval, ServiceParameters};

/// Candidate starts for one worker on one date, sorted and deduplicated.
///
/// `free` holds the worker's free intervals attributed to `date`. A candidate
/// is kept when `candidate + duration + buffer` fits in its interval and
/// `candidate >= not_before` (now plus minimum notice). `params` must already
/// be validated.
pub fn generate_slots(
    date: NaiveDate,
    free: &[Interval],
    params: &ServiceParameters,
    not_before: DateTime<Utc>,
    dst_policy: DstPolicy,
) -> Vec<DateTime<Tz>> {
    let occupied = params.occupied_minutes();
    let step = params.interval_minutes;
    let Some(occupied_span) = Duration::try_minutes(occupied) else {
        return Vec::new();
    };
    if step <= 0 {
        return Vec::new();
    }

    let mut starts = Vec::new();

    for interval in free {
        let tz = interval.start.timezone();
        let start_offset = interval.start.offset().fix();
        let first = dst::minutes_since_midnight(date, &interval.start, true);
        let last = dst::minutes_since_midnight(date, &interval.end, false);

        let minutes = std::iter::successors(Some(first), |m| m.checked_add(step))
            .take_while(|m| m.checked_add(occupied).is_some_and(|end| end <= last));
        for minute in minutes {
            let Ok(minute) = u32::try_from(minute) else {
                continue;
            };
            let local = dst::local_minute(date, minute);
            let candidate = match dst::resolve_local(tz, local).apply(dst_policy) {
                Some(dt) if dt < interval.start => {
                    dst::resolve_with_offset(tz, local, start_offset)
                }
                other => other,
            };
            let Some(candidate) = candidate else {
                continue;
            };
            if candidate < interval.start || candidate + occupied_span > interval.end {
                continue;
            }
            if candidate.with_timezone(&Utc) < not_before {
                continue;
            }
            starts.push(candidate);
        }
    }

    starts.sort_unstable();
    starts.dedup();
    starts
}

/// Earliest instant a slot may start: `now` plus the minimum notice.
///
/// Saturates at the end of the representable range instead of overflowing.
pub fn notice_cutoff(now: DateTime<Utc>, params: &ServiceParameters) -> DateTime<Utc> {
    Duration::try_minutes(params.minimum_notice_minutes)
        .and_then(|notice| now.checked_add_signed(notice))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
