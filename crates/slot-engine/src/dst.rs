//! DST transition policies and wall-clock to instant resolution.
//!
//! Weekly windows and slot arithmetic work in local wall-clock minutes. The
//! absolute instant is derived per date through the timezone database, so a
//! 09:00 window stays at 09:00 on both sides of a transition.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for slot start times that fall in a spring-forward gap
/// (e.g. 02:30 on a date where clocks jump from 02:00 to 03:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop slot starts that do not exist on that date.
    Skip,
    /// Interpret the time with the offset in force before the gap, which moves
    /// it forward by the gap length (02:30 becomes 03:30).
    #[default]
    ShiftForward,
}

/// Outcome of mapping a local wall-clock time to an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalInstant {
    /// The wall-clock time exists. For fall-back ambiguity this is the
    /// earlier of the two instants.
    Exact(DateTime<Tz>),
    /// The wall-clock time falls in a gap; the instant is the shifted one.
    InGap(DateTime<Tz>),
}

impl LocalInstant {
    /// The instant to use for interval edges, which always exist.
    pub fn instant(self) -> DateTime<Tz> {
        match self {
            LocalInstant::Exact(dt) | LocalInstant::InGap(dt) => dt,
        }
    }

    /// The instant to use for a slot start under `policy`.
    pub fn apply(self, policy: DstPolicy) -> Option<DateTime<Tz>> {
        match (self, policy) {
            (LocalInstant::Exact(dt), _) => Some(dt),
            (LocalInstant::InGap(_), DstPolicy::Skip) => None,
            (LocalInstant::InGap(dt), DstPolicy::ShiftForward) => Some(dt),
        }
    }
}

/// Resolve a local wall-clock datetime in `tz`.
pub fn resolve_local(tz: Tz, local: NaiveDateTime) -> LocalInstant {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => LocalInstant::Exact(dt),
        LocalResult::Ambiguous(earliest, _) => LocalInstant::Exact(earliest),
        LocalResult::None => {
            // Gaps are at most a few hours, so the offset a day earlier is the
            // offset in force before the transition.
            let before = tz
                .offset_from_utc_datetime(&(local - Duration::days(1)))
                .fix();
            let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
            LocalInstant::InGap(tz.from_utc_datetime(&utc))
        }
    }
}

/// Resolve `local` with a known UTC offset. Returns `None` unless `tz` shows
/// exactly that wall-clock time at the resulting instant.
///
/// Picks the later occurrence of a repeated fall-back time when given the
/// post-transition offset.
pub fn resolve_with_offset(
    tz: Tz,
    local: NaiveDateTime,
    offset: FixedOffset,
) -> Option<DateTime<Tz>> {
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    let dt = tz.from_utc_datetime(&utc);
    (dt.naive_local() == local).then_some(dt)
}

/// Local wall-clock datetime `minute` minutes after midnight of `date`.
pub fn local_minute(date: NaiveDate, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::minutes(i64::from(minute))
}

/// Resolve `minute` minutes after local midnight of `date`. Minute 1440 is
/// midnight at the start of the following date.
pub fn wall_clock(tz: Tz, date: NaiveDate, minute: u32) -> LocalInstant {
    resolve_local(tz, local_minute(date, minute))
}

/// Whole minutes from local midnight of `date` to `instant`'s wall-clock time,
/// rounded towards the later minute when `round_up` is set.
pub fn minutes_since_midnight(date: NaiveDate, instant: &DateTime<Tz>, round_up: bool) -> i64 {
    let elapsed = instant.naive_local() - date.and_time(NaiveTime::MIN);
    let minutes = elapsed.num_minutes();
    if round_up && elapsed > Duration::minutes(minutes) {
        minutes + 1
    } else {
        minutes
    }
}
