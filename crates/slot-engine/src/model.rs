//! Core data model: workers, weekly windows, busy blocks, service parameters,
//! and the zoned intervals and slots the pipeline produces.
//!
//! Wire-facing types use camelCase field names, matching the booking-form JSON
//! they are exchanged with.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, SlotError};

/// Opaque worker identifier as issued by the scheduling provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(pub String);

impl WorkerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WorkerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A recurring day-of-week range during which a worker is normally available.
///
/// `weekday` counts from Sunday (0) to Saturday (6). Times are local wall-clock
/// `HH:MM` strings in the service timezone; `end_time` may also be `24:00`.
/// An `end_time` earlier than `start_time` means the window crosses midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyWindow {
    pub weekday: u8,
    pub start_time: String,
    pub end_time: String,
}

impl WeeklyWindow {
    pub fn new(weekday: u8, start_time: &str, end_time: &str) -> Self {
        Self {
            weekday,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }
}

/// A worker as returned by the provider, carrying its weekly availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    pub id: WorkerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub weekly_windows: Vec<WeeklyWindow>,
}

impl WorkerRecord {
    pub fn new(id: impl Into<WorkerId>, weekly_windows: Vec<WeeklyWindow>) -> Self {
        Self {
            id: id.into(),
            name: None,
            weekly_windows,
        }
    }
}

/// A committed interval during which a worker cannot take a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusyBlock {
    pub worker_id: WorkerId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyBlock {
    pub fn new(worker_id: impl Into<WorkerId>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            worker_id: worker_id.into(),
            start,
            end,
        }
    }

    /// A block is usable only when it ends strictly after it starts.
    pub fn is_well_formed(&self) -> bool {
        self.end > self.start
    }

    /// Calendar date of the block's start in the given timezone.
    pub fn local_date(&self, tz: Tz) -> NaiveDate {
        self.start.with_timezone(&tz).date_naive()
    }
}

/// Upper bound for duration, interval, and buffer: one month.
pub const MAX_SLOT_MINUTES: i64 = 31 * 24 * 60;
/// Upper bound for minimum notice: one leap year.
pub const MAX_NOTICE_MINUTES: i64 = 366 * 24 * 60;

/// Booking parameters of a service, all in minutes.
///
/// Fields are signed so that negative values coming off the wire are rejected
/// by [`ServiceParameters::validate`] rather than by deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceParameters {
    pub duration_minutes: i64,
    pub interval_minutes: i64,
    #[serde(default)]
    pub buffer_minutes: i64,
    #[serde(default)]
    pub minimum_notice_minutes: i64,
}

impl ServiceParameters {
    pub fn new(duration_minutes: i64, interval_minutes: i64) -> Self {
        Self {
            duration_minutes,
            interval_minutes,
            buffer_minutes: 0,
            minimum_notice_minutes: 0,
        }
    }

    pub fn with_buffer(mut self, buffer_minutes: i64) -> Self {
        self.buffer_minutes = buffer_minutes;
        self
    }

    pub fn with_minimum_notice(mut self, minimum_notice_minutes: i64) -> Self {
        self.minimum_notice_minutes = minimum_notice_minutes;
        self
    }

    /// # Errors
    /// Returns `SlotError::InvalidServiceParameters` for a non-positive duration
    /// or interval, a negative buffer or notice, or any value above its bound
    /// ([`MAX_SLOT_MINUTES`], [`MAX_NOTICE_MINUTES`]).
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("durationMinutes", self.duration_minutes, 1, MAX_SLOT_MINUTES),
            ("intervalMinutes", self.interval_minutes, 1, MAX_SLOT_MINUTES),
            ("bufferMinutes", self.buffer_minutes, 0, MAX_SLOT_MINUTES),
            (
                "minimumNoticeMinutes",
                self.minimum_notice_minutes,
                0,
                MAX_NOTICE_MINUTES,
            ),
        ];
        for (name, value, min, max) in checks {
            if value < min {
                let expected = if min > 0 { "positive" } else { "not negative" };
                return Err(SlotError::InvalidServiceParameters(format!(
                    "{} must be {}, got {}",
                    name, expected, value
                )));
            }
            if value > max {
                return Err(SlotError::InvalidServiceParameters(format!(
                    "{} must be at most {}, got {}",
                    name, max, value
                )));
            }
        }
        Ok(())
    }

    /// Time an appointment occupies, including the trailing buffer.
    pub fn occupied_minutes(&self) -> i64 {
        self.duration_minutes.saturating_add(self.buffer_minutes)
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A validated calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
    last: NaiveDate,
}

impl YearMonth {
    /// # Errors
    /// Returns `SlotError::InvalidMonth` when `month` is outside 1..=12 or the
    /// year is outside chrono's supported range.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        let (next_year, next_month) = if month == 12 {
            (year.checked_add(1), 1)
        } else {
            (Some(year), month + 1)
        };
        let first = NaiveDate::from_ymd_opt(year, month, 1);
        let last = next_year
            .and_then(|y| NaiveDate::from_ymd_opt(y, next_month, 1))
            .and_then(|next| next.pred_opt());
        match (first, last) {
            (Some(first), Some(last)) => Ok(Self { first, last }),
            _ => Err(SlotError::InvalidMonth { year, month }),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    /// Every date of the month, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day();
        self.first_day().iter_days().take_while(move |d| *d <= last)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// The month widened by `padding_days` on both sides, so that busy blocks
    /// whose UTC date differs from their local date are still fetched.
    pub fn padded_range(&self, padding_days: u32) -> DateRange {
        let pad = Duration::days(i64::from(padding_days));
        DateRange {
            start: self.first_day() - pad,
            end: self.last_day() + pad,
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// A half-open span of time `[start, end)` in the service timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    #[serde(serialize_with = "serialize_rfc3339")]
    pub start: DateTime<Tz>,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub end: DateTime<Tz>,
}

impl Interval {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn contains(&self, instant: DateTime<Tz>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// A bookable start time together with every worker who can serve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    #[serde(serialize_with = "serialize_rfc3339")]
    pub start: DateTime<Tz>,
    pub worker_ids: Vec<WorkerId>,
}

/// Serialize a zoned timestamp as RFC 3339 with its local UTC offset,
/// e.g. `2026-03-16T09:00:00+02:00`.
pub(crate) fn serialize_rfc3339<S: Serializer>(
    dt: &DateTime<Tz>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, false))
}
