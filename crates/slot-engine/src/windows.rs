//! Expand recurring weekly windows into concrete open intervals per date.
//!
//! Resolution happens in local minutes-since-midnight. A date collects its own
//! weekday's windows plus the after-midnight tail of any window on the previous
//! weekday that crosses midnight. Overlapping or adjacent ranges are merged
//! before they are turned into zoned [`Interval`]s.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;

use crate::dst;
use crate::model::{Interval, WeeklyWindow, WorkerId, YearMonth};
use crate::warning::{self, DataQualityWarning, WarningKind};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A weekly window with its times parsed to local minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedWindow {
    pub weekday: u8,
    pub start_minute: u32,
    pub end_minute: u32,
}

impl ParsedWindow {
    pub fn crosses_midnight(&self) -> bool {
        self.end_minute < self.start_minute
    }
}

/// Parse `"HH:MM"` into minutes since midnight. `"24:00"` is accepted only
/// when `allow_end_of_day` is set.
fn parse_hhmm(raw: &str, allow_end_of_day: bool) -> Option<u32> {
    let raw = raw.trim();
    if allow_end_of_day && raw == "24:00" {
        return Some(MINUTES_PER_DAY);
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .ok()
        .map(|t| t.hour() * 60 + t.minute())
}

/// Validate and parse one window.
pub fn parse_window(window: &WeeklyWindow) -> Result<ParsedWindow, String> {
    if window.weekday > 6 {
        return Err(format!("weekday {} is outside 0..=6", window.weekday));
    }
    let start_minute = parse_hhmm(&window.start_time, false)
        .ok_or_else(|| format!("unparseable start time '{}'", window.start_time))?;
    let end_minute = parse_hhmm(&window.end_time, true)
        .ok_or_else(|| format!("unparseable end time '{}'", window.end_time))?;
    if start_minute == end_minute {
        return Err(format!(
            "empty window {}-{} on weekday {}",
            window.start_time, window.end_time, window.weekday
        ));
    }
    Ok(ParsedWindow {
        weekday: window.weekday,
        start_minute,
        end_minute,
    })
}

/// Parse a worker's windows, recording a warning for every malformed one.
pub fn parse_windows(
    worker_id: &WorkerId,
    windows: &[WeeklyWindow],
    warnings: &mut Vec<DataQualityWarning>,
) -> Vec<ParsedWindow> {
    windows
        .iter()
        .filter_map(|window| match parse_window(window) {
            Ok(parsed) => Some(parsed),
            Err(detail) => {
                warning::record(
                    warnings,
                    DataQualityWarning::new(WarningKind::MalformedWindow, worker_id, detail),
                );
                None
            }
        })
        .collect()
}

/// Sunday-based weekday index of `date`, matching [`WeeklyWindow::weekday`].
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Merged local open ranges `[start, end)` for `date`, in minutes. `end` may be
/// 1440 (next midnight).
pub fn open_minutes_for_date(windows: &[ParsedWindow], date: NaiveDate) -> Vec<(u32, u32)> {
    let weekday = weekday_index(date);
    let previous = (weekday + 6) % 7;

    let mut ranges: Vec<(u32, u32)> = Vec::new();
    for w in windows {
        if w.weekday == weekday {
            if w.crosses_midnight() {
                ranges.push((w.start_minute, MINUTES_PER_DAY));
            } else {
                ranges.push((w.start_minute, w.end_minute));
            }
        }
        if w.weekday == previous && w.crosses_midnight() && w.end_minute > 0 {
            ranges.push((0, w.end_minute));
        }
    }

    ranges.sort_unstable();

    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }
    merged
}

/// Open intervals for `date` as zoned instants in `tz`.
pub fn resolve_date(windows: &[ParsedWindow], date: NaiveDate, tz: Tz) -> Vec<Interval> {
    open_minutes_for_date(windows, date)
        .into_iter()
        .filter_map(|(start, end)| {
            let start = dst::wall_clock(tz, date, start).instant();
            let end = dst::wall_clock(tz, date, end).instant();
            (start < end).then(|| Interval::new(start, end))
        })
        .collect()
}

/// Open intervals for every date of `month` that has any. Dates without a
/// matching window are absent.
pub fn resolve_month(
    windows: &[ParsedWindow],
    month: YearMonth,
    tz: Tz,
) -> BTreeMap<NaiveDate, Vec<Interval>> {
    month
        .days()
        .filter_map(|date| {
            let open = resolve_date(windows, date, tz);
            (!open.is_empty()).then_some((date, open))
        })
        .collect()
}
