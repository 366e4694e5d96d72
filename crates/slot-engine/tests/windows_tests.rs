//! Tests for weekly window resolution into per-date open intervals.

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use slot_engine::model::{WeeklyWindow, WorkerId, YearMonth};
use slot_engine::warning::WarningKind;
use slot_engine::windows::{
    open_minutes_for_date, parse_window, parse_windows, resolve_date, resolve_month, weekday_index,
    ParsedWindow,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

const MONDAY: u8 = 1;
const SATURDAY: u8 = 6;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn parsed(weekday: u8, start: &str, end: &str) -> ParsedWindow {
    parse_window(&WeeklyWindow::new(weekday, start, end)).unwrap()
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

// ── Weekday mapping ─────────────────────────────────────────────────────────

#[test]
fn weekday_index_counts_from_sunday() {
    assert_eq!(weekday_index(date(2026, 3, 15)), 0); // Sunday
    assert_eq!(weekday_index(date(2026, 3, 16)), 1); // Monday
    assert_eq!(weekday_index(date(2026, 3, 21)), 6); // Saturday
}

// ── Single day resolution ───────────────────────────────────────────────────

#[test]
fn single_window_resolves_on_matching_weekday() {
    let windows = vec![parsed(MONDAY, "09:00", "17:00")];

    let open = resolve_date(&windows, date(2026, 3, 16), Tz::UTC);

    assert_eq!(open.len(), 1);
    assert_eq!(open[0].start, utc(2026, 3, 16, 9, 0));
    assert_eq!(open[0].end, utc(2026, 3, 16, 17, 0));
    assert_eq!(open[0].duration_minutes(), 480);
}

#[test]
fn no_window_on_weekday_means_no_open_interval() {
    let windows = vec![parsed(MONDAY, "09:00", "17:00")];

    assert!(resolve_date(&windows, date(2026, 3, 17), Tz::UTC).is_empty());
}

#[test]
fn overlapping_and_adjacent_windows_are_merged() {
    let windows = vec![
        parsed(MONDAY, "13:00", "15:00"),
        parsed(MONDAY, "09:00", "12:00"),
        parsed(MONDAY, "11:00", "13:00"),
        parsed(MONDAY, "16:00", "17:00"),
    ];

    let ranges = open_minutes_for_date(&windows, date(2026, 3, 16));

    // 09:00-15:00 (three windows coalesced) and 16:00-17:00.
    assert_eq!(ranges, vec![(540, 900), (960, 1020)]);
}

#[test]
fn end_of_day_is_accepted_as_24_00() {
    let windows = vec![parsed(MONDAY, "20:00", "24:00")];

    let open = resolve_date(&windows, date(2026, 3, 16), Tz::UTC);

    assert_eq!(open.len(), 1);
    assert_eq!(open[0].end, utc(2026, 3, 17, 0, 0));
}

// ── Midnight crossing ───────────────────────────────────────────────────────

#[test]
fn midnight_crossing_window_covers_both_dates() {
    let windows = vec![parsed(MONDAY, "22:00", "02:00")];

    let monday = resolve_date(&windows, date(2026, 3, 16), Tz::UTC);
    assert_eq!(monday.len(), 1);
    assert_eq!(monday[0].start, utc(2026, 3, 16, 22, 0));
    assert_eq!(monday[0].end, utc(2026, 3, 17, 0, 0));

    let tuesday = resolve_date(&windows, date(2026, 3, 17), Tz::UTC);
    assert_eq!(tuesday.len(), 1);
    assert_eq!(tuesday[0].start, utc(2026, 3, 17, 0, 0));
    assert_eq!(tuesday[0].end, utc(2026, 3, 17, 2, 0));

    // Coverage is continuous across the date boundary.
    assert_eq!(monday[0].end, tuesday[0].start);
}

#[test]
fn midnight_tail_merges_with_own_weekday_window() {
    // Monday night shift into Tuesday plus a Tuesday morning window that
    // starts exactly when the tail ends.
    let windows = vec![
        parsed(MONDAY, "22:00", "02:00"),
        parsed(MONDAY + 1, "02:00", "06:00"),
    ];

    let ranges = open_minutes_for_date(&windows, date(2026, 3, 17));

    assert_eq!(ranges, vec![(0, 360)]);
}

#[test]
fn window_ending_at_midnight_has_no_tail() {
    let windows = vec![parsed(MONDAY, "22:00", "00:00")];

    assert_eq!(
        open_minutes_for_date(&windows, date(2026, 3, 16)),
        vec![(1320, 1440)]
    );
    assert!(open_minutes_for_date(&windows, date(2026, 3, 17)).is_empty());
}

#[test]
fn previous_month_tail_reaches_first_day_of_month() {
    // 2026-02-28 is a Saturday; its late window spills into Sunday 2026-03-01.
    let windows = vec![parsed(SATURDAY, "23:00", "01:00")];
    let month = YearMonth::new(2026, 3).unwrap();

    let by_date = resolve_month(&windows, month, Tz::UTC);

    let first = by_date.get(&date(2026, 3, 1)).expect("tail on March 1st");
    assert_eq!(first[0].start, utc(2026, 3, 1, 0, 0));
    assert_eq!(first[0].end, utc(2026, 3, 1, 1, 0));
}

// ── Month resolution ────────────────────────────────────────────────────────

#[test]
fn resolve_month_only_contains_matching_dates() {
    let windows = vec![parsed(MONDAY, "09:00", "17:00")];
    let month = YearMonth::new(2026, 3).unwrap();

    let by_date = resolve_month(&windows, month, Tz::UTC);

    let mondays: Vec<NaiveDate> = by_date.keys().copied().collect();
    assert_eq!(
        mondays,
        vec![
            date(2026, 3, 2),
            date(2026, 3, 9),
            date(2026, 3, 16),
            date(2026, 3, 23),
            date(2026, 3, 30),
        ]
    );
}

#[test]
fn worker_without_windows_has_no_open_dates() {
    let month = YearMonth::new(2026, 3).unwrap();

    assert!(resolve_month(&[], month, Tz::UTC).is_empty());
}

#[test]
fn windows_follow_the_service_timezone_across_dst() {
    let windows = vec![parsed(MONDAY, "09:00", "17:00")];
    let helsinki: Tz = "Europe/Helsinki".parse().unwrap();

    // Before the 2026-03-29 transition Helsinki is UTC+2, after it UTC+3.
    let before = resolve_date(&windows, date(2026, 3, 16), helsinki);
    assert_eq!(before[0].start, utc(2026, 3, 16, 7, 0));
    assert_eq!(before[0].end, utc(2026, 3, 16, 15, 0));

    let after = resolve_date(&windows, date(2026, 3, 30), helsinki);
    assert_eq!(after[0].start, utc(2026, 3, 30, 6, 0));
    assert_eq!(after[0].end, utc(2026, 3, 30, 14, 0));
}

// ── Malformed windows ───────────────────────────────────────────────────────

#[test]
fn malformed_windows_are_skipped_with_warnings() {
    let worker = WorkerId::new("ana");
    let raw = vec![
        WeeklyWindow::new(MONDAY, "09:00", "12:00"),
        WeeklyWindow::new(7, "09:00", "12:00"),
        WeeklyWindow::new(MONDAY, "25:00", "26:00"),
        WeeklyWindow::new(MONDAY, "nine", "12:00"),
        WeeklyWindow::new(MONDAY, "10:00", "10:00"),
        WeeklyWindow::new(MONDAY + 1, "24:00", "10:00"),
    ];
    let mut warnings = Vec::new();

    let windows = parse_windows(&worker, &raw, &mut warnings);

    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0], parsed(MONDAY, "09:00", "12:00"));
    assert_eq!(warnings.len(), 5);
    assert!(warnings
        .iter()
        .all(|w| w.kind == WarningKind::MalformedWindow && w.worker_id == worker));
}
