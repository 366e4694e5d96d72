//! Tests for subtracting busy blocks from open intervals.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use slot_engine::model::{BusyBlock, Interval, WorkerId};
use slot_engine::subtract::{schedules_by_worker, subtract_busy, BusySchedule};
use slot_engine::warning::WarningKind;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn at(h: u32, m: u32) -> DateTime<Tz> {
    Tz::UTC.with_ymd_and_hms(2026, 3, 16, h, m, 0).unwrap()
}

fn open(start: (u32, u32), end: (u32, u32)) -> Interval {
    Interval::new(at(start.0, start.1), at(end.0, end.1))
}

fn busy(worker: &str, start: (u32, u32), end: (u32, u32)) -> BusyBlock {
    BusyBlock::new(
        worker,
        Utc.with_ymd_and_hms(2026, 3, 16, start.0, start.1, 0).unwrap(),
        Utc.with_ymd_and_hms(2026, 3, 16, end.0, end.1, 0).unwrap(),
    )
}

// ── Sweep cases ─────────────────────────────────────────────────────────────

#[test]
fn block_inside_open_interval_splits_it() {
    let free = subtract_busy(&[open((9, 0), (17, 0))], &[busy("ana", (12, 0), (13, 0))]);

    assert_eq!(free, vec![open((9, 0), (12, 0)), open((13, 0), (17, 0))]);
}

#[test]
fn blocks_outside_open_interval_are_ignored() {
    let blocks = vec![busy("ana", (6, 0), (8, 0)), busy("ana", (18, 0), (19, 0))];

    let free = subtract_busy(&[open((9, 0), (17, 0))], &blocks);

    assert_eq!(free, vec![open((9, 0), (17, 0))]);
}

#[test]
fn blocks_touching_the_edges_are_ignored() {
    let blocks = vec![busy("ana", (8, 0), (9, 0)), busy("ana", (17, 0), (18, 0))];

    let free = subtract_busy(&[open((9, 0), (17, 0))], &blocks);

    assert_eq!(free, vec![open((9, 0), (17, 0))]);
}

#[test]
fn block_over_start_edge_truncates() {
    let free = subtract_busy(&[open((9, 0), (17, 0))], &[busy("ana", (8, 0), (10, 0))]);

    assert_eq!(free, vec![open((10, 0), (17, 0))]);
}

#[test]
fn block_over_end_edge_truncates() {
    let free = subtract_busy(&[open((9, 0), (17, 0))], &[busy("ana", (16, 0), (18, 0))]);

    assert_eq!(free, vec![open((9, 0), (16, 0))]);
}

#[test]
fn block_covering_everything_leaves_nothing() {
    let free = subtract_busy(&[open((9, 0), (17, 0))], &[busy("ana", (8, 0), (18, 0))]);

    assert!(free.is_empty());
}

#[test]
fn unsorted_overlapping_blocks_are_merged_before_sweep() {
    let blocks = vec![
        busy("ana", (14, 0), (15, 0)),
        busy("ana", (10, 0), (11, 30)),
        busy("ana", (11, 0), (12, 0)),
        busy("ana", (15, 0), (15, 30)),
    ];

    let free = subtract_busy(&[open((9, 0), (17, 0))], &blocks);

    assert_eq!(
        free,
        vec![
            open((9, 0), (10, 0)),
            open((12, 0), (14, 0)),
            open((15, 30), (17, 0)),
        ]
    );
}

#[test]
fn one_block_can_cut_several_open_intervals() {
    let windows = vec![open((9, 0), (12, 0)), open((13, 0), (17, 0))];

    let free = subtract_busy(&windows, &[busy("ana", (11, 0), (14, 0))]);

    assert_eq!(free, vec![open((9, 0), (11, 0)), open((14, 0), (17, 0))]);
}

#[test]
fn result_keeps_the_service_timezone() {
    let helsinki: Tz = "Europe/Helsinki".parse().unwrap();
    let window = Interval::new(
        helsinki.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap(),
        helsinki.with_ymd_and_hms(2026, 3, 16, 17, 0, 0).unwrap(),
    );
    // 10:00-11:00 UTC is 12:00-13:00 in Helsinki.
    let free = subtract_busy(&[window], &[busy("ana", (10, 0), (11, 0))]);

    assert_eq!(free.len(), 2);
    assert_eq!(free[0].end.to_rfc3339(), "2026-03-16T12:00:00+02:00");
    assert_eq!(free[1].start.to_rfc3339(), "2026-03-16T13:00:00+02:00");
}

// ── Schedules and malformed blocks ──────────────────────────────────────────

#[test]
fn adjacent_blocks_merge_into_one_period() {
    let blocks = vec![busy("ana", (9, 0), (10, 0)), busy("ana", (10, 0), (11, 0))];

    let schedule = BusySchedule::from_blocks(&blocks);

    assert_eq!(schedule.periods().len(), 1);
    assert_eq!(schedule.periods()[0].0, Utc.with_ymd_and_hms(2026, 3, 16, 9, 0, 0).unwrap());
    assert_eq!(schedule.periods()[0].1, Utc.with_ymd_and_hms(2026, 3, 16, 11, 0, 0).unwrap());
}

#[test]
fn malformed_block_is_ignored_by_the_sweep() {
    let blocks = vec![
        busy("ana", (12, 0), (13, 0)),
        // Ends before it starts: would erase 10:00-15:00 if taken literally.
        busy("ana", (15, 0), (10, 0)),
    ];

    let free = subtract_busy(&[open((9, 0), (17, 0))], &blocks);

    assert_eq!(free, vec![open((9, 0), (12, 0)), open((13, 0), (17, 0))]);
}

#[test]
fn schedules_by_worker_reports_malformed_blocks() {
    let blocks = vec![
        busy("ana", (12, 0), (13, 0)),
        busy("ana", (14, 0), (14, 0)),
        busy("ben", (9, 0), (10, 0)),
    ];
    let mut warnings = Vec::new();

    let schedules = schedules_by_worker(&blocks, Tz::UTC, &mut warnings);

    assert_eq!(schedules.len(), 2);
    assert_eq!(schedules[&WorkerId::new("ana")].periods().len(), 1);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::MalformedBusyBlock);
    assert_eq!(warnings[0].worker_id.as_str(), "ana");
    assert_eq!(warnings[0].date, chrono::NaiveDate::from_ymd_opt(2026, 3, 16));
}
