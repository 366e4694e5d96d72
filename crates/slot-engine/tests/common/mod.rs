//! Shared fixtures: a scripted provider that counts calls, injects failures,
//! and delays responses.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use slot_engine::error::ProviderError;
use slot_engine::model::{BusyBlock, DateRange, WeeklyWindow, WorkerId, WorkerRecord};
use slot_engine::provider::{InMemoryProvider, ProviderClient};

pub const SUNDAY: u8 = 0;
pub const MONDAY: u8 = 1;
pub const TUESDAY: u8 = 2;

#[derive(Debug, Default)]
pub struct ScriptedProvider {
    pub inner: InMemoryProvider,
    /// Number of upcoming `get_workers` calls that fail.
    pub worker_failures: AtomicUsize,
    /// Number of upcoming `get_busy_blocks` calls that fail.
    pub busy_failures: AtomicUsize,
    pub delay: Duration,
    pub worker_calls: AtomicUsize,
    pub busy_calls: AtomicUsize,
    pub last_range: Mutex<Option<DateRange>>,
}

impl ScriptedProvider {
    pub fn new(workers: Vec<WorkerRecord>, busy_blocks: Vec<BusyBlock>) -> Self {
        Self {
            inner: InMemoryProvider::new(workers, busy_blocks),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_workers(self, times: usize) -> Self {
        self.worker_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn failing_busy(self, times: usize) -> Self {
        self.busy_failures.store(times, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> (usize, usize) {
        (
            self.worker_calls.load(Ordering::SeqCst),
            self.busy_calls.load(Ordering::SeqCst),
        )
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl ProviderClient for ScriptedProvider {
    async fn get_workers(&self, ids: &[WorkerId]) -> Result<Vec<WorkerRecord>, ProviderError> {
        self.worker_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if Self::take_failure(&self.worker_failures) {
            return Err(ProviderError::Unavailable("503 from upstream".to_string()));
        }
        self.inner.get_workers(ids).await
    }

    async fn get_busy_blocks(
        &self,
        ids: &[WorkerId],
        range: DateRange,
    ) -> Result<Vec<BusyBlock>, ProviderError> {
        self.busy_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_range.lock().unwrap() = Some(range);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if Self::take_failure(&self.busy_failures) {
            return Err(ProviderError::Unavailable("connection reset".to_string()));
        }
        self.inner.get_busy_blocks(ids, range).await
    }
}

pub fn worker(id: &str, windows: &[(u8, &str, &str)]) -> WorkerRecord {
    WorkerRecord::new(
        id,
        windows
            .iter()
            .map(|(day, start, end)| WeeklyWindow::new(*day, start, end))
            .collect(),
    )
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn busy(worker: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> BusyBlock {
    BusyBlock::new(worker, start, end)
}
