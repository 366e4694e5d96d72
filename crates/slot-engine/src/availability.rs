//! Month availability for a bookable service.
//!
//! This is the entry point a booking form talks to. One request flows through
//! the whole pipeline: bulk load, weekly window resolution, busy-block
//! subtraction, slot generation, then aggregation across the assigned
//! workers. Everything after the load is a pure function of the loaded data,
//! the request, and the injected `now`, so recomputing is always safe.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::EngineConfig;
use crate::error::{Result, SlotError};
use crate::loader::{self, MonthData};
use crate::model::{Interval, ServiceParameters, Slot, WorkerId, YearMonth};
use crate::provider::ProviderClient;
use crate::slots;
use crate::subtract::{self, BusySchedule};
use crate::warning::{self, DataQualityWarning, WarningKind};
use crate::windows;

/// Bookable slots per local calendar date. Dates without slots are absent.
pub type SlotsByDate = BTreeMap<NaiveDate, Vec<Slot>>;

/// Free intervals per worker per local calendar date.
pub type WorkerFreeIndex = BTreeMap<WorkerId, BTreeMap<NaiveDate, Vec<Interval>>>;

/// An availability query as sent by a booking form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    /// Workers assigned to the service.
    #[serde(default)]
    pub worker_ids: Vec<WorkerId>,
    /// Used when no worker is assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_worker_id: Option<WorkerId>,
    pub service_parameters: ServiceParameters,
    pub year: i32,
    pub month: u32,
    /// IANA timezone of the service, e.g. `Europe/Helsinki`.
    pub timezone: String,
    /// Reference time for minimum notice. Defaults to the wall clock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<DateTime<Utc>>,
    /// Overall budget for the provider fetches.
    #[serde(skip)]
    pub deadline: Option<Duration>,
}

impl AvailabilityRequest {
    pub fn new(
        worker_ids: impl IntoIterator<Item = impl Into<WorkerId>>,
        service_parameters: ServiceParameters,
        year: i32,
        month: u32,
        timezone: &str,
    ) -> Self {
        Self {
            worker_ids: worker_ids.into_iter().map(Into::into).collect(),
            default_worker_id: None,
            service_parameters,
            year,
            month,
            timezone: timezone.to_string(),
            now: None,
            deadline: None,
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_default_worker(mut self, worker_id: impl Into<WorkerId>) -> Self {
        self.default_worker_id = Some(worker_id.into());
        self
    }

    /// Validate everything that can be checked locally, before any network
    /// call is made.
    ///
    /// # Errors
    /// Returns `InvalidServiceParameters`, `InvalidTimezone`, or `InvalidMonth`.
    pub fn resolve(&self) -> Result<ResolvedRequest> {
        self.service_parameters.validate()?;
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|_| SlotError::InvalidTimezone(self.timezone.clone()))?;
        let month = YearMonth::new(self.year, self.month)?;

        let mut workers: BTreeSet<WorkerId> = self.worker_ids.iter().cloned().collect();
        if workers.is_empty() {
            if let Some(default) = &self.default_worker_id {
                workers.insert(default.clone());
            }
        }

        Ok(ResolvedRequest {
            workers,
            params: self.service_parameters,
            month,
            tz,
            now: self.now.unwrap_or_else(Utc::now),
        })
    }
}

/// A validated request with `now` fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub workers: BTreeSet<WorkerId>,
    pub params: ServiceParameters,
    pub month: YearMonth,
    pub tz: Tz,
    pub now: DateTime<Utc>,
}

/// Computed slots plus any records that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailabilityResponse {
    pub slots: SlotsByDate,
    pub warnings: Vec<DataQualityWarning>,
}

impl AvailabilityResponse {
    pub fn slot_count(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }
}

/// Compute every bookable slot of the requested month.
///
/// Issues at most two provider calls, concurrently.
///
/// # Errors
/// Local validation errors are returned before any provider call.
/// `ProviderUnavailable` / `ProviderTimeout` are returned when the bulk load
/// fails; no partial result is ever produced.
#[instrument(
    skip_all,
    fields(year = request.year, month = request.month, timezone = %request.timezone)
)]
pub async fn compute_availability<P>(
    provider: &P,
    request: &AvailabilityRequest,
    config: &EngineConfig,
) -> Result<AvailabilityResponse>
where
    P: ProviderClient + ?Sized,
{
    config.validate()?;
    let resolved = request.resolve()?;

    if resolved.workers.is_empty() {
        debug!("no assigned or default worker, nothing to compute");
        return Ok(AvailabilityResponse::default());
    }

    let data = loader::load_month(
        provider,
        &resolved.workers,
        resolved.month,
        config,
        request.deadline,
    )
    .await?;

    let response = compute_from_month_data(&resolved, &data, config);
    info!(
        workers = resolved.workers.len(),
        dates = response.slots.len(),
        slots = response.slot_count(),
        warnings = response.warnings.len(),
        "availability computed"
    );
    Ok(response)
}

/// The in-memory part of the pipeline, over data that is already loaded.
pub fn compute_from_month_data(
    request: &ResolvedRequest,
    data: &MonthData,
    config: &EngineConfig,
) -> AvailabilityResponse {
    let mut warnings = Vec::new();
    let index = build_free_index(request, data, &mut warnings);
    let slots = slots_from_free_index(request, &index, config);
    AvailabilityResponse { slots, warnings }
}

/// Resolve windows and subtract busy time for every requested worker.
///
/// Workers with no free time at all are still present with an empty map.
/// Workers the provider did not return are absent and reported.
pub fn build_free_index(
    request: &ResolvedRequest,
    data: &MonthData,
    warnings: &mut Vec<DataQualityWarning>,
) -> WorkerFreeIndex {
    let schedules = subtract::schedules_by_worker(
        data.blocks_by_worker.values().flatten(),
        request.tz,
        warnings,
    );
    let no_busy_time = BusySchedule::default();

    let mut index = WorkerFreeIndex::new();
    for worker_id in &request.workers {
        let Some(record) = data.workers.get(worker_id) else {
            warning::record(
                warnings,
                DataQualityWarning::new(
                    WarningKind::UnknownWorker,
                    worker_id,
                    "assigned worker was not returned by the provider",
                ),
            );
            continue;
        };

        let parsed = windows::parse_windows(worker_id, &record.weekly_windows, warnings);
        let schedule = schedules.get(worker_id).unwrap_or(&no_busy_time);

        let by_date: BTreeMap<NaiveDate, Vec<Interval>> =
            windows::resolve_month(&parsed, request.month, request.tz)
                .into_iter()
                .filter_map(|(date, open)| {
                    let free = schedule.subtract(&open);
                    (!free.is_empty()).then_some((date, free))
                })
                .collect();

        debug!(
            worker = %worker_id,
            windows = parsed.len(),
            busy_periods = schedule.periods().len(),
            free_dates = by_date.len(),
            "worker resolved"
        );
        index.insert(worker_id.clone(), by_date);
    }
    index
}

/// Generate and aggregate slots for every date of the month.
pub fn slots_from_free_index(
    request: &ResolvedRequest,
    index: &WorkerFreeIndex,
    config: &EngineConfig,
) -> SlotsByDate {
    let not_before = slots::notice_cutoff(request.now, &request.params);
    let assigned = request.workers.len();

    let mut result = SlotsByDate::new();
    for date in request.month.days() {
        let candidates: BTreeMap<WorkerId, Vec<DateTime<Tz>>> = index
            .iter()
            .filter_map(|(worker, by_date)| {
                let free = by_date.get(&date)?;
                let starts = slots::generate_slots(
                    date,
                    free,
                    &request.params,
                    not_before,
                    config.dst_policy,
                );
                (!starts.is_empty()).then(|| (worker.clone(), starts))
            })
            .collect();

        if candidates.is_empty() {
            continue;
        }

        let day_slots = config.aggregation.aggregate(&candidates, assigned);
        if !day_slots.is_empty() {
            result.insert(date, day_slots);
        }
    }
    result
}
