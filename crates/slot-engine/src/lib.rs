//! # slot-engine
//!
//! Bookable-slot computation for appointment services.
//!
//! Given the workers assigned to a service, their recurring weekly working
//! hours, their committed busy blocks, and the service's booking parameters,
//! the engine produces every bookable start time of a month. Provider data is
//! fetched with two concurrent bulk calls; everything after that is a pure,
//! in-memory pipeline that is rebuilt for every request.
//!
//! ## Modules
//!
//! - [`availability`]: Request entry point and pipeline orchestration
//! - [`loader`]: Concurrent bulk fetch of workers and busy blocks
//! - [`windows`]: Weekly windows → per-date open intervals
//! - [`subtract`]: Open intervals minus busy blocks
//! - [`slots`]: Free intervals → candidate start times
//! - [`aggregate`]: Per-worker candidates → slots (union or intersection)
//! - [`dst`]: Wall-clock resolution and DST gap policy
//! - [`provider`]: Provider client contract and an in-memory implementation
//! - [`config`]: TOML-loadable engine configuration
//! - [`model`]: Data model
//! - [`warning`]: Non-fatal data-quality warnings
//! - [`error`]: Error types

pub mod aggregate;
pub mod availability;
pub mod config;
pub mod dst;
pub mod error;
pub mod loader;
pub mod model;
pub mod provider;
pub mod slots;
pub mod subtract;
pub mod warning;
pub mod windows;

pub use aggregate::{aggregate_slots, AggregationPolicy};
pub use availability::{
    build_free_index, compute_availability, compute_from_month_data, slots_from_free_index,
    AvailabilityRequest, AvailabilityResponse, ResolvedRequest, SlotsByDate, WorkerFreeIndex,
};
pub use config::EngineConfig;
pub use dst::DstPolicy;
pub use error::{ProviderError, SlotError};
pub use loader::{load_month, MonthData};
pub use model::{
    BusyBlock, DateRange, Interval, ServiceParameters, Slot, WeeklyWindow, WorkerId, WorkerRecord,
    YearMonth,
};
pub use provider::{InMemoryProvider, ProviderClient};
pub use slots::generate_slots;
pub use subtract::{subtract_busy, BusySchedule};
pub use warning::{DataQualityWarning, WarningKind};
pub use windows::resolve_month;
