//! Error types for slot-engine operations.
//!
//! Only request-level failures live here. Bad individual records (a weekly
//! window that does not parse, a busy block that ends before it starts) are
//! reported as [`DataQualityWarning`](crate::warning::DataQualityWarning)s and
//! never abort a request.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid service parameters: {0}")]
    InvalidServiceParameters(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A bulk provider fetch failed after the bounded retry.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// A bulk provider fetch was still outstanding when its deadline elapsed.
    #[error("Provider timeout: {0}")]
    ProviderTimeout(String),
}

/// Errors reported by a [`ProviderClient`](crate::provider::ProviderClient)
/// implementation for a single fetch attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("provider request timed out")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, SlotError>;
