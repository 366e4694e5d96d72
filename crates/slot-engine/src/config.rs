//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! max_retries = 1
//! fetch_timeout_ms = 5000
//! busy_padding_days = 1
//! aggregation = "any_worker"
//! dst_policy = "shift_forward"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::aggregate::AggregationPolicy;
use crate::dst::DstPolicy;
use crate::error::{Result, SlotError};

/// Upper bound for `max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 1;
/// Lower bound for `busy_padding_days`. Offsets reach 14 hours, so a block
/// stored under the neighbouring UTC date must still be fetched.
pub const MIN_BUSY_PADDING_DAYS: u32 = 1;
/// Upper bound for `busy_padding_days`.
pub const MAX_BUSY_PADDING_DAYS: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Extra attempts per bulk fetch after the first one fails.
    pub max_retries: u32,
    /// Timeout applied to each individual fetch attempt.
    pub fetch_timeout_ms: u64,
    /// Days fetched on each side of the month for busy blocks.
    pub busy_padding_days: u32,
    pub aggregation: AggregationPolicy,
    pub dst_policy: DstPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            fetch_timeout_ms: 5_000,
            busy_padding_days: 1,
            aggregation: AggregationPolicy::default(),
            dst_policy: DstPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidConfig` on malformed TOML, unknown keys, or
    /// out-of-range values.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: EngineConfig =
            toml::from_str(raw).map_err(|e| SlotError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidConfig` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SlotError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    /// # Errors
    /// Returns `SlotError::InvalidConfig` for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(SlotError::InvalidConfig(format!(
                "max_retries must be at most {}, got {}",
                MAX_RETRIES_LIMIT, self.max_retries
            )));
        }
        if self.fetch_timeout_ms == 0 {
            return Err(SlotError::InvalidConfig(
                "fetch_timeout_ms must be positive".to_string(),
            ));
        }
        if !(MIN_BUSY_PADDING_DAYS..=MAX_BUSY_PADDING_DAYS).contains(&self.busy_padding_days) {
            return Err(SlotError::InvalidConfig(format!(
                "busy_padding_days must be between {} and {}, got {}",
                MIN_BUSY_PADDING_DAYS, MAX_BUSY_PADDING_DAYS, self.busy_padding_days
            )));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
