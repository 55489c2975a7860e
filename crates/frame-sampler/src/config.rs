//! Sampler configuration

use crate::SamplerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Time between ticks (milliseconds)
    pub interval_ms: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self { interval_ms: 1500 }
    }
}

impl SamplerConfig {
    /// Cadence of the live camera panel
    pub fn responsive() -> Self {
        Self::default()
    }

    /// Slower cadence for weak hardware
    pub fn relaxed() -> Self {
        Self { interval_ms: 2000 }
    }

    /// Tick period
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<(), SamplerError> {
        if self.interval_ms == 0 {
            return Err(SamplerError::Config("interval_ms must be positive".to_string()));
        }
        Ok(())
    }
}
