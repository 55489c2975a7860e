//! Stress bands

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical stress severity, least severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StressBand {
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Low-Moderate")]
    LowModerate,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "Moderate-High")]
    ModerateHigh,
    #[serde(rename = "High")]
    High,
}

impl StressBand {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            StressBand::Low => "Low",
            StressBand::LowModerate => "Low-Moderate",
            StressBand::Moderate => "Moderate",
            StressBand::ModerateHigh => "Moderate-High",
            StressBand::High => "High",
        }
    }

    /// Caption in the "High Stress" style used by the camera panel
    pub fn caption(&self) -> String {
        format!("{} Stress", self.label())
    }
}

impl fmt::Display for StressBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
