//! Severity banding for aggregated readings
//!
//! A reading is banded LOW/MEDIUM/HIGH against a per-metric threshold pair;
//! each band carries the display color used by the sink.

use crate::config::ThresholdsConfig;
use serde::{Deserialize, Serialize};

/// Severity band for a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityBand {
    Low,
    Medium,
    High,
}

impl SeverityBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    /// Display color associated with the band
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "green",
            Self::Medium => "orange",
            Self::High => "red",
        }
    }
}

/// Band a reading against a threshold pair.
///
/// Values strictly below `low` are LOW, values strictly above `high` are
/// HIGH, everything in the closed interval `[low, high]` is MEDIUM.
pub fn classify(value: f64, thresholds: &ThresholdsConfig) -> SeverityBand {
    if value < thresholds.low {
        SeverityBand::Low
    } else if value <= thresholds.high {
        SeverityBand::Medium
    } else {
        SeverityBand::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(low: f64, high: f64) -> ThresholdsConfig {
        ThresholdsConfig { low, high }
    }

    #[test]
    fn band_labels_and_colors() {
        assert_eq!(SeverityBand::Low.as_str(), "LOW");
        assert_eq!(SeverityBand::Low.color(), "green");
        assert_eq!(SeverityBand::Medium.color(), "orange");
        assert_eq!(SeverityBand::High.color(), "red");
    }

    #[test]
    fn thresholds_are_inclusive_for_medium() {
        let thresholds = t(70.0, 150.0);
        assert_eq!(classify(70.0, &thresholds), SeverityBand::Medium);
        assert_eq!(classify(69.999, &thresholds), SeverityBand::Low);
        assert_eq!(classify(150.0, &thresholds), SeverityBand::Medium);
        assert_eq!(classify(150.001, &thresholds), SeverityBand::High);
    }
}
