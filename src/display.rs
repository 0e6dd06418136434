//! Display update events and formatting
//!
//! The monitor never touches a display handle directly; it emits immutable
//! [`DisplayUpdate`] events on a channel, and the display collaborator
//! consumes them from its own task.

use crate::classify::SeverityBand;
use serde::{Deserialize, Serialize};

/// The two display regions fed by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Price,
    Carbon,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Carbon => "carbon",
        }
    }
}

/// One immutable update for one display region
#[derive(Debug, Clone)]
pub struct DisplayUpdate {
    /// Which region this update targets
    pub metric: Metric,

    /// The raw aggregated reading
    pub reading: f64,

    /// The reading formatted for display
    pub text: String,

    /// Severity band, carrying the region's display color
    pub band: SeverityBand,
}

/// Format a price reading: scaled from $/MWh to $/kWh, two decimals,
/// currency symbol prefix.
pub fn format_price(reading: f64, currency_symbol: &str) -> String {
    format!("{}{:.2}", currency_symbol, reading / 1000.0)
}

/// Format a carbon intensity reading: two decimals, no prefix
pub fn format_carbon(reading: f64) -> String {
    format!("{:.2}", reading)
}
