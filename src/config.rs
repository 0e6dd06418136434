//! Configuration management for Gridwatch
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files.

use crate::error::{GridwatchError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spot price source configuration
    pub price: PriceSourceConfig,

    /// Carbon intensity source configuration
    pub carbon: CarbonSourceConfig,

    /// Display formatting configuration
    pub display: DisplayConfig,

    /// Failure handling policy
    pub failure: FailureConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Refresh interval in milliseconds
    pub poll_interval_ms: u64,
}

/// Severity thresholds for one metric
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Values below this are LOW
    pub low: f64,

    /// Values above this are HIGH
    pub high: f64,
}

/// Spot price page scraping parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSourceConfig {
    /// URL of the live price page
    pub url: String,

    /// CSS selector matching the price list entries
    pub selector: String,

    /// Width of the leading currency/unit marker on each entry, in chars
    pub unit_marker_chars: usize,

    /// Severity thresholds for the price reading
    pub thresholds: ThresholdsConfig,
}

/// Carbon intensity API parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CarbonSourceConfig {
    /// Base URL of the state API
    pub endpoint: String,

    /// Request path used both for the call and the signature
    pub path: String,

    /// Origin header value expected by the upstream API
    pub origin: String,

    /// Referer header value expected by the upstream API
    pub referer: String,

    /// Browser-identifying User-Agent expected by the upstream API
    pub user_agent: String,

    /// Shared signing token. The upstream API embeds this in its web bundle;
    /// treated here as injected configuration so it can be rotated.
    pub signing_token: String,

    /// First grid zone key
    pub zone_a: String,

    /// Second grid zone key
    pub zone_b: String,

    /// Severity thresholds for the carbon reading
    pub thresholds: ThresholdsConfig,
}

/// Display formatting parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currency symbol prefixed to the formatted price
    pub currency_symbol: String,
}

/// Failure handling policy for acquisition cycles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureConfig {
    /// Policy name (fatal, skip, retry)
    pub policy: String,

    /// Extra attempts per fetch under the retry policy
    pub max_retries: u32,

    /// Delay between retry attempts in milliseconds
    pub retry_delay_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Path to log file (or directory for rolling logs)
    pub file: String,

    /// Number of rolled log files to keep
    pub backup_count: u32,

    /// Whether to log to console
    #[serde(default = "default_true")]
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            url: "https://www.em6live.co.nz/".to_string(),
            selector: "#priceList > li".to_string(),
            unit_marker_chars: 1,
            thresholds: ThresholdsConfig {
                low: 70.0,
                high: 150.0,
            },
        }
    }
}

impl Default for CarbonSourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.electricitymap.org".to_string(),
            path: "/v3/state".to_string(),
            origin: "https://www.electricitymap.org".to_string(),
            referer: "https://www.electricitymap.org/".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/87.0.4280.88 Safari/537.36"
                .to_string(),
            signing_token: "kUp26@Zg4fv$9Pm".to_string(),
            zone_a: "NZ-NZN".to_string(),
            zone_b: "NZ-NZS".to_string(),
            thresholds: ThresholdsConfig {
                low: 100.0,
                high: 250.0,
            },
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
        }
    }
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            policy: "fatal".to_string(),
            max_retries: 3,
            retry_delay_ms: 500,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: "/tmp/gridwatch.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            price: PriceSourceConfig::default(),
            carbon: CarbonSourceConfig::default(),
            display: DisplayConfig::default(),
            failure: FailureConfig::default(),
            logging: LoggingConfig::default(),
            poll_interval_ms: 600_000,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        let default_paths = [
            "gridwatch_config.yaml",
            "/data/gridwatch_config.yaml",
            "/etc/gridwatch/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        // Fall back to default configuration
        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.price.url.trim().is_empty() {
            return Err(GridwatchError::config("price.url must not be empty"));
        }
        if self.price.selector.trim().is_empty() {
            return Err(GridwatchError::config("price.selector must not be empty"));
        }
        if self.carbon.endpoint.trim().is_empty() {
            return Err(GridwatchError::config("carbon.endpoint must not be empty"));
        }
        if self.carbon.path.trim().is_empty() {
            return Err(GridwatchError::config("carbon.path must not be empty"));
        }
        if self.carbon.zone_a.trim().is_empty() || self.carbon.zone_b.trim().is_empty() {
            return Err(GridwatchError::config(
                "carbon.zone_a and carbon.zone_b must not be empty",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(GridwatchError::config("poll_interval_ms must be positive"));
        }
        for (name, t) in [
            ("price.thresholds", &self.price.thresholds),
            ("carbon.thresholds", &self.carbon.thresholds),
        ] {
            if t.low > t.high {
                return Err(GridwatchError::config(format!(
                    "{}: low ({}) must not exceed high ({})",
                    name, t.low, t.high
                )));
            }
        }
        match self.failure.policy.as_str() {
            "fatal" | "skip" | "retry" => {}
            other => {
                return Err(GridwatchError::config(format!(
                    "unknown failure policy: {}",
                    other
                )));
            }
        }
        Ok(())
    }
}
