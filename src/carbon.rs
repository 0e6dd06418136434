//! Carbon intensity acquisition from the signed state API
//!
//! Each call is authenticated with a freshly computed time-bound signature
//! (see [`crate::signing`]). The response is deserialized into typed structs
//! covering only the consumed path `data.countries[zone].co2intensity`; any
//! shape mismatch surfaces as a single descriptive parse error.

use crate::config::CarbonSourceConfig;
use crate::error::{GridwatchError, Result};
use crate::logging::StructuredLogger;
use crate::signing::{SecretProvider, SignedRequest, StaticSecretProvider};
use reqwest::header::{ORIGIN, REFERER, USER_AGENT};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct StateResponse {
    data: StateData,
}

#[derive(Debug, Deserialize)]
struct StateData {
    countries: HashMap<String, ZoneState>,
}

#[derive(Debug, Deserialize)]
struct ZoneState {
    co2intensity: Option<f64>,
}

/// Fetcher for the grid carbon intensity
pub struct CarbonFetcher {
    client: reqwest::Client,
    config: CarbonSourceConfig,
    secrets: Arc<dyn SecretProvider>,
    logger: StructuredLogger,
}

impl CarbonFetcher {
    /// Create a new carbon fetcher using the configured signing token
    pub fn new(config: CarbonSourceConfig) -> Result<Self> {
        let secrets = Arc::new(StaticSecretProvider::new(config.signing_token.clone()));
        Self::with_secret_provider(config, secrets)
    }

    /// Create a carbon fetcher with an injected secret provider
    pub fn with_secret_provider(
        config: CarbonSourceConfig,
        secrets: Arc<dyn SecretProvider>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        let logger = crate::logging::get_logger("carbon");
        Ok(Self {
            client,
            config,
            secrets,
            logger,
        })
    }

    /// Retrieve the state document and return the mean intensity of the two
    /// configured zones.
    ///
    /// The signature embeds the request timestamp, so it is recomputed here
    /// on every call and never reused.
    pub async fn fetch_average_carbon_intensity(&self) -> Result<f64> {
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        let token = self.secrets.signing_token()?;
        let signed = SignedRequest::new(&token, &self.config.path, timestamp_ms)?;

        let url = format!("{}{}", self.config.endpoint, signed.path());
        let resp = self
            .client
            .get(&url)
            .header(ORIGIN, &self.config.origin)
            .header(REFERER, &self.config.referer)
            .header(USER_AGENT, &self.config.user_agent)
            .header("x-request-timestamp", signed.timestamp_header())
            .header("x-signature", signed.signature())
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(GridwatchError::fetch(format!(
                "state API returned {}",
                resp.status()
            )));
        }
        let body = resp.text().await?;

        let reading = average_zone_intensity(&body, &self.config.zone_a, &self.config.zone_b)?;
        self.logger.debug(&format!(
            "Averaged zones {} and {} to {:.2}",
            self.config.zone_a, self.config.zone_b, reading
        ));
        Ok(reading)
    }
}

/// Parse a state API body and average the intensity of the two given zones.
///
/// The two-zone mean is a fixed policy for a grid split into exactly two
/// reporting zones, not a general multi-zone aggregation.
pub fn average_zone_intensity(body: &str, zone_a: &str, zone_b: &str) -> Result<f64> {
    let state: StateResponse = serde_json::from_str(body)?;
    let a = zone_intensity(&state, zone_a)?;
    let b = zone_intensity(&state, zone_b)?;
    Ok((a + b) / 2.0)
}

fn zone_intensity(state: &StateResponse, zone: &str) -> Result<f64> {
    let entry = state.data.countries.get(zone).ok_or_else(|| {
        GridwatchError::parse(format!("zone '{}' missing from state response", zone))
    })?;
    entry.co2intensity.ok_or_else(|| {
        GridwatchError::parse(format!("zone '{}' carries no co2intensity value", zone))
    })
}
