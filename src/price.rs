//! Spot price acquisition from the live market page
//!
//! The price source is an HTML page carrying one list entry per trading
//! region. Each entry's text is a one-character unit marker followed by a
//! decimal number; the reading is the mean over all entries.

use crate::config::PriceSourceConfig;
use crate::error::{GridwatchError, Result};
use crate::logging::StructuredLogger;
use scraper::{Html, Selector};

/// Fetcher for the scraped spot price
pub struct PriceFetcher {
    client: reqwest::Client,
    config: PriceSourceConfig,
    logger: StructuredLogger,
}

impl PriceFetcher {
    /// Create a new price fetcher for the configured page
    pub fn new(config: PriceSourceConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        let logger = crate::logging::get_logger("price");
        Ok(Self {
            client,
            config,
            logger,
        })
    }

    /// Retrieve the page and return the mean of all listed prices.
    ///
    /// One outbound GET, no internal retries; any unparsable entry fails the
    /// whole cycle rather than being skipped.
    pub async fn fetch_average_price(&self) -> Result<f64> {
        let resp = self.client.get(&self.config.url).send().await?;
        if !resp.status().is_success() {
            return Err(GridwatchError::fetch(format!(
                "price page returned {}",
                resp.status()
            )));
        }
        let body = resp.text().await?;

        let reading =
            average_price_document(&body, &self.config.selector, self.config.unit_marker_chars)?;
        self.logger
            .debug(&format!("Averaged price entries to {:.2}", reading));
        Ok(reading)
    }
}

/// Extract and average all price entries in an HTML document.
///
/// Fails with a parse error when no element matches the selector; a reading
/// is never derived from an empty collection.
pub fn average_price_document(
    html: &str,
    selector: &str,
    unit_marker_chars: usize,
) -> Result<f64> {
    let samples = extract_prices(html, selector, unit_marker_chars)?;
    mean(&samples).ok_or_else(|| {
        GridwatchError::parse(format!("no price entries matched selector '{}'", selector))
    })
}

/// Extract all price samples from an HTML document.
///
/// Every element matched by `selector` contributes one sample: its text
/// content with the leading `unit_marker_chars` characters stripped, parsed
/// as a decimal number.
pub fn extract_prices(html: &str, selector: &str, unit_marker_chars: usize) -> Result<Vec<f64>> {
    let selector = Selector::parse(selector)
        .map_err(|e| GridwatchError::fetch(format!("invalid price selector: {}", e)))?;
    let document = Html::parse_document(html);

    let mut samples = Vec::new();
    for element in document.select(&selector) {
        let text: String = element.text().collect();
        let trimmed = text.trim();
        let numeric: String = trimmed.chars().skip(unit_marker_chars).collect();
        let value: f64 = numeric.trim().parse().map_err(|_| {
            GridwatchError::parse(format!("price entry '{}' is not a number", trimmed))
        })?;
        samples.push(value);
    }
    Ok(samples)
}

/// Arithmetic mean, or `None` for an empty slice.
///
/// A reading must always be the mean of a non-empty collection; callers turn
/// `None` into a parse error instead of emitting NaN.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_matches_sum_over_len() {
        assert_eq!(mean(&[50.0, 90.0, 130.0]), Some(90.0));
        assert_eq!(mean(&[42.5]), Some(42.5));
        let values = [1.25, 2.5, 3.75, 10.0];
        assert_eq!(
            mean(&values),
            Some(values.iter().sum::<f64>() / values.len() as f64)
        );
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }
}
