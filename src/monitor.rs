//! Acquisition scheduler
//!
//! Runs one acquisition cycle immediately, then repeats it on a fixed
//! interval until shutdown. Each cycle fetches price then carbon in
//! sequence, bands the readings, and publishes display updates. Failure
//! handling is policy-driven: fatal, skip, or retry with a fixed delay.

use crate::carbon::CarbonFetcher;
use crate::classify::classify;
use crate::config::Config;
use crate::display::{DisplayUpdate, Metric, format_carbon, format_price};
use crate::error::{GridwatchError, Result};
use crate::logging::StructuredLogger;
use crate::price::PriceFetcher;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Duration, interval, sleep};

/// A source producing one aggregated reading per fetch
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch(&self) -> Result<f64>;
}

#[async_trait]
impl MetricSource for PriceFetcher {
    async fn fetch(&self) -> Result<f64> {
        self.fetch_average_price().await
    }
}

#[async_trait]
impl MetricSource for CarbonFetcher {
    async fn fetch(&self) -> Result<f64> {
        self.fetch_average_carbon_intensity().await
    }
}

/// What to do when a metric's fetch fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the failure and stop the loop
    Fatal,
    /// Publish nothing for the failed metric this tick, keep the loop alive
    Skip,
    /// Re-attempt the fetch a bounded number of times, then skip
    Retry,
}

impl FailurePolicy {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "fatal" => Ok(Self::Fatal),
            "skip" => Ok(Self::Skip),
            "retry" => Ok(Self::Retry),
            other => Err(GridwatchError::config(format!(
                "unknown failure policy: {}",
                other
            ))),
        }
    }
}

/// The periodic acquisition scheduler
pub struct Monitor<P: MetricSource, C: MetricSource> {
    config: Config,
    policy: FailurePolicy,
    price_source: P,
    carbon_source: C,
    update_tx: mpsc::UnboundedSender<DisplayUpdate>,
    shutdown_tx: mpsc::UnboundedSender<()>,
    shutdown_rx: mpsc::UnboundedReceiver<()>,
    logger: StructuredLogger,
    total_cycles: u64,
    overrun_count: u64,
}

impl Monitor<PriceFetcher, CarbonFetcher> {
    /// Create a monitor with fetchers built from the configuration
    pub fn new(config: Config, update_tx: mpsc::UnboundedSender<DisplayUpdate>) -> Result<Self> {
        let price_source = PriceFetcher::new(config.price.clone())?;
        let carbon_source = CarbonFetcher::new(config.carbon.clone())?;
        Self::with_sources(config, price_source, carbon_source, update_tx)
    }
}

impl<P: MetricSource, C: MetricSource> Monitor<P, C> {
    /// Create a monitor over explicit sources
    pub fn with_sources(
        config: Config,
        price_source: P,
        carbon_source: C,
        update_tx: mpsc::UnboundedSender<DisplayUpdate>,
    ) -> Result<Self> {
        let policy = FailurePolicy::from_name(&config.failure.policy)?;
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();
        let logger = crate::logging::get_logger("monitor");
        Ok(Self {
            config,
            policy,
            price_source,
            carbon_source,
            update_tx,
            shutdown_tx,
            shutdown_rx,
            logger,
            total_cycles: 0,
            overrun_count: 0,
        })
    }

    /// Sender that ends the loop after the in-flight cycle
    pub fn shutdown_handle(&self) -> mpsc::UnboundedSender<()> {
        self.shutdown_tx.clone()
    }

    /// Cycles completed so far
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Cycles that took longer than the poll interval
    pub fn overrun_count(&self) -> u64 {
        self.overrun_count
    }

    /// Run the acquisition loop.
    ///
    /// The first interval tick fires immediately and serves as the initial
    /// cycle; subsequent ticks repeat it at the configured period. Cycles
    /// never overlap.
    pub async fn run(&mut self) -> Result<()> {
        self.logger.info(&format!(
            "Starting acquisition loop (interval {} ms, policy {:?})",
            self.config.poll_interval_ms, self.policy
        ));

        let mut poll_interval = interval(Duration::from_millis(self.config.poll_interval_ms));

        loop {
            tokio::select! {
                _ = poll_interval.tick() => {
                    let cycle_started = std::time::Instant::now();
                    self.acquisition_cycle().await?;
                    let dur_ms = cycle_started.elapsed().as_millis() as u64;
                    self.total_cycles = self.total_cycles.saturating_add(1);
                    if dur_ms > self.config.poll_interval_ms {
                        self.overrun_count = self.overrun_count.saturating_add(1);
                    }
                }
                Some(_) = self.shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// One fetch->band->publish pass for both metrics, price before carbon
    async fn acquisition_cycle(&self) -> Result<()> {
        self.logger.debug("Starting acquisition cycle");

        if let Some(reading) = self.acquire(Metric::Price).await? {
            self.publish(Metric::Price, reading)?;
        }
        if let Some(reading) = self.acquire(Metric::Carbon).await? {
            self.publish(Metric::Carbon, reading)?;
        }

        self.logger.debug("Acquisition cycle completed");
        Ok(())
    }

    /// Fetch one metric under the failure policy.
    ///
    /// `Ok(None)` means the metric is skipped this tick; no stale or
    /// substitute value is ever published in its place.
    async fn acquire(&self, metric: Metric) -> Result<Option<f64>> {
        match self.fetch_with_retries(metric).await {
            Ok(reading) => Ok(Some(reading)),
            Err(e) if self.policy == FailurePolicy::Fatal => {
                self.logger
                    .error(&format!("{} acquisition failed: {}", metric.as_str(), e));
                Err(e)
            }
            Err(e) => {
                self.logger.warn(&format!(
                    "{} acquisition failed, skipping this tick: {}",
                    metric.as_str(),
                    e
                ));
                Ok(None)
            }
        }
    }

    async fn fetch_with_retries(&self, metric: Metric) -> Result<f64> {
        let max_retries = if self.policy == FailurePolicy::Retry {
            self.config.failure.max_retries
        } else {
            0
        };
        let mut attempt = 0u32;
        loop {
            let result = match metric {
                Metric::Price => self.price_source.fetch().await,
                Metric::Carbon => self.carbon_source.fetch().await,
            };
            match result {
                Ok(reading) => return Ok(reading),
                Err(e) if attempt < max_retries => {
                    attempt += 1;
                    self.logger.warn(&format!(
                        "{} fetch attempt {}/{} failed: {}",
                        metric.as_str(),
                        attempt,
                        max_retries,
                        e
                    ));
                    sleep(Duration::from_millis(self.config.failure.retry_delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn publish(&self, metric: Metric, reading: f64) -> Result<()> {
        let (thresholds, text) = match metric {
            Metric::Price => (
                &self.config.price.thresholds,
                format_price(reading, &self.config.display.currency_symbol),
            ),
            Metric::Carbon => (&self.config.carbon.thresholds, format_carbon(reading)),
        };
        let band = classify(reading, thresholds);

        self.logger.info(&format!(
            "{} reading {:.2} -> {} ({})",
            metric.as_str(),
            reading,
            text,
            band.as_str()
        ));

        self.update_tx
            .send(DisplayUpdate {
                metric,
                reading,
                text,
                band,
            })
            .map_err(|_| GridwatchError::generic("display update channel closed"))
    }
}
