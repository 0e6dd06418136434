use async_trait::async_trait;
use gridwatch::classify::SeverityBand;
use gridwatch::config::Config;
use gridwatch::display::{DisplayUpdate, Metric};
use gridwatch::error::{GridwatchError, Result};
use gridwatch::monitor::{MetricSource, Monitor};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::mpsc;
use tokio::time::{Duration, timeout};

struct FixedSource(f64);

#[async_trait]
impl MetricSource for FixedSource {
    async fn fetch(&self) -> Result<f64> {
        Ok(self.0)
    }
}

struct FailingSource;

#[async_trait]
impl MetricSource for FailingSource {
    async fn fetch(&self) -> Result<f64> {
        Err(GridwatchError::fetch("stubbed outage"))
    }
}

/// Fails the first `fail_first` calls, then succeeds with a fixed value
struct FlakySource {
    fail_first: u32,
    value: f64,
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl MetricSource for FlakySource {
    async fn fetch(&self) -> Result<f64> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            Err(GridwatchError::fetch("stubbed transient outage"))
        } else {
            Ok(self.value)
        }
    }
}

fn fast_config(policy: &str) -> Config {
    let mut config = Config::default();
    config.poll_interval_ms = 20;
    config.failure.policy = policy.to_string();
    config.failure.max_retries = 3;
    config.failure.retry_delay_ms = 1;
    config
}

/// Interval long enough that only the initial cycle runs during a test
fn single_cycle_config(policy: &str) -> Config {
    let mut config = fast_config(policy);
    config.poll_interval_ms = 60_000;
    config
}

async fn recv_updates(
    rx: &mut mpsc::UnboundedReceiver<DisplayUpdate>,
    count: usize,
) -> Vec<DisplayUpdate> {
    let mut updates = Vec::with_capacity(count);
    for _ in 0..count {
        let update = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for display update")
            .expect("update channel closed");
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn initial_cycle_plus_three_ticks_publish_in_strict_order() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut monitor =
        Monitor::with_sources(fast_config("fatal"), FixedSource(90.0), FixedSource(100.0), tx)
            .unwrap();
    let shutdown = monitor.shutdown_handle();

    let handle = tokio::spawn(async move {
        let result = monitor.run().await;
        result.map(|_| monitor)
    });

    // 1 initial cycle + 3 ticks, two updates each
    let updates = recv_updates(&mut rx, 8).await;
    shutdown.send(()).unwrap();
    let monitor = handle.await.unwrap().unwrap();

    for pair in updates.chunks(2) {
        assert_eq!(pair[0].metric, Metric::Price);
        assert_eq!(pair[1].metric, Metric::Carbon);
    }
    assert_eq!(
        updates.iter().filter(|u| u.metric == Metric::Price).count(),
        4
    );
    assert_eq!(
        updates.iter().filter(|u| u.metric == Metric::Carbon).count(),
        4
    );
    assert!(monitor.total_cycles() >= 4);

    let price = &updates[0];
    assert_eq!(price.reading, 90.0);
    assert_eq!(price.text, "$0.09");
    assert_eq!(price.band, SeverityBand::Medium);

    let carbon = &updates[1];
    assert_eq!(carbon.reading, 100.0);
    assert_eq!(carbon.text, "100.00");
    assert_eq!(carbon.band, SeverityBand::Medium);
}

#[tokio::test]
async fn fatal_policy_propagates_the_first_failure() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut monitor =
        Monitor::with_sources(fast_config("fatal"), FailingSource, FixedSource(100.0), tx).unwrap();

    let err = monitor.run().await.unwrap_err();
    assert!(matches!(err, GridwatchError::Fetch { .. }));

    // Price failed before carbon was attempted; nothing was published.
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn skip_policy_keeps_the_healthy_metric_flowing() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut monitor =
        Monitor::with_sources(fast_config("skip"), FailingSource, FixedSource(100.0), tx).unwrap();
    let shutdown = monitor.shutdown_handle();

    let handle = tokio::spawn(async move { monitor.run().await });

    // Two full cycles: the failed price metric publishes nothing, carbon
    // still arrives and the loop stays alive.
    let updates = recv_updates(&mut rx, 2).await;
    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert!(updates.iter().all(|u| u.metric == Metric::Carbon));
    assert!(updates.iter().all(|u| u.reading == 100.0));
}

#[tokio::test]
async fn retry_policy_recovers_from_transient_failures() {
    let calls = Arc::new(AtomicU32::new(0));
    let price_source = FlakySource {
        fail_first: 2,
        value: 75.0,
        calls: calls.clone(),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut monitor = Monitor::with_sources(
        single_cycle_config("retry"),
        price_source,
        FixedSource(100.0),
        tx,
    )
    .unwrap();
    let shutdown = monitor.shutdown_handle();

    let handle = tokio::spawn(async move { monitor.run().await });

    let updates = recv_updates(&mut rx, 2).await;
    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();

    // Two failed attempts plus the successful third
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(updates[0].metric, Metric::Price);
    assert_eq!(updates[0].reading, 75.0);
    assert_eq!(updates[0].band, SeverityBand::Medium);
    assert_eq!(updates[1].metric, Metric::Carbon);
}

#[tokio::test]
async fn retry_exhaustion_degrades_to_skip() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut monitor = Monitor::with_sources(
        single_cycle_config("retry"),
        FailingSource,
        FixedSource(100.0),
        tx,
    )
    .unwrap();
    let shutdown = monitor.shutdown_handle();

    let handle = tokio::spawn(async move { monitor.run().await });

    let updates = recv_updates(&mut rx, 1).await;
    shutdown.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(updates[0].metric, Metric::Carbon);
}

#[test]
fn unknown_policy_is_rejected_at_construction() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let err = Monitor::with_sources(
        fast_config("panic"),
        FixedSource(1.0),
        FixedSource(2.0),
        tx,
    )
    .unwrap_err();
    assert!(matches!(err, GridwatchError::Config { .. }));
}
