use anyhow::Result;
use gridwatch::display::DisplayUpdate;
use gridwatch::monitor::Monitor;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = gridwatch::config::Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    gridwatch::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Gridwatch electricity market monitor starting up");

    // Display updates flow over a channel; the sink consumes them from its
    // own task as the single reader.
    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<DisplayUpdate>();

    let sink_task = tokio::spawn(async move {
        while let Some(update) = update_rx.recv().await {
            info!(
                "[{}] {} ({}, {})",
                update.metric.as_str(),
                update.text,
                update.band.as_str(),
                update.band.color()
            );
        }
    });

    let mut monitor = Monitor::new(config, update_tx)
        .map_err(|e| anyhow::anyhow!("Failed to create monitor: {}", e))?;

    match monitor.run().await {
        Ok(()) => {
            info!("Monitor shutdown complete");
            sink_task.abort();
            Ok(())
        }
        Err(e) => {
            error!("Monitor failed with error: {}", e);
            sink_task.abort();
            Err(anyhow::anyhow!("Monitor error: {}", e))
        }
    }
}
