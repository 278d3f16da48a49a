//! Database liveness sidecar.
//!
//! Probes MongoDB and MariaDB on a fixed interval and pushes each backend's
//! up/down status and round-trip latency to a healthcheck endpoint.
//!
//! # Architecture Overview
//!
//! ```text
//!   flags / env ──▶ config ──▶ lifecycle::startup ──▶ health::Monitor
//!                  (enable)     (open handles)            │
//!                                                         │ every interval
//!                                                         ▼
//!                               ┌───────────────┐   ┌──────────────┐
//!                               │ MongoProbe    │──▶│              │
//!                               │ (ping)        │   │ HttpReporter │──▶ POST <url>?status=..&ping=..
//!                               ├───────────────┤   │              │
//!                               │ MariaDbProbe  │──▶│              │
//!                               │ (SELECT 1)    │   └──────────────┘
//!                               └───────────────┘
//! ```

use clap::Parser;

use store_sentinel::config::Settings;
use store_sentinel::lifecycle::build_monitor;
use store_sentinel::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::parse();
    logging::init(settings.log_json);

    tracing::info!("store-sentinel v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings.resolve().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        store_sentinel::Error::from(e)
    })?;

    tracing::info!(
        mode = ?config.mode,
        backends = ?config.enabled_backends(),
        interval_secs = config.interval.as_secs_f64(),
        timeout_secs = config.timeout.map(|t| t.as_secs_f64()),
        "Configuration loaded"
    );

    let monitor = build_monitor(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        e
    })?;

    monitor.run().await;
    Ok(())
}
