//! Probe-and-report scheduling loop.
//!
//! # Responsibilities
//! - Probe each enabled backend in a fixed order, then push its status
//! - Keep one backend's failure from affecting another or the next cycle
//! - Hold cycle starts `interval` apart, compensating for time spent probing

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::Instrument;
use url::Url;

use crate::health::probe::{run_probe, Probe, ProbeResult};
use crate::report::Reporter;

/// One enabled backend: its probe and where its status goes.
pub struct MonitoredBackend {
    probe: Box<dyn Probe>,
    endpoint: Url,
}

impl MonitoredBackend {
    pub fn new(probe: Box<dyn Probe>, endpoint: Url) -> Self {
        Self { probe, endpoint }
    }
}

/// Owns every connection handle and the reporter for the process lifetime.
pub struct Monitor {
    backends: Vec<MonitoredBackend>,
    reporter: Box<dyn Reporter>,
    interval: Duration,
    timeout: Option<Duration>,
}

impl Monitor {
    /// Backends are probed in the order given.
    pub fn new(
        backends: Vec<MonitoredBackend>,
        reporter: Box<dyn Reporter>,
        interval: Duration,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            backends,
            reporter,
            interval,
            timeout,
        }
    }

    pub fn backend_count(&self) -> usize {
        self.backends.len()
    }

    /// Run cycles until the process is terminated.
    pub async fn run(&self) {
        tracing::info!(
            backends = self.backends.len(),
            interval_secs = self.interval.as_secs_f64(),
            "Health monitor starting"
        );

        let mut cycle: u64 = 0;
        loop {
            cycle += 1;
            let started = Instant::now();

            self.run_cycle()
                .instrument(tracing::info_span!("cycle", n = cycle))
                .await;

            let remaining = self.interval.saturating_sub(started.elapsed());
            tracing::debug!(sleep_secs = remaining.as_secs_f64(), "Cycle finished");
            time::sleep(remaining).await;
        }
    }

    /// Probe and report every backend once.
    pub async fn run_cycle(&self) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(self.backends.len());

        for backend in &self.backends {
            let result = run_probe(backend.probe.as_ref(), self.timeout).await;

            match self
                .reporter
                .report(&backend.endpoint, result.status, result.elapsed_ms)
                .await
            {
                Ok(()) => {
                    tracing::info!(backend = %result.backend, "Healthcheck push succeeded");
                }
                Err(e) => {
                    tracing::warn!(
                        backend = %result.backend,
                        error = %e,
                        "Failed to send healthcheck"
                    );
                }
            }

            results.push(result);
        }

        results
    }
}
