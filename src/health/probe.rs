//! Backend probe contract and latency measurement.
//!
//! # Responsibilities
//! - Define the `Probe` trait implemented by each backend
//! - Time a probe end to end and turn its outcome into a `ProbeResult`
//! - Contain probe errors: they are logged here and never propagated

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::time::{self, Instant};

use crate::config::BackendKind;

/// Up/down verdict of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "up",
            Status::Down => "down",
        }
    }
}

impl From<bool> for Status {
    fn from(up: bool) -> Self {
        if up {
            Status::Up
        } else {
            Status::Down
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one probe, created fresh each cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub backend: BackendKind,
    pub status: Status,
    /// Wall-clock milliseconds, rounded to two decimals.
    pub elapsed_ms: f64,
}

/// Reasons a probe reports a backend as down.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The driver returned an error.
    #[error("driver error: {0}")]
    Driver(String),

    /// The backend answered, but not with the expected reply.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// The worker running a blocking query panicked or was cancelled.
    #[error("probe worker failed: {0}")]
    Worker(String),

    /// No reply within the configured timeout.
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The connection handle was never opened.
    #[error("connection unavailable: {0}")]
    Unavailable(String),
}

/// A liveness check against one backend's connection handle.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Which backend this probe targets.
    fn backend(&self) -> BackendKind;

    /// Issue the backend's minimal round-trip request.
    async fn ping(&self) -> Result<(), ProbeError>;
}

/// Stand-in for a backend whose connection could not be opened at startup.
///
/// Reports down on every cycle.
#[derive(Debug)]
pub struct UnavailableProbe {
    backend: BackendKind,
    reason: String,
}

impl UnavailableProbe {
    pub fn new(backend: BackendKind, reason: impl Into<String>) -> Self {
        Self {
            backend,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Probe for UnavailableProbe {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    async fn ping(&self) -> Result<(), ProbeError> {
        Err(ProbeError::Unavailable(self.reason.clone()))
    }
}

/// Round a duration to milliseconds with two decimals.
pub fn round_ms(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100_000.0).round() / 100.0
}

/// Run `probe` once, timing the whole call including any worker queueing.
pub async fn run_probe(probe: &dyn Probe, timeout: Option<Duration>) -> ProbeResult {
    let backend = probe.backend();
    let start = Instant::now();

    let outcome = match timeout {
        Some(limit) => match time::timeout(limit, probe.ping()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ProbeError::Timeout(limit)),
        },
        None => probe.ping().await,
    };

    let elapsed_ms = round_ms(start.elapsed());
    let status = match outcome {
        Ok(()) => Status::Up,
        Err(e) => {
            tracing::error!(backend = %backend, error = %e, "Probe failed");
            Status::Down
        }
    };

    tracing::info!(backend = %backend, status = %status, elapsed_ms, "Probe complete");

    ProbeResult {
        backend,
        status,
        elapsed_ms,
    }
}
