//! MariaDB liveness probe.
//!
//! # Responsibilities
//! - Hold the single long-lived connection to the relational store
//! - Run `SELECT 1` on the blocking pool so the runtime keeps servicing
//!   timers and the HTTP client while the query is in flight
//! - Accept only a first-row, first-column value of 1
//!
//! # Design Decisions
//! - The connection sits behind a mutex only because the blocking closure
//!   must own a `'static` handle; the monitor awaits each probe, so the lock
//!   is uncontended unless a timed-out query is still running
//! - The configured timeout is also set as the driver's connect/read/write
//!   timeout, so an abandoned query returns its worker thread
//! - A probe that finds the lock held reports down instead of queueing
//!   another blocked worker behind the stuck one
//! - A poisoned lock is recovered; the driver reports a broken connection
//!   on the next query anyway

use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::time::Duration;

use async_trait::async_trait;
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Row, Value};

use crate::config::{BackendKind, MariaDbConfig};
use crate::error::{Error, Result};
use crate::health::probe::{Probe, ProbeError};

const LIVENESS_QUERY: &str = "SELECT 1";
const SENTINEL: i64 = 1;

/// Probe bound to one MariaDB connection.
pub struct MariaDbProbe {
    conn: Arc<Mutex<Conn>>,
}

/// Driver options for `config`; `timeout` bounds connect, read and write.
fn connect_opts(config: &MariaDbConfig, timeout: Option<Duration>) -> OptsBuilder {
    OptsBuilder::new()
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .ip_or_hostname(Some(config.host.clone()))
        .tcp_port(config.port)
        .tcp_connect_timeout(timeout)
        .read_timeout(timeout)
        .write_timeout(timeout)
}

/// Take the connection without waiting behind a query that is still running.
fn acquire<T>(conn: &Mutex<T>) -> std::result::Result<MutexGuard<'_, T>, ProbeError> {
    match conn.try_lock() {
        Ok(guard) => Ok(guard),
        Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => Err(ProbeError::Worker(
            "previous query still in flight".to_string(),
        )),
    }
}

impl MariaDbProbe {
    /// Open the connection on the blocking pool.
    pub async fn connect(config: &MariaDbConfig, timeout: Option<Duration>) -> Result<Self> {
        let opts = connect_opts(config, timeout);

        let conn = tokio::task::spawn_blocking(move || Conn::new(opts))
            .await
            .map_err(|e| Error::Worker(e.to_string()))?
            .map_err(Error::MariaDbConnect)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl std::fmt::Debug for MariaDbProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MariaDbProbe").finish_non_exhaustive()
    }
}

/// Whether the scalar returned by the liveness query is the sentinel.
///
/// The text protocol hands integers back as bytes, so the value is converted
/// rather than matched on its variant.
pub fn scalar_is_sentinel(value: Option<&Value>) -> bool {
    matches!(
        value.map(|v| mysql::from_value_opt::<i64>(v.clone())),
        Some(Ok(SENTINEL))
    )
}

#[async_trait]
impl Probe for MariaDbProbe {
    fn backend(&self) -> BackendKind {
        BackendKind::MariaDb
    }

    async fn ping(&self) -> std::result::Result<(), ProbeError> {
        let conn = Arc::clone(&self.conn);

        let scalar = tokio::task::spawn_blocking(move || {
            let mut guard = acquire(&*conn)?;
            let row: Option<Row> = guard
                .query_first(LIVENESS_QUERY)
                .map_err(|e| ProbeError::Driver(e.to_string()))?;
            Ok::<_, ProbeError>(row.and_then(|r| r.as_ref(0).cloned()))
        })
        .await
        .map_err(|e| ProbeError::Worker(e.to_string()))??;

        tracing::debug!(response = ?scalar, "MariaDB response");

        if scalar_is_sentinel(scalar.as_ref()) {
            Ok(())
        } else {
            Err(ProbeError::UnexpectedReply(format!("{:?}", scalar)))
        }
    }
}
