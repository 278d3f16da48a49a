//! Startup orchestration.
//!
//! # Responsibilities
//! - Open one connection handle per enabled backend
//! - Warm up the MongoDB client outside of any measured cycle
//! - Assemble the `Monitor` that owns every handle
//!
//! # Design Decisions
//! - Strict mode: a failed open is fatal
//! - Optional mode: a failed open leaves a probe that reports down each cycle
//! - Handles are never recreated once the monitor is running

use tokio::time;

use crate::config::{BackendKind, MonitorConfig, ValidationMode};
use crate::error::{Error, Result};
use crate::health::{MariaDbProbe, MongoProbe, Monitor, MonitoredBackend, Probe, UnavailableProbe};
use crate::report::HttpReporter;

/// Keep the probe on success; on failure either abort or substitute a
/// probe that always reports down, depending on the mode.
fn opened_or_unavailable<P>(
    mode: ValidationMode,
    backend: BackendKind,
    opened: Result<P>,
) -> Result<Box<dyn Probe>>
where
    P: Probe + 'static,
{
    match opened {
        Ok(probe) => {
            tracing::info!(backend = %backend, "Connection handle opened");
            Ok(Box::new(probe))
        }
        Err(e) if mode == ValidationMode::Strict => Err(e),
        Err(e) => {
            tracing::error!(
                backend = %backend,
                error = %e,
                "Connection failed, backend will report down"
            );
            Ok(Box::new(UnavailableProbe::new(backend, e.to_string())))
        }
    }
}

/// Open connections and build the monitor for `config`.
pub async fn build_monitor(config: &MonitorConfig) -> Result<Monitor> {
    let reporter = HttpReporter::new(config.timeout).map_err(Error::HttpClient)?;
    let mut backends = Vec::with_capacity(2);

    if let Some(mongo) = &config.mongo {
        let opened = MongoProbe::connect(mongo).await.map_err(Error::MongoConnect);
        if let Ok(probe) = &opened {
            match config.timeout {
                Some(limit) => {
                    let _ = time::timeout(limit, probe.warm_up()).await;
                }
                None => probe.warm_up().await,
            }
        }
        let probe = opened_or_unavailable(config.mode, BackendKind::MongoDb, opened)?;
        backends.push(MonitoredBackend::new(probe, mongo.healthcheck_url.clone()));
    }

    if let Some(mariadb) = &config.mariadb {
        let opened = MariaDbProbe::connect(mariadb, config.timeout).await;
        let probe = opened_or_unavailable(config.mode, BackendKind::MariaDb, opened)?;
        backends.push(MonitoredBackend::new(probe, mariadb.healthcheck_url.clone()));
    }

    if backends.is_empty() {
        tracing::warn!("No backends enabled; cycles will only sleep");
    }

    Ok(Monitor::new(
        backends,
        Box::new(reporter),
        config.interval,
        config.timeout,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MariaDbConfig;
    use crate::health::Status;
    use url::Url;

    fn unreachable_mariadb() -> MariaDbConfig {
        MariaDbConfig {
            user: "monitor".into(),
            password: "secret".into(),
            host: "127.0.0.1".into(),
            port: 1,
            healthcheck_url: Url::parse("http://127.0.0.1:1/push").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_strict_mode_connection_failure_is_fatal() {
        let config = MonitorConfig {
            mode: ValidationMode::Strict,
            mariadb: Some(unreachable_mariadb()),
            ..Default::default()
        };
        let err = build_monitor(&config).await.err().unwrap();
        assert!(matches!(err, Error::MariaDbConnect(_)));
    }

    #[tokio::test]
    async fn test_optional_mode_connection_failure_reports_down() {
        let config = MonitorConfig {
            mariadb: Some(unreachable_mariadb()),
            ..Default::default()
        };
        let monitor = build_monitor(&config).await.unwrap();
        assert_eq!(monitor.backend_count(), 1);

        let results = monitor.run_cycle().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].backend, BackendKind::MariaDb);
        assert_eq!(results[0].status, Status::Down);
    }

    #[tokio::test]
    async fn test_nothing_enabled() {
        let monitor = build_monitor(&MonitorConfig::default()).await.unwrap();
        assert_eq!(monitor.backend_count(), 0);
    }
}
