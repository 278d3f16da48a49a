//! Backend enablement and semantic validation.
//!
//! # Responsibilities
//! - Decide per backend whether all of its required settings are present
//! - Apply the optional/strict missing-settings policy
//! - Validate value ranges (interval, timeout) and push URLs
//!
//! # Design Decisions
//! - Reports every missing key, not just the first
//! - Resolution is a pure function: Settings → Result<MonitorConfig, ConfigError>
//! - Present-but-malformed values are fatal in both modes

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::loader::Settings;
use crate::config::schema::{
    BackendKind, MariaDbConfig, MongoConfig, MonitorConfig, ValidationMode,
};

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Strict mode found required settings absent.
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),

    /// A push URL could not be parsed.
    #[error("{key} is not a valid URL: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },

    /// A push URL uses something other than http(s).
    #[error("{key} must use http or https, got {scheme}")]
    UnsupportedScheme { key: &'static str, scheme: String },

    /// Interval is negative, NaN, infinite or too large.
    #[error("HEALTHCHECK_INTERVAL must be a non-negative number of seconds, got {0}")]
    InvalidInterval(f64),

    /// Timeout is non-positive, NaN, infinite or too large.
    #[error("HEALTHCHECK_TIMEOUT must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),
}

/// Treat empty strings the same as unset variables.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn missing_keys(required: &[(&'static str, &Option<String>)]) -> Vec<&'static str> {
    required
        .iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(key, _)| *key)
        .collect()
}

fn parse_push_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl { key, source })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme {
            key,
            scheme: other.to_string(),
        }),
    }
}

/// Resolve raw settings into a [`MonitorConfig`] under the given policy.
pub fn resolve(settings: &Settings, mode: ValidationMode) -> Result<MonitorConfig, ConfigError> {
    let missing_mongo = missing_keys(&[
        ("MONGO_URI", &settings.mongo_uri),
        ("MONGO_HEALTHCHECK_URL", &settings.mongo_healthcheck_url),
    ]);
    let missing_mariadb = missing_keys(&[
        ("MARIADB_USER", &settings.mariadb_user),
        ("MARIADB_PASSWORD", &settings.mariadb_password),
        ("MARIADB_HOST", &settings.mariadb_host),
        ("MARIADB_HEALTHCHECK_URL", &settings.mariadb_healthcheck_url),
    ]);

    if mode == ValidationMode::Strict && !(missing_mongo.is_empty() && missing_mariadb.is_empty()) {
        let mut all = missing_mongo;
        all.extend(missing_mariadb);
        return Err(ConfigError::MissingKeys(all));
    }

    let interval = Duration::try_from_secs_f64(settings.interval)
        .map_err(|_| ConfigError::InvalidInterval(settings.interval))?;
    let timeout = match settings.timeout {
        Some(secs) if secs <= 0.0 => return Err(ConfigError::InvalidTimeout(secs)),
        Some(secs) => Some(
            Duration::try_from_secs_f64(secs).map_err(|_| ConfigError::InvalidTimeout(secs))?,
        ),
        None => None,
    };

    let mongo = match (
        present(&settings.mongo_uri),
        present(&settings.mongo_healthcheck_url),
    ) {
        (Some(uri), Some(url)) => Some(MongoConfig {
            uri: uri.to_string(),
            healthcheck_url: parse_push_url("MONGO_HEALTHCHECK_URL", url)?,
        }),
        _ => {
            tracing::info!(
                backend = %BackendKind::MongoDb,
                missing = ?missing_mongo,
                "Checks disabled: configuration incomplete"
            );
            None
        }
    };

    let mariadb = match (
        present(&settings.mariadb_user),
        present(&settings.mariadb_password),
        present(&settings.mariadb_host),
        present(&settings.mariadb_healthcheck_url),
    ) {
        (Some(user), Some(password), Some(host), Some(url)) => Some(MariaDbConfig {
            user: user.to_string(),
            password: password.to_string(),
            host: host.to_string(),
            port: settings.mariadb_port,
            healthcheck_url: parse_push_url("MARIADB_HEALTHCHECK_URL", url)?,
        }),
        _ => {
            tracing::info!(
                backend = %BackendKind::MariaDb,
                missing = ?missing_mariadb,
                "Checks disabled: configuration incomplete"
            );
            None
        }
    };

    Ok(MonitorConfig {
        mode,
        mongo,
        mariadb,
        interval,
        timeout,
    })
}
