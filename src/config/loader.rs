//! Configuration loading from the command line and environment.

use clap::Parser;

use crate::config::schema::{MonitorConfig, ValidationMode, DEFAULT_MARIADB_PORT};
use crate::config::validation::{self, ConfigError};

/// Raw settings as supplied by flags or environment variables.
///
/// Every backend setting is optional here; whether a missing value disables
/// a backend or aborts startup is decided by [`Settings::resolve`].
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "store-sentinel")]
#[command(about = "Pushes MongoDB and MariaDB liveness to a healthcheck endpoint", long_about = None)]
pub struct Settings {
    /// MongoDB connection string
    #[arg(long, env = "MONGO_URI", hide_env_values = true)]
    pub mongo_uri: Option<String>,

    /// Push URL for MongoDB status
    #[arg(long, env = "MONGO_HEALTHCHECK_URL")]
    pub mongo_healthcheck_url: Option<String>,

    /// MariaDB user
    #[arg(long, env = "MARIADB_USER")]
    pub mariadb_user: Option<String>,

    /// MariaDB password
    #[arg(long, env = "MARIADB_PASSWORD", hide_env_values = true)]
    pub mariadb_password: Option<String>,

    /// MariaDB host
    #[arg(long, env = "MARIADB_HOST")]
    pub mariadb_host: Option<String>,

    /// MariaDB port
    #[arg(long, env = "MARIADB_PORT", default_value_t = DEFAULT_MARIADB_PORT)]
    pub mariadb_port: u16,

    /// Push URL for MariaDB status
    #[arg(long, env = "MARIADB_HEALTHCHECK_URL")]
    pub mariadb_healthcheck_url: Option<String>,

    /// Seconds between cycle starts
    #[arg(long, env = "HEALTHCHECK_INTERVAL", default_value = "60")]
    pub interval: f64,

    /// Per-call timeout in seconds for probes and pushes (unset waits forever)
    #[arg(long, env = "HEALTHCHECK_TIMEOUT")]
    pub timeout: Option<f64>,

    /// Fail startup when any backend setting is missing
    #[arg(long, env = "HEALTHCHECK_STRICT")]
    pub strict: bool,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,
}

impl Settings {
    /// Missing-settings policy selected by the `strict` flag.
    pub fn mode(&self) -> ValidationMode {
        if self.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Optional
        }
    }

    /// Resolve these settings into a validated configuration.
    pub fn resolve(&self) -> Result<MonitorConfig, ConfigError> {
        validation::resolve(self, self.mode())
    }
}
