//! Startup error taxonomy.
//!
//! Only failures that can stop the process live here. Probe and report
//! failures have their own types and are contained inside the cycle.

use thiserror::Error;

use crate::config::ConfigError;

/// Result type for startup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings missing (strict mode) or malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The MongoDB client could not be built from the URI.
    #[error("MongoDB connection failed: {0}")]
    MongoConnect(#[source] mongodb::error::Error),

    /// The MariaDB connection could not be opened.
    #[error("MariaDB connection failed: {0}")]
    MariaDbConnect(#[source] mysql::Error),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// A blocking worker panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),
}
