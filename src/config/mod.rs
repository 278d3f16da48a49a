//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! flags / environment variables
//!     → loader.rs (clap parsing into Settings)
//!     → validation.rs (enablement + semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → owned by the Monitor for the process lifetime
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - A backend is enabled only when all of its required settings are present
//! - Strict mode turns any missing setting into a startup failure

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::Settings;
pub use schema::{BackendKind, MariaDbConfig, MongoConfig, MonitorConfig, ValidationMode};
pub use validation::{resolve, ConfigError};
