//! Database liveness sidecar library.

pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod report;

pub use config::{MonitorConfig, Settings};
pub use error::{Error, Result};
pub use health::Monitor;
