//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolved config → Open handles → Warm up → Monitor
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then connections, then the loop
//! - No shutdown state: the loop runs until the process is terminated

pub mod startup;

pub use startup::build_monitor;
