//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Probes, reporter, monitor:
//!     → tracing events with backend/status/elapsed_ms fields
//!     → logging.rs subscriber (human or JSON, filtered by RUST_LOG)
//!     → stdout
//! ```

pub mod logging;
