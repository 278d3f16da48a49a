//! Status reporting subsystem.
//!
//! # Data Flow
//! ```text
//! ProbeResult (status, elapsed_ms)
//!     → reporter.rs builds <url>?status=<up|down>&ping=<ms>
//!     → HTTP POST, empty body
//!     → acknowledgement {"ok": true} checked
//! ```
//!
//! # Design Decisions
//! - One push per enabled backend per cycle, no retries
//! - Acknowledgements are validated strictly; a negative ack is an error
//! - Errors are returned to the monitor, which logs them and moves on

pub mod reporter;

pub use reporter::{push_url, HttpReporter, ReportError, Reporter};
