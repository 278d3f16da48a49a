//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Monitor (monitor.rs):
//!     Fixed-interval loop
//!     → Probe each enabled backend in order (mongo.rs, mariadb.rs)
//!     → probe.rs times the call, maps errors to "down"
//!     → Reporter pushes status + latency
//!     → Sleep for the rest of the interval
//! ```
//!
//! # Design Decisions
//! - Backends are checked sequentially, never concurrently
//! - Probe and report errors are logged and contained per backend
//! - The blocking MariaDB query runs on the blocking pool; the loop awaits it

pub mod mariadb;
pub mod mongo;
pub mod monitor;
pub mod probe;

pub use mariadb::MariaDbProbe;
pub use mongo::MongoProbe;
pub use monitor::{MonitoredBackend, Monitor};
pub use probe::{run_probe, Probe, ProbeError, ProbeResult, Status, UnavailableProbe};
