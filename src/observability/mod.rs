//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router driver produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges via the metrics facade)
//!
//! Consumers:
//!     → Log output (stderr, compact or pretty format)
//!     → Whatever metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder on its own
//! - Metrics are cheap no-ops until a recorder is installed
//! - Log level configurable via config and `RUST_LOG`

pub mod logging;
pub mod metrics;
