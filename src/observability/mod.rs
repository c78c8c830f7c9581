//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Reconciliation loop produces:
//!     → logging.rs (structured log events, one per tick outcome)
//!     → metrics.rs (tick/reload counters, registry size gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, only when METRICS_ADDRESS is set)
//! ```
//!
//! # Design Decisions
//! - Logging is always on; RUST_LOG selects the level
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
