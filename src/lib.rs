//! etcd-driven HAProxy configuration daemon.
//!
//! Polls an etcd prefix for live service backends, renders a load balancer
//! configuration from them and reloads the load balancer when they change.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod reconcile;
pub mod registry;
pub mod reload;
pub mod render;

pub use config::DiscoveryConfig;
pub use lifecycle::Shutdown;
pub use reconcile::{Reconciler, TickError, TickOutcome};
pub use registry::Registry;
