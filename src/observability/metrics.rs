//! Metrics collection and exposition.
//!
//! # Metrics
//! - `discovery_ticks_total` (counter): ticks by outcome
//!   (`unchanged`, `applied`, `read_failed`, `render_failed`, `reload_failed`, `reload_aborted`)
//! - `discovery_reloads_total` (counter): reload attempts by result (`success`, `failure`)
//! - `discovery_services` (gauge): services in the last-applied registry
//! - `discovery_backends` (gauge): backends in the last-applied registry

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::registry::Registry;

/// Install the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("discovery_ticks_total", "Reconciliation ticks by outcome");
    describe_counter!("discovery_reloads_total", "Reload command invocations by result");
    describe_gauge!("discovery_services", "Services in the last applied registry");
    describe_gauge!("discovery_backends", "Backends in the last applied registry");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_tick(outcome: &'static str) {
    counter!("discovery_ticks_total", "outcome" => outcome).increment(1);
}

pub fn record_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("discovery_reloads_total", "result" => result).increment(1);
}

pub fn record_applied(registry: &Registry) {
    gauge!("discovery_services").set(registry.len() as f64);
    gauge!("discovery_backends").set(registry.backend_count() as f64);
}
