//! The polling reconciler.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::observability::metrics;
use crate::reconcile::{TickError, TickOutcome};
use crate::registry::{KeyValueStore, Registry, RegistryReader};
use crate::reload::ReloadTrigger;
use crate::render::ConfigRenderer;

/// Owns the last applied registry and drives read → render → reload.
pub struct Reconciler<S, R, T> {
    reader: RegistryReader<S>,
    renderer: R,
    reload: T,
    poll_interval: Duration,
    last_applied: Registry,
}

impl<S, R, T> Reconciler<S, R, T>
where
    S: KeyValueStore,
    R: ConfigRenderer,
    T: ReloadTrigger,
{
    pub fn new(reader: RegistryReader<S>, renderer: R, reload: T, poll_interval: Duration) -> Self {
        Self {
            reader,
            renderer,
            reload,
            poll_interval,
            last_applied: Registry::new(),
        }
    }

    /// Registry confirmed live by the last successful reload.
    pub fn last_applied(&self) -> &Registry {
        &self.last_applied
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// One reconciliation step. `last_applied` only moves on `Applied`.
    pub async fn tick(&mut self) -> Result<TickOutcome, TickError> {
        let current = self.reader.read_registry().await?;

        if current == self.last_applied {
            return Ok(TickOutcome::Unchanged);
        }

        tracing::info!(services = current.len(), "Updating configuration file");
        self.renderer.render_and_write(&current).await?;

        tracing::info!("Configuration changed, reloading load balancer");
        let status = match self.reload.trigger_reload().await {
            Ok(status) => status,
            Err(err) => {
                metrics::record_reload(false);
                return Err(err.into());
            }
        };
        metrics::record_reload(status == 0);
        if status != 0 {
            return Err(TickError::ReloadAborted { status });
        }

        let outcome = TickOutcome::Applied {
            services: current.len(),
            backends: current.backend_count(),
        };
        metrics::record_applied(&current);
        self.last_applied = current;
        Ok(outcome)
    }

    /// `tick`, with the outcome logged and counted.
    pub async fn reconcile_once(&mut self) -> Result<TickOutcome, TickError> {
        let result = self.tick().await;
        match &result {
            Ok(TickOutcome::Unchanged) => {
                tracing::debug!("No changes in services");
                metrics::record_tick("unchanged");
            }
            Ok(outcome @ TickOutcome::Applied { services, backends }) => {
                tracing::info!(services, backends, "Configuration applied");
                metrics::record_tick(outcome.label());
            }
            Err(err @ TickError::ReloadAborted { status }) => {
                tracing::warn!(status, "{}", err);
                metrics::record_tick(err.label());
            }
            Err(err) => {
                tracing::error!(error = %err, "Tick failed, keeping last applied configuration");
                metrics::record_tick(err.label());
            }
        }
        result
    }

    /// Poll until a shutdown signal arrives. A tick in flight is dropped.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            prefix = %self.reader.prefix(),
            interval_secs = self.poll_interval.as_secs(),
            "Reconciliation loop starting"
        );

        loop {
            tokio::select! {
                _ = self.reconcile_once() => {}
                _ = shutdown.recv() => {
                    tracing::warn!("Shutdown signal received during tick, abandoning it");
                    break;
                }
            }

            tokio::select! {
                _ = sleep(self.poll_interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Reconciliation loop received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
