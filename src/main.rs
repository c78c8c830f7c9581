//! haproxy-discovery daemon
//!
//! Keeps an HAProxy configuration in sync with a service registry in etcd.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                  RECONCILIATION LOOP                 │
//!                 │                                                      │
//!   etcd v2  ◀────┼── registry ──▶ compare with ──changed──▶ render ─────┼──▶ /etc/haproxy.cfg
//!   /backends     │   reader       last_applied              template    │
//!                 │                     │                        │       │
//!                 │                 unchanged                    ▼       │
//!                 │                     │                     reload ────┼──▶ ./reload-haproxy.sh
//!                 │                     ▼                        │       │
//!                 │                   sleep ◀── last_applied := current  │
//!                 │                                                      │
//!                 │  ┌─────────┐ ┌──────────────┐ ┌──────────────────┐   │
//!                 │  │ config  │ │observability │ │    lifecycle     │   │
//!                 │  │ env+toml│ │ logs/metrics │ │ signals/shutdown │   │
//!                 │  └─────────┘ └──────────────┘ └──────────────────┘   │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use haproxy_discovery::config::{self, exit_on_fatal, Settings};
use haproxy_discovery::lifecycle::{signals, startup, Shutdown};
use haproxy_discovery::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "haproxy-discovery", version)]
#[command(about = "Render HAProxy configuration from etcd and reload on change", long_about = None)]
struct Args {
    /// TOML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single reconciliation tick and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_logging("info");

    tracing::info!("haproxy-discovery v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = Settings::from_env();
    let config = config::resolve_config(args.config.as_deref(), &settings)
        .unwrap_or_else(|e| exit_on_fatal(e));

    tracing::info!(
        store = %config.store.host,
        prefix = %config.store.backends_path,
        output = %config.render.output_path.display(),
        reload_command = %config.reload.command,
        poll_interval_secs = config.poll.interval_secs,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => {
                tracing::error!(metrics_address = %addr, "Failed to parse metrics address");
            }
        }
    }

    let mut reconciler = startup::build_reconciler(&config, &settings)?;

    if args.once {
        reconciler.reconcile_once().await?;
        return Ok(());
    }

    let shutdown = Shutdown::new();
    let loop_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    reconciler.run(loop_shutdown).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
