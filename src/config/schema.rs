//! Configuration schema definitions.
//!
//! All types derive Serde traits so the whole configuration can be read from
//! a TOML file; every field has a default so an empty file (or none at all)
//! yields a working daemon.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the discovery daemon.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Key-value store settings.
    pub store: StoreConfig,

    /// Template and output file.
    pub render: RenderConfig,

    /// Reload command.
    pub reload: ReloadConfig,

    /// Poll loop timing.
    pub poll: PollConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Key-value store configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Store address as `host[:port]`.
    pub host: String,

    /// Key prefix holding the registry.
    pub backends_path: String,

    /// Attribute names treated as the service port (case-insensitive).
    pub option_keys: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:4001".to_string(),
            backends_path: "/backends".to_string(),
            option_keys: vec!["PORT".to_string()],
        }
    }
}

/// Rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Template file; the bundled HAProxy template when absent.
    pub template_path: Option<PathBuf>,

    /// File overwritten with the rendered configuration.
    pub output_path: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template_path: None,
            output_path: PathBuf::from("/etc/haproxy.cfg"),
        }
    }
}

/// Reload command configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ReloadConfig {
    /// Executable invoked with no arguments after each render.
    pub command: String,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            command: "./reload-haproxy.sh".to_string(),
        }
    }
}

/// Poll loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds slept between ticks.
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Prometheus exporter bind address; metrics are not exported when unset.
    pub metrics_address: Option<String>,
}
