//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::DiscoveryConfig;
use crate::config::settings::{ConfigError, Settings};
use crate::config::validation::validate_config;
use crate::registry::StoreAddress;

/// Resolve the effective configuration.
///
/// Starts from the TOML file when one is given (defaults otherwise), applies
/// the environment overrides, validates the result and checks that the store
/// address resolves.
pub fn resolve_config(
    path: Option<&Path>,
    settings: &Settings,
) -> Result<DiscoveryConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => DiscoveryConfig::default(),
    };

    apply_env(&mut config, settings)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    StoreAddress::parse(&config.store.host)?;

    Ok(config)
}

fn read_file(path: &Path) -> Result<DiscoveryConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overlay environment variables onto `config`.
pub fn apply_env(config: &mut DiscoveryConfig, settings: &Settings) -> Result<(), ConfigError> {
    config.store.host = settings.get_setting("ETCD_HOST", Some(config.store.host.as_str()))?;
    config.store.backends_path =
        settings.get_setting("ETCD_BACKENDS_PATH", Some(config.store.backends_path.as_str()))?;

    let option_keys: String =
        settings.get_setting("ETCD_OPTION_KEYS", Some(config.store.option_keys.join(",").as_str()))?;
    let mut option_keys = parse_option_keys(&option_keys);
    if let Some(port_key) = settings.var("ETCD_PORT_KEY") {
        for key in parse_option_keys(&port_key) {
            if !option_keys.contains(&key) {
                option_keys.push(key);
            }
        }
    }
    config.store.option_keys = option_keys;

    config.poll.interval_secs = settings
        .get_setting("POLL_TIMEOUT", Some(config.poll.interval_secs.to_string().as_str()))?;

    if let Some(template) = settings.var("HAPROXY_TEMPLATE") {
        config.render.template_path = Some(PathBuf::from(template));
    }
    config.render.output_path = settings.get_setting(
        "HAPROXY_CONFIG",
        Some(config.render.output_path.to_string_lossy().as_ref()),
    )?;

    config.reload.command = settings.get_setting("RELOAD_COMMAND", Some(config.reload.command.as_str()))?;

    if let Some(addr) = settings.var("METRICS_ADDRESS") {
        config.observability.metrics_address = Some(addr);
    }

    Ok(())
}

/// Split a comma-separated option key list, uppercased, blanks dropped.
pub fn parse_option_keys(raw: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for key in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        let key = key.to_uppercase();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
