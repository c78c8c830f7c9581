//! Typed settings resolved from the environment.
//!
//! # Responsibilities
//! - Look up operational parameters by name
//! - Fall back to defaults, coerce to the requested type
//! - Map configuration failures to reserved process exit codes
//!
//! # Design Decisions
//! - Lookups return `Result`; only binaries terminate the process
//! - Invalid values are always fatal, same as missing ones

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::config::validation::ValidationError;

/// Exit code when a required setting is not set.
pub const EXIT_MISSING_SETTING: i32 = 2;
/// Exit code when the port segment of `ETCD_HOST` is not an integer.
pub const EXIT_INVALID_STORE_PORT: i32 = 3;
/// Exit code for any other invalid configuration value.
pub const EXIT_INVALID_SETTING: i32 = 4;

/// Fatal configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required setting is unset and has no default.
    #[error("{0} not set")]
    MissingSetting(String),

    /// Setting is present but cannot be coerced to the requested type.
    #[error("\"{value}\" is not a valid value for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The store address carries something other than a TCP port number.
    #[error("port in ETCD_HOST must be a valid port number (0-65535), but got \"{port}\"")]
    InvalidStorePort { port: String },

    /// Config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Semantic validation failed.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ConfigError {
    /// Process exit code reserved for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::MissingSetting(_) => EXIT_MISSING_SETTING,
            ConfigError::InvalidStorePort { .. } => EXIT_INVALID_STORE_PORT,
            ConfigError::InvalidValue { .. }
            | ConfigError::Io { .. }
            | ConfigError::Parse { .. }
            | ConfigError::Validation(_) => EXIT_INVALID_SETTING,
        }
    }
}

/// Log a fatal configuration error and terminate the process.
///
/// Callers install the subscriber first; nothing else reports the error.
pub fn exit_on_fatal(err: ConfigError) -> ! {
    let code = err.exit_code();
    tracing::error!(error = %err, exit_code = code, "Fatal configuration error");
    std::process::exit(code)
}

/// Where settings are looked up.
#[derive(Debug, Clone, Default)]
enum Source {
    #[default]
    Process,
    Fixed(HashMap<String, String>),
}

/// Configuration provider.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    source: Source,
}

impl Settings {
    /// Settings backed by the live process environment.
    pub fn from_env() -> Self {
        Self {
            source: Source::Process,
        }
    }

    /// Settings backed by a fixed map.
    pub fn from_map<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            source: Source::Fixed(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Raw lookup, `None` when unset.
    pub fn var(&self, key: &str) -> Option<String> {
        match &self.source {
            Source::Process => std::env::var(key).ok(),
            Source::Fixed(vars) => vars.get(key).cloned(),
        }
    }

    /// Resolve `key`, falling back to `default`, and coerce it to `T`.
    ///
    /// Both the set value and the default go through `T::from_str`, so a
    /// malformed default is reported the same way as a malformed value.
    pub fn get_setting<T>(&self, key: &str, default: Option<&str>) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = match (self.var(key), default) {
            (Some(value), _) => value,
            (None, Some(default)) => default.to_string(),
            (None, None) => return Err(ConfigError::MissingSetting(key.to_string())),
        };

        value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: e.to_string(),
            value,
        })
    }
}
