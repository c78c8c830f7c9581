//! Store address resolution.

use std::fmt;

use url::Url;

use crate::config::ConfigError;

pub const DEFAULT_STORE_HOST: &str = "127.0.0.1";
pub const DEFAULT_STORE_PORT: u16 = 4001;

/// Host and port of the key-value store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAddress {
    pub host: String,
    pub port: u16,
}

impl StoreAddress {
    /// Parse `host[:port]`.
    ///
    /// An empty host segment falls back to the default host. Everything after
    /// the first `:` must be a port number; `host:80:x` and `host:70000` are
    /// fatal configuration errors rather than silently truncated.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        let (host, port) = match raw.split_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidStorePort {
                        port: port.to_string(),
                    })?;
                (host, port)
            }
            None => (raw, DEFAULT_STORE_PORT),
        };

        let host = if host.is_empty() {
            DEFAULT_STORE_HOST
        } else {
            host
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Base URL of the store's HTTP API.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}:{}/", self.host, self.port))
    }
}

impl Default for StoreAddress {
    fn default() -> Self {
        Self {
            host: DEFAULT_STORE_HOST.to_string(),
            port: DEFAULT_STORE_PORT,
        }
    }
}

impl fmt::Display for StoreAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
