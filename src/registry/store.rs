//! Key-value store abstraction.

use async_trait::async_trait;
use thiserror::Error;

/// One leaf key and its raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Errors from reading the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Request URL could not be built.
    #[error("invalid store URL: {0}")]
    Url(#[from] url::ParseError),

    /// Connection or transport failure.
    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Store answered with a non-success status.
    #[error("store returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body is not a valid keys response.
    #[error("malformed store response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Recursive read of every leaf key under a prefix.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn read_prefix(&self, prefix: &str) -> Result<Vec<KeyValue>, StoreError>;
}
