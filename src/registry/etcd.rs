//! etcd v2 keys API client.
//!
//! # Responsibilities
//! - Issue recursive reads against `/v2/keys<prefix>`
//! - Flatten the nested node tree into leaf key/value pairs
//! - Surface etcd error bodies (`errorCode`, `message`) as store errors
//!
//! # Design Decisions
//! - No retry and no timeout; a failed read fails the tick
//! - Directory nodes contribute only their children

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::registry::address::StoreAddress;
use crate::registry::store::{KeyValue, KeyValueStore, StoreError};

#[derive(Debug, Deserialize)]
struct KeysResponse {
    node: Node,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    dir: bool,
    #[serde(default)]
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "errorCode")]
    error_code: u64,
    message: String,
    #[serde(default)]
    cause: Option<String>,
}

/// HTTP client for a single etcd endpoint.
#[derive(Debug, Clone)]
pub struct EtcdClient {
    base_url: Url,
    client: Client,
}

impl EtcdClient {
    pub fn new(address: &StoreAddress) -> Result<Self, StoreError> {
        let base_url = address.base_url()?;
        let client = Client::builder().no_proxy().build()?;

        tracing::debug!(base_url = %base_url, "etcd client created");
        Ok(Self { base_url, client })
    }

    fn keys_url(&self, prefix: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.join(&format!("v2/keys{}", prefix))?;
        url.query_pairs_mut().append_pair("recursive", "true");
        Ok(url)
    }
}

#[async_trait]
impl KeyValueStore for EtcdClient {
    async fn read_prefix(&self, prefix: &str) -> Result<Vec<KeyValue>, StoreError> {
        let url = self.keys_url(prefix)?;
        tracing::debug!(url = %url, "Reading registry keys");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: KeysResponse = serde_json::from_str(&body)?;
        let mut leaves = Vec::new();
        collect_leaves(parsed.node, &mut leaves);
        Ok(leaves)
    }
}

fn collect_leaves(node: Node, out: &mut Vec<KeyValue>) {
    if node.dir {
        for child in node.nodes {
            collect_leaves(child, out);
        }
    } else {
        out.push(KeyValue {
            key: node.key,
            value: node.value.unwrap_or_default(),
        });
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => match err.cause {
            Some(cause) => format!("{} ({}) [errorCode {}]", err.message, cause, err.error_code),
            None => format!("{} [errorCode {}]", err.message, err.error_code),
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "action": "get",
        "node": {
            "key": "/backends",
            "dir": true,
            "nodes": [
                {
                    "key": "/backends/example",
                    "dir": true,
                    "nodes": [
                        {"key": "/backends/example/gVH71U3c", "value": "example.com:7373", "modifiedIndex": 4, "createdIndex": 4},
                        {"key": "/backends/example/port", "value": "80", "modifiedIndex": 5, "createdIndex": 5}
                    ],
                    "modifiedIndex": 3,
                    "createdIndex": 3
                },
                {"key": "/backends/empty", "dir": true, "modifiedIndex": 6, "createdIndex": 6}
            ]
        }
    }"#;

    #[test]
    fn test_flattens_nested_nodes() {
        let parsed: KeysResponse = serde_json::from_str(RESPONSE).unwrap();
        let mut leaves = Vec::new();
        collect_leaves(parsed.node, &mut leaves);
        assert_eq!(
            leaves,
            vec![
                KeyValue::new("/backends/example/gVH71U3c", "example.com:7373"),
                KeyValue::new("/backends/example/port", "80"),
            ]
        );
    }

    #[test]
    fn test_single_key_prefix() {
        let parsed: KeysResponse =
            serde_json::from_str(r#"{"action":"get","node":{"key":"/backends","value":"x"}}"#)
                .unwrap();
        let mut leaves = Vec::new();
        collect_leaves(parsed.node, &mut leaves);
        assert_eq!(leaves, vec![KeyValue::new("/backends", "x")]);
    }

    #[test]
    fn test_keys_url() {
        let client = EtcdClient::new(&StoreAddress::parse("etcd:2379").unwrap()).unwrap();
        let url = client.keys_url("/backends").unwrap();
        assert_eq!(url.as_str(), "http://etcd:2379/v2/keys/backends?recursive=true");
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"errorCode":100,"message":"Key not found","cause":"/backends","index":7}"#;
        assert_eq!(
            error_message(body),
            "Key not found (/backends) [errorCode 100]"
        );
        assert_eq!(error_message(""), "empty response body");
        assert_eq!(error_message("bad gateway\n"), "bad gateway");
    }
}
