//! Registry data model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One backend instance of a service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Instance identifier (the attribute segment of the key).
    pub name: String,
    /// Raw stored value, `host:port` or a bare host.
    #[serde(rename = "addr", alias = "address")]
    pub address: String,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// Port and backends of a single service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    /// Listening port, empty when the service has no option key.
    #[serde(default)]
    pub port: String,
    /// Backend instances, sorted by name then address.
    #[serde(default)]
    pub backends: Vec<Endpoint>,
}

/// Service name → entry, rebuilt on every poll.
///
/// Equality is structural. Backends are sorted before a registry is handed
/// out, so store traversal order never makes two snapshots differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    services: BTreeMap<String, ServiceEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Number of services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Total number of backends across all services.
    pub fn backend_count(&self) -> usize {
        self.services.values().map(|s| s.backends.len()).sum()
    }

    pub fn get(&self, service: &str) -> Option<&ServiceEntry> {
        self.services.get(service)
    }

    /// Services in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ServiceEntry)> {
        self.services.iter()
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Get-or-create the entry for `service`.
    pub(crate) fn entry_mut(&mut self, service: &str) -> &mut ServiceEntry {
        self.services.entry(service.to_string()).or_default()
    }

    /// Sort every backend list.
    pub(crate) fn normalize(&mut self) {
        for entry in self.services.values_mut() {
            entry.backends.sort();
        }
    }
}

impl FromIterator<(String, ServiceEntry)> for Registry {
    fn from_iter<I: IntoIterator<Item = (String, ServiceEntry)>>(iter: I) -> Self {
        let mut registry = Self {
            services: iter.into_iter().collect(),
        };
        registry.normalize();
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(port: &str, backends: &[(&str, &str)]) -> ServiceEntry {
        ServiceEntry {
            port: port.to_string(),
            backends: backends.iter().map(|(n, a)| Endpoint::new(*n, *a)).collect(),
        }
    }

    #[test]
    fn test_backend_order_does_not_affect_equality() {
        let a: Registry = [(
            "web".to_string(),
            entry("80", &[("i1", "10.0.0.1:9000"), ("i2", "10.0.0.2:9000")]),
        )]
        .into_iter()
        .collect();
        let b: Registry = [(
            "web".to_string(),
            entry("80", &[("i2", "10.0.0.2:9000"), ("i1", "10.0.0.1:9000")]),
        )]
        .into_iter()
        .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_port_change_is_a_difference() {
        let a: Registry = [("web".to_string(), entry("80", &[]))].into_iter().collect();
        let b: Registry = [("web".to_string(), entry("8080", &[]))].into_iter().collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serializes_as_template_map() {
        let registry: Registry = [("web".to_string(), entry("80", &[("i1", "10.0.0.1:9000")]))]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "web": {
                    "port": "80",
                    "backends": [{"name": "i1", "addr": "10.0.0.1:9000"}]
                }
            })
        );
        assert_eq!(registry.backend_count(), 1);
    }
}
