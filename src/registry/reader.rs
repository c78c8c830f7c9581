//! Decoding of the flat key hierarchy into a [`Registry`].
//!
//! Keys are expected as `<prefix>/<service>/<attribute>`. Option-key
//! attributes set the service port, everything else is a backend.

use crate::config::Settings;
use crate::registry::store::{KeyValue, KeyValueStore, StoreError};
use crate::registry::types::{Endpoint, Registry};

/// Reads and decodes the backend registry.
pub struct RegistryReader<S> {
    store: S,
    prefix: String,
    option_keys: Vec<String>,
    settings: Settings,
}

impl<S: KeyValueStore> RegistryReader<S> {
    /// `option_keys` are compared against uppercased attribute names.
    pub fn new(store: S, prefix: impl Into<String>, option_keys: Vec<String>, settings: Settings) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            option_keys: option_keys.iter().map(|k| k.trim().to_uppercase()).collect(),
            settings,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Read every key under the prefix and build a fresh registry.
    pub async fn read_registry(&self) -> Result<Registry, StoreError> {
        let entries = self.store.read_prefix(&self.prefix).await?;
        Ok(self.build_registry(entries))
    }

    /// Build a registry from raw store entries.
    pub fn build_registry(&self, entries: Vec<KeyValue>) -> Registry {
        let mut registry = Registry::new();

        for KeyValue { key, value } in entries {
            let Some((service, attribute)) = split_key(&self.prefix, &key) else {
                tracing::trace!(key = %key, "Skipping key outside <prefix>/<service>/<attribute>");
                continue;
            };

            let entry = registry.entry_mut(service);
            if self.is_option_key(attribute) {
                entry.port = self
                    .settings
                    .get_setting(&port_override_key(service), Some(value.as_str()))
                    .unwrap_or(value);
            } else {
                entry.backends.push(Endpoint::new(attribute, value));
            }
        }

        registry.normalize();
        registry
    }

    fn is_option_key(&self, attribute: &str) -> bool {
        let attribute = attribute.to_uppercase();
        self.option_keys.iter().any(|k| *k == attribute)
    }
}

/// Split `key` into `(service, attribute)` if it sits exactly two levels
/// below `prefix`.
pub fn split_key<'a>(prefix: &str, key: &'a str) -> Option<(&'a str, &'a str)> {
    let prefix = prefix.trim_end_matches('/');
    let rest = key.strip_prefix(prefix)?.strip_prefix('/')?;

    let mut segments = rest.split('/');
    let service = segments.next()?;
    let attribute = segments.next()?;
    if segments.next().is_some() || service.is_empty() || attribute.is_empty() {
        return None;
    }
    Some((service, attribute))
}

/// Environment variable overriding the port of `service`.
///
/// The name is uppercased, every character outside `A-Z` becomes `_`, and
/// `_PORT` is appended: `my-app` → `MY_APP_PORT`.
pub fn port_override_key(service: &str) -> String {
    let mut key: String = service
        .to_uppercase()
        .chars()
        .map(|c| if c.is_ascii_uppercase() { c } else { '_' })
        .collect();
    key.push_str("_PORT");
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const CONTAINER_ID: &str = "gVH71U3c";
    const CONTAINER_ID_2: &str = "FUBaFSMz";

    struct FixedStore(Vec<KeyValue>);

    #[async_trait]
    impl KeyValueStore for FixedStore {
        async fn read_prefix(&self, _prefix: &str) -> Result<Vec<KeyValue>, StoreError> {
            Ok(self.0.clone())
        }
    }

    struct DownStore;

    #[async_trait]
    impl KeyValueStore for DownStore {
        async fn read_prefix(&self, _prefix: &str) -> Result<Vec<KeyValue>, StoreError> {
            Err(StoreError::Status {
                status: 503,
                message: "unavailable".into(),
            })
        }
    }

    fn example_keys() -> Vec<KeyValue> {
        vec![
            KeyValue::new(format!("/backends/example/{}", CONTAINER_ID), "example.com:7373"),
            KeyValue::new(format!("/backends/example/{}", CONTAINER_ID_2), "example.com:73732"),
            KeyValue::new("/backends/example/port", "80"),
        ]
    }

    fn reader(keys: Vec<KeyValue>, env: &[(&str, &str)]) -> RegistryReader<FixedStore> {
        RegistryReader::new(
            FixedStore(keys),
            "/backends",
            vec!["PORT".to_string()],
            Settings::from_map(env.iter().copied()),
        )
    }

    #[tokio::test]
    async fn test_reads_services_and_backends() {
        let registry = reader(example_keys(), &[]).read_registry().await.unwrap();

        assert_eq!(registry.len(), 1);
        let example = registry.get("example").unwrap();
        assert_eq!(example.port, "80");
        assert_eq!(
            example.backends,
            vec![
                Endpoint::new(CONTAINER_ID_2, "example.com:73732"),
                Endpoint::new(CONTAINER_ID, "example.com:7373"),
            ]
        );
    }

    #[tokio::test]
    async fn test_port_override_from_environment() {
        let keys = vec![
            KeyValue::new("/backends/my-app/port", "80"),
            KeyValue::new("/backends/my-app/a", "10.0.0.1:80"),
        ];
        let registry = reader(keys, &[("MY_APP_PORT", "9090")])
            .read_registry()
            .await
            .unwrap();
        assert_eq!(registry.get("my-app").unwrap().port, "9090");
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let reader = RegistryReader::new(DownStore, "/backends", vec!["PORT".into()], Settings::default());
        let err = reader.read_registry().await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 503, .. }));
    }

    #[test]
    fn test_wrong_depth_keys_are_ignored() {
        let keys = vec![
            KeyValue::new("/backends/a/b/c", "deep"),
            KeyValue::new("/backends/a", "shallow"),
            KeyValue::new("/backends", "root"),
            KeyValue::new("/other/web/i1", "10.0.0.9:80"),
            KeyValue::new("/backendsx/web/i1", "10.0.0.9:80"),
            KeyValue::new("/backends/web/i1", "10.0.0.1:80"),
        ];
        let registry = reader(Vec::new(), &[]).build_registry(keys);

        assert_eq!(registry.service_names().collect::<Vec<_>>(), vec!["web"]);
        assert_eq!(
            registry.get("web").unwrap().backends,
            vec![Endpoint::new("i1", "10.0.0.1:80")]
        );
    }

    #[test]
    fn test_entry_defaults() {
        let r = reader(Vec::new(), &[]);

        let only_port = r.build_registry(vec![KeyValue::new("/backends/db/port", "5432")]);
        assert_eq!(only_port.get("db").unwrap().port, "5432");
        assert!(only_port.get("db").unwrap().backends.is_empty());

        let only_backend = r.build_registry(vec![KeyValue::new("/backends/db/n1", "10.0.0.1")]);
        assert_eq!(only_backend.get("db").unwrap().port, "");
        assert_eq!(only_backend.get("db").unwrap().backends.len(), 1);
    }

    #[test]
    fn test_option_keys_case_insensitive() {
        let r = RegistryReader::new(
            FixedStore(Vec::new()),
            "/backends/",
            vec!["port".into(), "listen".into()],
            Settings::default(),
        );
        let registry = r.build_registry(vec![
            KeyValue::new("/backends/web/PORT", "80"),
            KeyValue::new("/backends/api/Listen", "8080"),
            KeyValue::new("/backends/api/n1", "10.0.0.2:8080"),
        ]);
        assert_eq!(registry.get("web").unwrap().port, "80");
        assert!(registry.get("web").unwrap().backends.is_empty());
        assert_eq!(registry.get("api").unwrap().port, "8080");
    }

    #[test]
    fn test_traversal_order_is_normalized() {
        let r = reader(Vec::new(), &[]);
        let mut reversed = example_keys();
        reversed.reverse();
        assert_eq!(r.build_registry(example_keys()), r.build_registry(reversed));
    }

    #[test]
    fn test_nested_prefix() {
        let r = RegistryReader::new(
            FixedStore(Vec::new()),
            "/services/prod",
            vec!["PORT".into()],
            Settings::default(),
        );
        let registry = r.build_registry(vec![
            KeyValue::new("/services/prod/web/port", "80"),
            KeyValue::new("/services/prod/web/i1", "10.0.0.1:80"),
            KeyValue::new("/services/staging/web/i1", "10.0.1.1:80"),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.backend_count(), 1);
    }

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("/backends", "/backends/web/i1"), Some(("web", "i1")));
        assert_eq!(split_key("/", "/web/i1"), Some(("web", "i1")));
        assert_eq!(split_key("/backends", "/backends/web/"), None);
        assert_eq!(split_key("/backends", "/backends//i1"), None);
    }

    #[test]
    fn test_port_override_key() {
        assert_eq!(port_override_key("my-app"), "MY_APP_PORT");
        assert_eq!(port_override_key("example"), "EXAMPLE_PORT");
        assert_eq!(port_override_key("web2.internal"), "WEB__INTERNAL_PORT");
    }
}
