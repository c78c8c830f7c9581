//! Backend registry subsystem.
//!
//! # Data Flow
//! ```text
//! ETCD_HOST → address.rs (StoreAddress, fatal on bad port)
//!     → etcd.rs (GET /v2/keys<prefix>?recursive=true)
//!     → store.rs (flat Vec<KeyValue>)
//!     → reader.rs (<prefix>/<service>/<attribute> decoding,
//!                  option keys → port, others → backends,
//!                  <SERVICE>_PORT overrides)
//!     → types.rs (Registry, backends sorted)
//! ```
//!
//! # Design Decisions
//! - The registry is rebuilt from scratch on every read
//! - Backends are sorted so store traversal order is not a change
//! - The store sits behind `KeyValueStore` so the loop can be driven by fakes

pub mod address;
pub mod etcd;
pub mod reader;
pub mod store;
pub mod types;

pub use address::StoreAddress;
pub use etcd::EtcdClient;
pub use reader::RegistryReader;
pub use store::{KeyValue, KeyValueStore, StoreError};
pub use types::{Endpoint, Registry, ServiceEntry};
