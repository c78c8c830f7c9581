//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → loader.rs (environment overrides via settings.rs)
//!     → validation.rs (semantic checks)
//!     → DiscoveryConfig (validated, immutable)
//!
//! Any error here is fatal:
//!     ConfigError::exit_code() → process exit (2, 3 or 4)
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup; the daemon never reloads it
//! - Environment variables override the file, the file overrides defaults
//! - Per-service port overrides are looked up on every poll, not here

pub mod loader;
pub mod schema;
pub mod settings;
pub mod validation;

pub use loader::resolve_config;
pub use schema::{
    DiscoveryConfig, ObservabilityConfig, PollConfig, ReloadConfig, RenderConfig, StoreConfig,
};
pub use settings::{exit_on_fatal, ConfigError, Settings};
