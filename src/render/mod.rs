//! Configuration rendering subsystem.
//!
//! # Data Flow
//! ```text
//! Registry
//!     → template.rs (minijinja, `services` is the only variable)
//!     → rendered text
//!     → output file (fully overwritten)
//! ```
//!
//! # Design Decisions
//! - Whole-file render on every change, no incremental edits
//! - Templates are compiled once at startup so syntax errors are fatal early
//! - Plain overwrite: no temp file, no rename, no backup

pub mod template;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::registry::Registry;

pub use template::{TemplateRenderer, DEFAULT_TEMPLATE};

/// Errors from rendering or persisting the configuration.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template failed to compile or render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Template file could not be read.
    #[error("failed to read template {path}: {source}")]
    ReadTemplate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Renders a registry and persists the result.
#[async_trait]
pub trait ConfigRenderer: Send + Sync {
    async fn render_and_write(&self, registry: &Registry) -> Result<(), RenderError>;
}
