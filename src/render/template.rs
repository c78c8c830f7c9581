//! Jinja template renderer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use minijinja::{context, Environment, UndefinedBehavior};

use crate::registry::Registry;
use crate::render::{ConfigRenderer, RenderError};

/// HAProxy template shipped with the daemon.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/haproxy.cfg.tmpl");

const DEFAULT_TEMPLATE_NAME: &str = "haproxy.cfg.tmpl";

/// Renders the registry through a Jinja template into `output_path`.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    name: String,
    source: String,
    output_path: PathBuf,
}

impl TemplateRenderer {
    /// Compile `source`; fails on template syntax errors.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        output_path: impl Into<PathBuf>,
    ) -> Result<Self, RenderError> {
        let renderer = Self {
            name: name.into(),
            source: source.into(),
            output_path: output_path.into(),
        };
        environment().template_from_named_str(&renderer.name, &renderer.source)?;
        Ok(renderer)
    }

    /// Renderer for the bundled HAProxy template.
    pub fn bundled(output_path: impl Into<PathBuf>) -> Result<Self, RenderError> {
        Self::new(DEFAULT_TEMPLATE_NAME, DEFAULT_TEMPLATE, output_path)
    }

    /// Renderer for a template file on disk.
    pub fn from_file(path: &Path, output_path: impl Into<PathBuf>) -> Result<Self, RenderError> {
        let source = std::fs::read_to_string(path).map_err(|source| RenderError::ReadTemplate {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_TEMPLATE_NAME.to_string());
        Self::new(name, source, output_path)
    }

    /// `from_file` when a template path is configured, `bundled` otherwise.
    pub fn from_config(
        template_path: Option<&Path>,
        output_path: impl Into<PathBuf>,
    ) -> Result<Self, RenderError> {
        match template_path {
            Some(path) => Self::from_file(path, output_path),
            None => Self::bundled(output_path),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Render the registry to text without touching the filesystem.
    pub fn render(&self, registry: &Registry) -> Result<String, RenderError> {
        let env = environment();
        let template = env.template_from_named_str(&self.name, &self.source)?;
        Ok(template.render(context! { services => registry })?)
    }
}

#[async_trait]
impl ConfigRenderer for TemplateRenderer {
    async fn render_and_write(&self, registry: &Registry) -> Result<(), RenderError> {
        let rendered = self.render(registry)?;
        tokio::fs::write(&self.output_path, rendered.as_bytes())
            .await
            .map_err(|source| RenderError::Write {
                path: self.output_path.clone(),
                source,
            })?;

        tracing::debug!(
            path = %self.output_path.display(),
            bytes = rendered.len(),
            "Configuration file written"
        );
        Ok(())
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}
