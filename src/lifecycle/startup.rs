//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the store client, renderer and reload trigger from configuration
//! - Assemble the reconciler
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The template is compiled here, before the first tick

use thiserror::Error;

use crate::config::{ConfigError, DiscoveryConfig, Settings};
use crate::reconcile::Reconciler;
use crate::registry::{EtcdClient, RegistryReader, StoreAddress, StoreError};
use crate::reload::CommandReload;
use crate::render::{RenderError, TemplateRenderer};

/// The reconciler wired to its production collaborators.
pub type DaemonReconciler = Reconciler<EtcdClient, TemplateRenderer, CommandReload>;

/// Errors assembling the daemon.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create store client: {0}")]
    Store(#[from] StoreError),

    #[error("failed to load template: {0}")]
    Render(#[from] RenderError),
}

/// Registry reader over the configured etcd endpoint.
pub fn build_reader(
    config: &DiscoveryConfig,
    settings: &Settings,
) -> Result<RegistryReader<EtcdClient>, StartupError> {
    let address = StoreAddress::parse(&config.store.host)?;
    let client = EtcdClient::new(&address)?;

    tracing::info!(
        store = %address,
        prefix = %config.store.backends_path,
        option_keys = ?config.store.option_keys,
        "Registry reader configured"
    );

    Ok(RegistryReader::new(
        client,
        config.store.backends_path.clone(),
        config.store.option_keys.clone(),
        settings.clone(),
    ))
}

/// Template renderer for the configured template and output path.
pub fn build_renderer(config: &DiscoveryConfig) -> Result<TemplateRenderer, RenderError> {
    let renderer = TemplateRenderer::from_config(
        config.render.template_path.as_deref(),
        config.render.output_path.clone(),
    )?;

    let template = match &config.render.template_path {
        Some(path) => path.display().to_string(),
        None => "<bundled>".to_string(),
    };
    tracing::info!(
        template = %template,
        output = %renderer.output_path().display(),
        "Renderer configured"
    );
    Ok(renderer)
}

/// Assemble the reconciler from a resolved configuration.
pub fn build_reconciler(
    config: &DiscoveryConfig,
    settings: &Settings,
) -> Result<DaemonReconciler, StartupError> {
    let reader = build_reader(config, settings)?;
    let renderer = build_renderer(config)?;
    let reload = CommandReload::new(config.reload.command.clone());

    Ok(Reconciler::new(reader, renderer, reload, config.poll.interval()))
}
