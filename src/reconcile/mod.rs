//! Reconciliation loop subsystem.
//!
//! # State Transitions (per tick)
//! ```text
//! read_registry ──err──▶ ReadFailed          (last_applied kept)
//!      │
//!      ▼
//! current == last_applied ──▶ Unchanged       (no render, no reload)
//!      │ differs
//!      ▼
//! render_and_write ──err──▶ RenderFailed      (last_applied kept)
//!      │
//!      ▼
//! trigger_reload ──spawn err──▶ ReloadFailed  (last_applied kept)
//!      │        ──status≠0───▶ ReloadAborted  (last_applied kept)
//!      ▼ status 0
//! last_applied := current ──▶ Applied
//! ```
//!
//! # Design Decisions
//! - Ticks are strictly sequential; the sleep starts after a tick ends
//! - A failed tick leaves state untouched so the same snapshot is retried
//! - Shutdown is observed during a tick too; the tick in flight is dropped

pub mod reconciler;

use thiserror::Error;

use crate::registry::StoreError;
use crate::reload::ReloadError;
use crate::render::RenderError;

pub use reconciler::Reconciler;

/// Result of a successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Registry equals the last applied one; nothing was done.
    Unchanged,
    /// Configuration rendered and reloaded.
    Applied { services: usize, backends: usize },
}

impl TickOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TickOutcome::Unchanged => "unchanged",
            TickOutcome::Applied { .. } => "applied",
        }
    }
}

/// A tick that did not complete; `last_applied` is unchanged.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("error reading services: {0}")]
    Read(#[from] StoreError),

    #[error("error updating configuration file: {0}")]
    Render(#[from] RenderError),

    #[error("error reloading: {0}")]
    Reload(#[from] ReloadError),

    #[error("reload aborted, exit status was {status}")]
    ReloadAborted { status: i32 },
}

impl TickError {
    pub fn label(&self) -> &'static str {
        match self {
            TickError::Read(_) => "read_failed",
            TickError::Render(_) => "render_failed",
            TickError::Reload(_) => "reload_failed",
            TickError::ReloadAborted { .. } => "reload_aborted",
        }
    }
}
