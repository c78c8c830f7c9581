//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve config → Build store client, renderer, reload trigger → Reconciler
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger()
//!
//! Shutdown (shutdown.rs):
//!     Broadcast received by the loop → current tick dropped → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then collaborators, then the loop
//! - A hung tick (store read, reload command) does not block shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
