//! Load balancer reload trigger.
//!
//! # Responsibilities
//! - Run the external reload command after a render
//! - Wait for it and report its exit status
//!
//! # Design Decisions
//! - Every child is awaited, so none is left unreaped
//! - A nonzero status is a value, not an error; the loop decides what to do
//! - Failing to start the command at all is an error

use std::process::ExitStatus;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

/// Errors starting the reload command.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("failed to run reload command {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Invokes the reload of the load balancer.
#[async_trait]
pub trait ReloadTrigger: Send + Sync {
    /// Exit status of the reload; `0` means success.
    async fn trigger_reload(&self) -> Result<i32, ReloadError>;
}

/// Runs an executable with no arguments.
#[derive(Debug, Clone)]
pub struct CommandReload {
    command: String,
}

impl CommandReload {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[async_trait]
impl ReloadTrigger for CommandReload {
    async fn trigger_reload(&self) -> Result<i32, ReloadError> {
        tracing::debug!(command = %self.command, "Running reload command");

        let status = Command::new(&self.command)
            .status()
            .await
            .map_err(|source| ReloadError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        Ok(exit_code(status))
    }
}

/// Numeric exit status; a child killed by signal `n` reports `128 + n`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
