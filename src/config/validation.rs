//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (poll interval > 0)
//! - Check that paths and commands are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DiscoveryConfig → Result<(), Vec<ValidationError>>
//! - The store address is resolved separately, it has its own exit code

use std::fmt;

use crate::config::schema::DiscoveryConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &DiscoveryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.store.backends_path.starts_with('/') {
        errors.push(ValidationError::new(
            "store.backends_path",
            format!("must start with '/', got \"{}\"", config.store.backends_path),
        ));
    }

    if config.store.option_keys.iter().all(|k| k.trim().is_empty()) {
        errors.push(ValidationError::new(
            "store.option_keys",
            "at least one option key is required",
        ));
    }

    if config.render.output_path.as_os_str().is_empty() {
        errors.push(ValidationError::new("render.output_path", "must not be empty"));
    }

    if config.reload.command.trim().is_empty() {
        errors.push(ValidationError::new("reload.command", "must not be empty"));
    }

    if config.poll.interval_secs == 0 {
        errors.push(ValidationError::new(
            "poll.interval_secs",
            "must be greater than zero",
        ));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(ValidationError::new(
                "observability.metrics_address",
                format!("invalid socket address \"{}\"", addr),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
