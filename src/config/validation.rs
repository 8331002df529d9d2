//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Reject blank authentication source identifiers
//! - Keep the realtime path off the built-in pages
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ConsoleConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ConsoleConfig;
use crate::http::pages::BUILTIN_PATHS;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.host must not be empty")]
    EmptyHost,

    #[error("server.default_port must be non-zero")]
    ZeroPort,

    #[error("auth.sources[{0}] must not be blank")]
    BlankAuthSource(usize),

    #[error("realtime.path must be a literal path starting with '/' and not be '/': {0:?}")]
    InvalidRealtimePath(String),

    #[error("realtime.path is already served by a built-in page: {0:?}")]
    ReservedRealtimePath(String),

    #[error("realtime.max_message_size must be non-zero")]
    ZeroMessageSize,

    #[error("timeouts.request_secs must be non-zero")]
    ZeroRequestTimeout,

    #[error("observability.metrics_address is not a socket address: {0:?}")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ConsoleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.server.default_port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    for (i, source) in config.auth.sources.iter().enumerate() {
        if source.trim().is_empty() {
            errors.push(ValidationError::BlankAuthSource(i));
        }
    }

    let path = &config.realtime.path;
    if !path.starts_with('/') || path == "/" || path.contains(['{', '}', '*', ':']) {
        errors.push(ValidationError::InvalidRealtimePath(path.clone()));
    } else if BUILTIN_PATHS.contains(&path.as_str()) {
        errors.push(ValidationError::ReservedRealtimePath(path.clone()));
    }
    if config.realtime.max_message_size == 0 {
        errors.push(ValidationError::ZeroMessageSize);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
