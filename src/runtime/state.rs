//! Runtime mode resolution.
//!
//! # Responsibilities
//! - Decide whether the process is embedded in a desktop controller
//! - Derive the effective listen port
//! - Carry the controller's shared secret
//!
//! # Design Decisions
//! - Resolved once, before any listener binds
//! - Shared as `Arc<RuntimeState>` and never mutated
//! - An unparseable port override is fatal rather than ignored

use std::ffi::{OsStr, OsString};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::runtime::env::{EnvSource, INT_KEY_VAR, INT_PORT_VAR, SERVER_MODE_VAR};

/// Errors raised while resolving the runtime state.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("{var} must be a port number, got {value:?}")]
    InvalidPort { var: &'static str, value: String },
}

/// Server-mode override as requested by the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    /// Multi-user server deployment.
    Server,
    /// Single-user desktop deployment.
    Desktop,
    /// No override; downstream configuration decides.
    Undetermined,
}

impl ServerMode {
    fn from_env_value(value: Option<&OsStr>) -> Self {
        match value {
            Some(v) if v == "OFF" => ServerMode::Desktop,
            Some(_) => ServerMode::Server,
            None => ServerMode::Undetermined,
        }
    }
}

/// How this process is addressed, computed once at startup.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeState {
    server_mode: ServerMode,
    is_embedded: bool,
    effective_port: u16,
    #[serde(skip)]
    internal_key: OsString,
}

impl RuntimeState {
    /// Resolve the runtime state from `env`, falling back to `default_port`.
    pub fn resolve(default_port: u16, env: &(impl EnvSource + ?Sized)) -> Result<Self, RuntimeError> {
        let server_mode = ServerMode::from_env_value(env.var_os(SERVER_MODE_VAR).as_deref());

        let effective_port = match env.var_os(INT_PORT_VAR) {
            Some(value) => parse_port(value)?,
            None => default_port,
        };

        let internal_key = env.var_os(INT_KEY_VAR).unwrap_or_default();
        let is_embedded = !internal_key.is_empty();

        Ok(Self {
            server_mode,
            is_embedded,
            effective_port,
            internal_key,
        })
    }

    pub fn server_mode(&self) -> ServerMode {
        self.server_mode
    }

    /// Returns true when launched by a co-located desktop controller.
    pub fn is_embedded(&self) -> bool {
        self.is_embedded
    }

    pub fn effective_port(&self) -> u16 {
        self.effective_port
    }

    /// The controller's shared secret; empty when not embedded.
    pub fn internal_key(&self) -> &OsStr {
        &self.internal_key
    }
}

fn parse_port(value: OsString) -> Result<u16, RuntimeError> {
    value
        .to_str()
        .and_then(|v| v.trim().parse::<u16>().ok())
        .ok_or_else(|| RuntimeError::InvalidPort {
            var: INT_PORT_VAR,
            value: value.to_string_lossy().into_owned(),
        })
}

// Keeps the shared secret out of logs.
impl fmt::Debug for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeState")
            .field("server_mode", &self.server_mode)
            .field("is_embedded", &self.is_embedded)
            .field("effective_port", &self.effective_port)
            .field("internal_key", &if self.internal_key.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}
