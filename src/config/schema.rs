//! Configuration schema definitions.
//!
//! This module defines the complete static configuration of the console
//! runtime. All types derive Serde traits for deserialization from TOML.
//! Environment overrides (port, shared secret) are not part of the schema;
//! see [`crate::runtime`].

use serde::{Deserialize, Serialize};

/// Root configuration for the console runtime.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Listener and serve-mode settings.
    pub server: ServerConfig,

    /// Reverse-proxy trust counts.
    pub proxy: ProxyTrustConfig,

    /// Authentication source precedence.
    pub auth: AuthConfig,

    /// Realtime channel attachment.
    pub realtime: RealtimeConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host or IP address to bind.
    pub host: String,

    /// Port used unless the runtime overrides it.
    pub default_port: u16,

    /// Debug serve mode (verbose error bodies, relaxed bind checks).
    pub debug: bool,

    /// File holding the commit hash of the running build.
    pub commit_hash_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            default_port: 5050,
            debug: false,
            commit_hash_file: "commit_hash".to_string(),
        }
    }
}

/// Number of trusted hops per forwarded-header class.
///
/// A count of zero means the header is ignored and the values of the
/// immediate connection are authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyTrustConfig {
    /// Honor the hop-count headers at all.
    pub fix_enabled: bool,

    /// Hops of `X-Forwarded-For` to trust.
    pub x_for: u32,

    /// Hops of `X-Forwarded-Proto` to trust.
    pub x_proto: u32,

    /// Hops of `X-Forwarded-Host` to trust.
    pub x_host: u32,

    /// Hops of `X-Forwarded-Port` to trust.
    pub x_port: u32,

    /// Hops of `X-Forwarded-Prefix` to trust.
    pub x_prefix: u32,
}

impl Default for ProxyTrustConfig {
    fn default() -> Self {
        Self {
            fix_enabled: true,
            x_for: 0,
            x_proto: 0,
            x_host: 0,
            x_port: 0,
            x_prefix: 0,
        }
    }
}

impl ProxyTrustConfig {
    /// Trust exactly one hop of every header class.
    pub fn single_hop() -> Self {
        Self {
            fix_enabled: true,
            x_for: 1,
            x_proto: 1,
            x_host: 1,
            x_port: 1,
            x_prefix: 1,
        }
    }

    /// Returns true if at least one hop-count header will be honored.
    pub fn trusts_any(&self) -> bool {
        self.fix_enabled
            && (self.x_for | self.x_proto | self.x_host | self.x_port | self.x_prefix) > 0
    }
}

/// Authentication source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Configured sources in priority order.
    pub sources: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            sources: vec![crate::auth::INTERNAL.to_string()],
        }
    }
}

/// Realtime channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Path on which WebSocket upgrades are accepted.
    pub path: String,

    /// Maximum size of a single inbound message in bytes.
    pub max_message_size: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            path: "/socket.io".to_string(),
            max_message_size: 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
