//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve runtime state, auth source and build info from validated config
//! - Bind the listener
//! - Run the HTTP server and realtime channel until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, nothing is retried
//! - Everything is resolved before the listener binds
//! - Listener starts last (traffic only when ready)

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::auth::{resolve_external_auth_source, AuthSource};
use crate::config::{ConfigError, ConsoleConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::net::listener::{self, ListenerError};
use crate::runtime::{EnvSource, RuntimeError, RuntimeState};

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("runtime environment error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("listener error: {0}")]
    Listener(#[from] ListenerError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Debug or production serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    Debug,
    Production,
}

impl ServeMode {
    pub fn from_debug_flag(debug: bool) -> Self {
        if debug {
            ServeMode::Debug
        } else {
            ServeMode::Production
        }
    }

    pub fn is_debug(self) -> bool {
        self == ServeMode::Debug
    }

    /// Include panic messages in error responses.
    pub fn verbose_errors(self) -> bool {
        self.is_debug()
    }

    /// Automatic reload on source change; never enabled in either mode.
    pub fn use_reloader(self) -> bool {
        false
    }

    /// Production-only warning about the bind host.
    pub fn bind_warning(self, host: &str) -> Option<&'static str> {
        if self.is_debug() {
            return None;
        }
        matches!(host, "0.0.0.0" | "::" | "[::]")
            .then_some("Serving on all interfaces; expose the console through a reverse proxy")
    }
}

/// Version information of the running build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit_hash: Option<String>,
}

impl BuildInfo {
    /// Read the commit hash from the first line of `path`, if present.
    pub fn load(path: &Path) -> Self {
        let commit_hash = fs::read_to_string(path)
            .ok()
            .and_then(|content| content.lines().next().map(|l| l.trim().to_string()))
            .filter(|hash| !hash.is_empty());

        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit_hash,
        }
    }
}

/// Everything resolved once before the listener binds.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub config: Arc<ConsoleConfig>,
    pub runtime: Arc<RuntimeState>,
    pub auth_source: AuthSource,
    pub build: BuildInfo,
    pub mode: ServeMode,
}

impl Bootstrap {
    /// Resolve the bootstrap from validated config and the environment.
    pub fn resolve(config: ConsoleConfig, env: &(impl EnvSource + ?Sized)) -> Result<Self, StartupError> {
        let runtime = RuntimeState::resolve(config.server.default_port, env)?;
        let auth_source = resolve_external_auth_source(&config.auth.sources);
        let build = BuildInfo::load(Path::new(&config.server.commit_hash_file));
        let mode = ServeMode::from_debug_flag(config.server.debug);

        tracing::info!(
            server_mode = ?runtime.server_mode(),
            embedded = runtime.is_embedded(),
            effective_port = runtime.effective_port(),
            "Runtime resolved"
        );
        tracing::info!(auth_source = %auth_source, "External authentication source resolved");
        tracing::info!(
            version = build.version,
            commit_hash = build.commit_hash.as_deref().unwrap_or("unknown"),
            mode = ?mode,
            "Build info"
        );

        Ok(Self {
            config: Arc::new(config),
            runtime: Arc::new(runtime),
            auth_source,
            build,
            mode,
        })
    }

    /// The normalizer is only installed for standalone deployments.
    pub fn installs_proxy_normalizer(&self) -> bool {
        !self.runtime.is_embedded()
    }

    /// `host:port` to bind, bracketing bare IPv6 hosts.
    pub fn bind_address(&self) -> String {
        let host = &self.config.server.host;
        let port = self.runtime.effective_port();
        if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        }
    }

    /// Bind the listener; a conflict is fatal.
    pub async fn bind(&self) -> Result<TcpListener, StartupError> {
        if let Some(warning) = self.mode.bind_warning(&self.config.server.host) {
            tracing::warn!(host = %self.config.server.host, "{}", warning);
        }
        Ok(listener::bind(&self.bind_address()).await?)
    }
}

/// Bind, serve `pages` with the realtime channel, and return after shutdown.
///
/// A shutdown triggered before this is called returns without binding.
pub async fn run(bootstrap: Bootstrap, pages: Router, shutdown: &Shutdown) -> Result<(), StartupError> {
    // Subscribe first: a trigger after this point is buffered in the receiver.
    let shutdown_rx = shutdown.subscribe();
    if shutdown.is_triggered() {
        tracing::info!("Shutdown requested before startup completed");
        return Ok(());
    }

    let server = HttpServer::with_pages(&bootstrap, pages);
    let listener = bootstrap.bind().await?;
    server.run(listener, shutdown_rx).await?;
    Ok(())
}
