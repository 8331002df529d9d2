//! Shared utilities for integration testing.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use console_runtime::config::{ConsoleConfig, ProxyTrustConfig};
use console_runtime::lifecycle::Bootstrap;
use console_runtime::realtime::RealtimeHub;
use console_runtime::{AuthSource, HttpServer, RequestContext, RuntimeState, Shutdown};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A console server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub hub: Arc<RealtimeHub>,
    pub handle: JoinHandle<io::Result<()>>,
}

/// Config trusting one hop of every forwarded header.
pub fn test_config() -> ConsoleConfig {
    let mut config = ConsoleConfig::default();
    config.server.commit_hash_file = "/nonexistent/commit_hash".into();
    config.proxy = ProxyTrustConfig::single_hop();
    config.auth.sources = vec!["internal".into(), "ldap".into(), "oauth2".into()];
    config
}

/// Page layer that reports what it was handed.
#[allow(dead_code)]
pub fn context_pages() -> Router {
    Router::new()
        .route("/", get(describe))
        .route("/{*rest}", get(describe))
}

async fn describe(
    ctx: RequestContext,
    Extension(auth_source): Extension<AuthSource>,
    Extension(runtime): Extension<Arc<RuntimeState>>,
) -> Json<Value> {
    Json(json!({
        "context": ctx,
        "auth_source": auth_source,
        "embedded": runtime.is_embedded(),
    }))
}

/// Start a server with `config`, environment `env` and page layer `pages`.
pub async fn spawn_server(config: ConsoleConfig, env: &[(&str, &str)], pages: Router) -> TestServer {
    let bootstrap = Bootstrap::resolve(config, env).unwrap();
    let server = HttpServer::with_pages(&bootstrap, pages);
    let hub = server.hub();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(server.run(listener, server_shutdown));

    TestServer {
        addr,
        shutdown,
        hub,
        handle,
    }
}

/// HTTP client that never routes through a system proxy.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// A port that was free a moment ago.
#[allow(dead_code)]
pub async fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}
