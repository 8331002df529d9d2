//! End-to-end bootstrap scenarios.

use std::time::Duration;

use console_runtime::http::pages::default_pages;
use console_runtime::lifecycle::{startup, Bootstrap, Shutdown, StartupError};
use console_runtime::net::ListenerError;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_standalone_normalizes_forwarded_headers() {
    let server = common::spawn_server(common::test_config(), &[], common::context_pages()).await;

    let body: Value = common::client()
        .get(format!("http://{}/console/browser/?tab=2", server.addr))
        .header("X-Script-Name", "/console")
        .header("X-Forwarded-For", "198.51.100.1, 203.0.113.5")
        .header("X-Forwarded-Proto", "https")
        .header("X-Forwarded-Host", "db.example.com")
        .send()
        .await
        .expect("Console unreachable")
        .json()
        .await
        .unwrap();

    let ctx = &body["context"];
    assert_eq!(ctx["path"], "/browser/");
    assert_eq!(ctx["script_name"], "/console");
    assert_eq!(ctx["remote_addr"], "203.0.113.5");
    assert_eq!(ctx["scheme"], "https");
    assert_eq!(ctx["host"], "db.example.com");
    assert_eq!(ctx["original"]["remote_addr"], "127.0.0.1");
    assert_eq!(body["auth_source"], "ldap");
    assert_eq!(body["embedded"], false);

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_embedded_ignores_forwarded_headers() {
    let env = [("CONSOLE_INT_KEY", "XYZ"), ("CONSOLE_SERVER_MODE", "OFF")];
    let server = common::spawn_server(common::test_config(), &env, common::context_pages()).await;

    let body: Value = common::client()
        .get(format!("http://{}/console/browser/", server.addr))
        .header("X-Script-Name", "/console")
        .header("X-Scheme", "https")
        .header("X-Forwarded-For", "203.0.113.5")
        .send()
        .await
        .expect("Console unreachable")
        .json()
        .await
        .unwrap();

    let ctx = &body["context"];
    assert_eq!(ctx["path"], "/console/browser/");
    assert_eq!(ctx["script_name"], "");
    assert_eq!(ctx["remote_addr"], "127.0.0.1");
    assert_eq!(ctx["scheme"], "http");
    assert_eq!(body["embedded"], true);
    // Auth resolution is independent of embedding.
    assert_eq!(body["auth_source"], "ldap");

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_zero_trust_ignores_spoofed_client_address() {
    let mut config = common::test_config();
    config.proxy.x_for = 0;
    let server = common::spawn_server(config, &[], common::context_pages()).await;

    let body: Value = common::client()
        .get(format!("http://{}/", server.addr))
        .header("X-Forwarded-For", "203.0.113.5")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["context"]["remote_addr"], "127.0.0.1");

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_port_override_serves_on_effective_port() {
    let port = common::free_port().await;
    let port_str = port.to_string();
    let bootstrap =
        Bootstrap::resolve(common::test_config(), &[("CONSOLE_INT_PORT", port_str.as_str())]).unwrap();
    assert_eq!(bootstrap.runtime.effective_port(), port);
    assert!(bootstrap.installs_proxy_normalizer());

    let shutdown = Shutdown::new();
    let client = common::client();
    let ping = async {
        // Give the listener a moment to bind.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let text = client
            .get(format!("http://127.0.0.1:{}/misc/ping", port))
            .send()
            .await
            .expect("Console unreachable")
            .text()
            .await
            .unwrap();
        shutdown.trigger();
        text
    };

    let (result, text) = tokio::join!(startup::run(bootstrap, default_pages(), &shutdown), ping);
    assert_eq!(text, "PING");
    assert!(result.is_ok(), "shutdown should be a normal return: {:?}", result.err());
}

#[tokio::test]
async fn test_shutdown_before_startup_is_not_lost() {
    let mut config = common::test_config();
    config.server.default_port = common::free_port().await;
    let bootstrap = Bootstrap::resolve(config, &[]).unwrap();

    // A signal that lands before the listener subscribes.
    let shutdown = Shutdown::new();
    shutdown.trigger();

    let result = tokio::time::timeout(
        Duration::from_secs(3),
        startup::run(bootstrap, default_pages(), &shutdown),
    )
    .await
    .expect("an early shutdown must still stop the console");
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_bind_conflict_is_fatal() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = common::test_config();
    config.server.default_port = occupied.local_addr().unwrap().port();

    let bootstrap = Bootstrap::resolve(config, &[]).unwrap();
    let shutdown = Shutdown::new();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        startup::run(bootstrap, default_pages(), &shutdown),
    )
    .await
    .expect("bind failure must not be retried");

    assert!(matches!(
        result,
        Err(StartupError::Listener(ListenerError::AddrInUse { .. }))
    ));
}

#[tokio::test]
async fn test_debug_mode_surfaces_panics() {
    use axum::{routing::get, Router};

    async fn broken() -> &'static str {
        panic!("template missing: browser/index.html")
    }
    let pages = Router::new().route("/broken", get(broken));

    let mut config = common::test_config();
    config.server.debug = true;
    let server = common::spawn_server(config, &[], pages.clone()).await;

    let res = common::client()
        .get(format!("http://{}/broken", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert!(res.text().await.unwrap().contains("template missing"));

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();

    let server = common::spawn_server(common::test_config(), &[], pages).await;
    let res = common::client()
        .get(format!("http://{}/broken", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert!(!res.text().await.unwrap().contains("template missing"));

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}
