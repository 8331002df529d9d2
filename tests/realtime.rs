//! Realtime channel attachment and lifecycle.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

mod common;

#[tokio::test]
async fn test_realtime_shares_page_listener() {
    let server = common::spawn_server(common::test_config(), &[], common::context_pages()).await;

    // Plain page request on the same port.
    let res = common::client()
        .get(format!("http://{}/browser/", server.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let (mut ws, _) = connect_async(format!("ws://{}/socket.io", server.addr))
        .await
        .expect("WebSocket upgrade failed");

    ws.send(Message::Text("hello".into())).await.unwrap();
    let reply = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("no reply")
        .expect("stream ended")
        .unwrap();
    assert_eq!(reply.to_text().unwrap(), "hello");
    assert_eq!(server.hub.session_count(), 1);

    ws.close(None).await.unwrap();
    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_realtime_behind_prefix() {
    let server = common::spawn_server(common::test_config(), &[], common::context_pages()).await;

    let mut request = format!("ws://{}/console/socket.io", server.addr)
        .into_client_request()
        .unwrap();
    request
        .headers_mut()
        .insert("X-Script-Name", HeaderValue::from_static("/console"));

    let (mut ws, _) = connect_async(request).await.expect("WebSocket upgrade failed");
    ws.send(Message::Text("ping".into())).await.unwrap();
    let reply = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("no reply")
        .expect("stream ended")
        .unwrap();
    assert_eq!(reply.to_text().unwrap(), "ping");

    server.shutdown.trigger();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_drops_open_sessions() {
    let server = common::spawn_server(common::test_config(), &[], common::context_pages()).await;

    let (mut ws, _) = connect_async(format!("ws://{}/socket.io", server.addr))
        .await
        .expect("WebSocket upgrade failed");
    ws.send(Message::Text("hello".into())).await.unwrap();
    let _ = ws.next().await;
    assert!(server.hub.is_running());

    server.shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
    assert!(!server.hub.is_running());

    // The session is dropped without a drain; no further echo arrives.
    let next = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("session was not dropped");
    assert!(!matches!(next, Some(Ok(Message::Text(_)))));

    let mut remaining = server.hub.session_count();
    for _ in 0..50 {
        if remaining == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        remaining = server.hub.session_count();
    }
    assert_eq!(remaining, 0);
}
