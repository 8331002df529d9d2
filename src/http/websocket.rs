//! Realtime upgrade handling.
//!
//! # Responsibilities
//! - Accept WebSocket upgrades on the console's own listener
//! - Refuse upgrades while the realtime hub is stopped
//! - Hand the upgraded socket to the hub
//!
//! # Design Decisions
//! - Same port as page traffic; routing picks the upgrade path
//! - Ping/pong handled by axum

use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::http::request::RequestContext;
use crate::realtime::RealtimeHub;

/// Upgrade the request to a realtime session.
pub async fn realtime_upgrade(
    State(hub): State<Arc<RealtimeHub>>,
    ctx: RequestContext,
    ws: WebSocketUpgrade,
) -> Response {
    if !hub.is_running() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Realtime channel is not running").into_response();
    }

    ws.max_message_size(hub.max_message_size())
        .on_upgrade(move |socket| hub.serve(socket, ctx))
}
