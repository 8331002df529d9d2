//! Realtime session registry.
//!
//! # Responsibilities
//! - Track open sessions
//! - Run each session's frame loop
//! - Drop every session when the listener stops
//!
//! # Design Decisions
//! - Started and stopped together with the listener
//! - Stopping drops sessions without a close handshake or drain
//! - One task per session; the registry is a `DashMap`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::{Message, WebSocket};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::RealtimeConfig;
use crate::http::request::RequestContext;
use crate::observability::metrics;
use crate::realtime::handler::{ChannelHandler, Session};

/// Registry and lifecycle owner of realtime sessions.
pub struct RealtimeHub {
    sessions: DashMap<Uuid, Session>,
    handler: Arc<dyn ChannelHandler>,
    running: AtomicBool,
    stop_tx: broadcast::Sender<()>,
    max_message_size: usize,
}

impl RealtimeHub {
    /// Create a stopped hub.
    pub fn new(config: &RealtimeConfig, handler: Arc<dyn ChannelHandler>) -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self {
            sessions: DashMap::new(),
            handler,
            running: AtomicBool::new(false),
            stop_tx,
            max_message_size: config.max_message_size,
        }
    }

    /// Begin accepting sessions.
    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        tracing::info!("Realtime channel started");
    }

    /// Stop accepting sessions and drop every open one.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let open = self.sessions.len();
        let _ = self.stop_tx.send(());
        tracing::info!(open_sessions = open, "Realtime channel stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of currently open sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Run a session until the peer leaves or the hub stops.
    pub async fn serve(self: Arc<Self>, socket: WebSocket, ctx: RequestContext) {
        // Subscribe before the running check so a concurrent stop is not missed.
        let mut stop_rx = self.stop_tx.subscribe();
        if !self.is_running() {
            return;
        }

        let session = Session {
            id: Uuid::new_v4(),
            remote_addr: ctx.remote_addr,
            opened_at: Instant::now(),
        };
        self.sessions.insert(session.id, session.clone());
        metrics::set_realtime_sessions(self.sessions.len());
        self.handler.on_open(&session);

        tracing::debug!(
            session_id = %session.id,
            remote_addr = ?session.remote_addr,
            "Realtime session opened"
        );

        let (mut sink, mut stream) = socket.split();
        loop {
            tokio::select! {
                _ = stop_rx.recv() => {
                    tracing::debug!(session_id = %session.id, "Dropping realtime session on shutdown");
                    break;
                }
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = self.handler.on_text(&session, text.as_str()) {
                            if sink.send(Message::Text(reply.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session.id, error = %e, "Realtime session error");
                        break;
                    }
                },
            }
        }

        self.sessions.remove(&session.id);
        metrics::set_realtime_sessions(self.sessions.len());
        self.handler.on_close(&session);

        tracing::debug!(
            session_id = %session.id,
            duration_ms = session.opened_at.elapsed().as_millis() as u64,
            "Realtime session closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::handler::EchoHandler;

    #[test]
    fn test_hub_lifecycle() {
        let hub = RealtimeHub::new(&RealtimeConfig::default(), Arc::new(EchoHandler));
        assert!(!hub.is_running());

        hub.start();
        assert!(hub.is_running());

        hub.stop();
        assert!(!hub.is_running());

        // Stopping twice is harmless.
        hub.stop();
        assert_eq!(hub.session_count(), 0);
    }

    #[test]
    fn test_max_message_size_from_config() {
        let config = RealtimeConfig {
            max_message_size: 4096,
            ..RealtimeConfig::default()
        };
        let hub = RealtimeHub::new(&config, Arc::new(EchoHandler));
        assert_eq!(hub.max_message_size(), 4096);
    }
}
