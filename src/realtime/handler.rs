//! Pluggable realtime message handling.
//!
//! The wire protocol spoken over the channel belongs to the page/API layer;
//! the hub only hands it each inbound text frame.

use std::net::IpAddr;
use std::time::Instant;

use uuid::Uuid;

/// An open realtime session.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub remote_addr: Option<IpAddr>,
    pub opened_at: Instant,
}

/// Handles traffic on realtime sessions.
pub trait ChannelHandler: Send + Sync + 'static {
    /// Called once the session is registered.
    fn on_open(&self, _session: &Session) {}

    /// Handle an inbound text frame, optionally replying.
    fn on_text(&self, session: &Session, text: &str) -> Option<String>;

    /// Called after the session has been removed, for any reason.
    fn on_close(&self, _session: &Session) {}
}

/// Replies to every text frame with the same text.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

impl ChannelHandler for EchoHandler {
    fn on_text(&self, _session: &Session, text: &str) -> Option<String> {
        Some(text.to_string())
    }
}
