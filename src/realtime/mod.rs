//! Realtime channel layer.
//!
//! # Data Flow
//! ```text
//! GET {realtime.path} + Upgrade: websocket
//!     → http/websocket.rs (upgrade handshake on the shared listener)
//!     → hub.rs (register session, frame loop)
//!     → handler.rs (ChannelHandler decides replies)
//! ```

pub mod handler;
pub mod hub;

pub use handler::{ChannelHandler, EchoHandler, Session};
pub use hub::RealtimeHub;
