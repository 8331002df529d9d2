//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! bind address (server.host + effective port)
//!     → listener.rs (bind, classify failures)
//!     → Hand off to HTTP layer (axum::serve)
//! ```

pub mod listener;

pub use listener::{bind, ListenerError};
