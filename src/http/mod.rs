//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum::serve, connect info)
//!     → middleware/reverse_proxied.rs (standalone only: normalize, rewrite path)
//!     → Router
//!         → websocket.rs (realtime upgrade on realtime.path)
//!         → page/API layer (pages.rs or the embedding application's router)
//! ```

pub mod middleware;
pub mod pages;
pub mod request;
pub mod server;
pub mod websocket;

pub use request::{OriginalRequest, RequestContext};
pub use server::{ConsoleService, HttpServer};
