//! Runtime bootstrap and reverse-proxy normalization for the database console.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod realtime;
pub mod runtime;
pub mod security;

pub use auth::AuthSource;
pub use config::ConsoleConfig;
pub use http::{HttpServer, RequestContext};
pub use lifecycle::{Bootstrap, Shutdown};
pub use runtime::RuntimeState;
