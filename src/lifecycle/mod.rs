//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Resolve runtime state & auth source → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Stop realtime channel → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger controlled shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then runtime, then listener
//! - Realtime sessions are dropped on shutdown, not drained
//! - A bind conflict is fatal and never retried

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{Bootstrap, BuildInfo, ServeMode, StartupError};
