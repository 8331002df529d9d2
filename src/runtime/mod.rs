//! Runtime mode subsystem.
//!
//! # Data Flow
//! ```text
//! environment (CONSOLE_SERVER_MODE, CONSOLE_INT_PORT, CONSOLE_INT_KEY)
//!     + server.default_port
//!     → state.rs (RuntimeState::resolve)
//!     → Arc<RuntimeState>, read-only for the life of the process
//! ```

pub mod env;
pub mod state;

pub use env::{EnvSource, ProcessEnv};
pub use state::{RuntimeError, RuntimeState, ServerMode};
