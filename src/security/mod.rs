//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (standalone deployments only):
//!     → forwarded.rs (adopt trusted X-Script-Name / X-Scheme / X-Forwarded-*)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - No trust in client input beyond configured hop counts
//! - Embedded deployments never consult forwarded headers

pub mod forwarded;

pub use forwarded::{apply_forwarded_headers, trusted_hop, Applied};
