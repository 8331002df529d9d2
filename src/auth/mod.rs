//! Authentication source precedence.
//!
//! Only decides which configured source is authoritative; the
//! authentication itself belongs to the page/API layer, which receives the
//! resolved [`AuthSource`] as a request extension.

pub mod source;

pub use source::{resolve_external_auth_source, AuthSource, INTERNAL};
