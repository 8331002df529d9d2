//! Request pipeline middleware.

pub mod errors;
pub mod reverse_proxied;

pub use errors::{panic_layer, PanicResponder};
pub use reverse_proxied::{normalize_request, ReverseProxied, ReverseProxiedLayer};
