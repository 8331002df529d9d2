//! External authentication source resolution.
//!
//! The configured source list is a priority order, not a set: the first
//! entry that is not the built-in source is authoritative. When no such
//! entry exists the built-in source is used.

use std::fmt;

use serde::Serialize;

/// Identifier of the built-in authentication source.
pub const INTERNAL: &str = "internal";

/// The authentication source the auth subsystem must treat as authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthSource(String);

impl AuthSource {
    /// The built-in source.
    pub fn internal() -> Self {
        Self(INTERNAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the built-in source.
    pub fn is_internal(&self) -> bool {
        self.0 == INTERNAL
    }
}

impl fmt::Display for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pick the external authentication source from an ordered list.
pub fn resolve_external_auth_source<S: AsRef<str>>(sources: &[S]) -> AuthSource {
    sources
        .iter()
        .map(AsRef::as_ref)
        .find(|source| *source != INTERNAL)
        .map(|source| AuthSource(source.to_string()))
        .unwrap_or_else(AuthSource::internal)
}
