//! Environment access.
//!
//! Values are read as raw OS strings: a variable that is present but not
//! valid unicode is still present.

use std::collections::HashMap;
use std::ffi::OsString;

/// Server-mode override set by the launching controller.
pub const SERVER_MODE_VAR: &str = "CONSOLE_SERVER_MODE";

/// Port override set by the desktop controller.
pub const INT_PORT_VAR: &str = "CONSOLE_INT_PORT";

/// Shared secret set by the desktop controller.
pub const INT_KEY_VAR: &str = "CONSOLE_INT_KEY";

/// Source of environment variables.
pub trait EnvSource {
    /// Returns the value of `key`, or `None` if unset.
    fn var_os(&self, key: &str) -> Option<OsString>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var_os(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}

impl EnvSource for HashMap<String, OsString> {
    fn var_os(&self, key: &str) -> Option<OsString> {
        self.get(key).cloned()
    }
}

impl EnvSource for [(&str, &str)] {
    fn var_os(&self, key: &str) -> Option<OsString> {
        self.iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| OsString::from(*v))
    }
}

impl<const N: usize> EnvSource for [(&str, &str); N] {
    fn var_os(&self, key: &str) -> Option<OsString> {
        self.as_slice().var_os(key)
    }
}
