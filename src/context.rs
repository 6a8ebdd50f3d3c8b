//! Per-invocation execution context.
//!
//! Environment signals are read exactly once, when the context is built.
//! Nothing downstream calls `std::env::var` for these values again.

use std::ffi::OsString;
use std::path::PathBuf;

pub const ENV_DEBUG: &str = "NVS_DEBUG";
pub const ENV_EXECUTE: &str = "NVS_EXECUTE";
pub const ENV_HOME: &str = "NVS_HOME";
pub const ENV_POSTSCRIPT: &str = "NVS_POSTSCRIPT";

/// Immutable snapshot of the environment signals nvs consumes.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Render failures with full diagnostic detail.
    pub debug: bool,
    /// False when running as a plain executable that cannot change the
    /// parent shell's environment.
    pub can_mutate_environment: bool,
    /// Override for the nvs home directory.
    pub home: Option<PathBuf>,
    /// File the sourcing shell wrapper evaluates after nvs exits.
    pub postscript: Option<PathBuf>,
    /// The `PATH` seen at startup.
    pub path: Option<OsString>,
}

impl ExecutionContext {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Build a context from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Self {
        let present = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            debug: present(ENV_DEBUG),
            can_mutate_environment: !present(ENV_EXECUTE),
            home: non_empty(ENV_HOME).map(PathBuf::from),
            postscript: non_empty(ENV_POSTSCRIPT).map(PathBuf::from),
            path: lookup("PATH"),
        }
    }

    /// Context for an interactive (sourced) invocation with no overrides.
    pub fn interactive() -> Self {
        Self {
            can_mutate_environment: true,
            ..Self::default()
        }
    }
}
