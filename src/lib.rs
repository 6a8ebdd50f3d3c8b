pub mod config;
pub mod context;
pub mod errors;
pub mod manager;
pub mod outcome;
pub mod router;
pub mod usage;
pub mod version;

/// Platform line separator.
pub const EOL: &str = if cfg!(windows) { "\r\n" } else { "\n" };
