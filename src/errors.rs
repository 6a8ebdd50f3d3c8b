//! Typed error hierarchy for nvs.
//!
//! Three enums cover the three layers:
//! - `ParseError` — malformed or missing version specifiers
//! - `CommandError` — failures surfaced by routing and dispatch
//! - `ManagerError` — typed failures from the local version manager

use thiserror::Error;

/// Errors from the version specifier parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("A version argument is required.")]
    Missing,

    #[error("Invalid version string: {raw}")]
    Invalid { raw: String },
}

/// Errors from a single routed command.
///
/// Every failure that reaches the top level is funneled through one of these
/// variants so the renderer can tag it with its kind.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(
        "The 'use' command is not available when invoking this tool as an{eol}executable. \
         To enable PATH updates, source nvs.sh from your shell instead.",
        eol = crate::EOL
    )]
    Capability,

    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

impl CommandError {
    /// Short tag naming the error kind, used by detailed rendering.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandError::Parse(_) => "parse",
            CommandError::Capability => "capability",
            CommandError::Collaborator(_) => "collaborator",
        }
    }
}

/// Errors from the local version manager.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Specified version not found: {version}")]
    NotInstalled { version: String },

    #[error("No version is currently in use or linked.")]
    NoCurrentVersion,

    #[error("Feed not found: {name}. Configured feeds: {configured}")]
    UnknownFeed { name: String, configured: String },

    #[error("Version {version} not found in remote feed {feed}")]
    NotAvailable { feed: String, version: String },

    #[error("No cached index for feed {feed}; run 'nvs ls-remote {feed}' first")]
    NoCachedIndex { feed: String },

    #[error("Failed to download {url}: {message}")]
    Download { url: String, message: String },

    #[error("Archive extraction failed with exit code {exit_code}")]
    ExtractFailed { exit_code: i32 },

    #[error("Process exited with code {exit_code}")]
    ChildExit { exit_code: i32 },
}
