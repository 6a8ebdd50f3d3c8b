//! Command routing.
//!
//! Token 0 is resolved once against [`ALIASES`] into a [`Command`], then
//! dispatched to exactly one handler. Every handler returns a
//! [`CommandResult`] for the reporter to print.
//!
//! | Command         | Manager operation        | Result    |
//! |-----------------|--------------------------|-----------|
//! | `Which`         | `version_binary_path`    | immediate |
//! | `Install`       | `install`                | deferred  |
//! | `Uninstall`     | `uninstall`              | immediate |
//! | `ListInstalled` | `list_installed`         | immediate |
//! | `ListAvailable` | `list_available`         | deferred  |
//! | `Run`           | `run`                    | deferred  |
//! | `Link`/`Unlink` | `link` / `unlink`        | immediate |
//! | `Use`/fallback  | `activate`               | immediate |

use std::io::Write;

use crate::context::ExecutionContext;
use crate::errors::{CommandError, ParseError};
use crate::manager::VersionManager;
use crate::outcome::{CommandResult, ExitStatus, Reporter, trim_single_eol};
use crate::usage;
use crate::version::{self, VersionSpecifier};

/// Canonical commands. `Fallback` covers any unrecognized token 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Version,
    Which,
    Install,
    Uninstall,
    ListInstalled,
    ListAvailable,
    Run,
    Link,
    Unlink,
    Use,
    Fallback,
}

/// Accepted tokens for each canonical command. Matching is case-sensitive.
/// An absent token 0 also selects `Help`.
pub const ALIASES: &[(Command, &[&str])] = &[
    (
        Command::Help,
        &["-h", "/h", "-?", "/?", "-help", "/help", "--help"],
    ),
    (Command::Version, &["-v", "--version"]),
    (Command::Which, &["w", "which"]),
    (Command::Install, &["+", "add", "install"]),
    (Command::Uninstall, &["-", "rm", "remove", "uninstall"]),
    (
        Command::ListInstalled,
        &["l", "list", "ls", "lsi", "ls-installed", "list-installed"],
    ),
    (
        Command::ListAvailable,
        &[
            "la",
            "lsa",
            "lr",
            "lsr",
            "ls-available",
            "ls-remote",
            "list-available",
            "list-remote",
        ],
    ),
    (Command::Run, &["r", "run"]),
    (Command::Link, &["link", "ln"]),
    (Command::Unlink, &["unlink", "ul"]),
    (Command::Use, &["use"]),
];

impl Command {
    pub fn resolve(token: Option<&str>) -> Command {
        let Some(token) = token else {
            return Command::Help;
        };
        ALIASES
            .iter()
            .find(|(_, aliases)| aliases.contains(&token))
            .map(|(command, _)| *command)
            .unwrap_or(Command::Fallback)
    }

    /// Whether the command reads the nvs home or its feed settings.
    /// Usage falls back to the default feed list when they cannot be loaded.
    pub fn needs_config(self) -> bool {
        !matches!(self, Command::Help | Command::Version)
    }
}

/// Routes one invocation to the version manager.
pub struct Router<'a> {
    ctx: &'a ExecutionContext,
    manager: &'a dyn VersionManager,
}

impl<'a> Router<'a> {
    pub fn new(ctx: &'a ExecutionContext, manager: &'a dyn VersionManager) -> Self {
        Self { ctx, manager }
    }

    /// Resolve and run the command selected by `args[0]`.
    ///
    /// Deferred results are returned unawaited; `status` is only touched by
    /// the usage path.
    pub fn dispatch(
        &self,
        args: &'a [String],
        status: &mut ExitStatus,
    ) -> Result<CommandResult<'a>, CommandError> {
        let command = Command::resolve(args.first().map(String::as_str));
        tracing::debug!(?command, args = ?args, "resolved command");

        let arg = args.get(1).map(String::as_str);
        let manager = self.manager;

        let result = match command {
            Command::Help => {
                status.mark_usage();
                CommandResult::text(usage::render(
                    self.ctx.can_mutate_environment,
                    &manager.feed_names(),
                ))
            }
            Command::Version => CommandResult::text(env!("CARGO_PKG_VERSION")),
            Command::Which => {
                let version = optional(arg)?;
                CommandResult::text(manager.version_binary_path(version.as_ref())?)
            }
            Command::Install => {
                let version = version::parse(arg)?;
                tracing::info!(%version, "installing");
                CommandResult::deferred(async move { manager.install(&version).await })
            }
            Command::Uninstall => {
                let version = version::parse(arg)?;
                tracing::info!(%version, "uninstalling");
                CommandResult::text(manager.uninstall(&version)?)
            }
            Command::ListInstalled => {
                let listing = match optional(arg) {
                    Ok(None) => manager.list_installed(None, None)?,
                    Ok(Some(v)) => manager.list_installed(v.feed_name(), Some(v.version()))?,
                    // Not a version: filter by feed name alone.
                    Err(_) => manager.list_installed(arg, None)?,
                };
                CommandResult::text(trim_single_eol(listing))
            }
            Command::ListAvailable => {
                CommandResult::deferred(async move { manager.list_available(arg).await })
            }
            Command::Run => {
                let version = version::parse(arg)?;
                let extra = args.get(2..).unwrap_or_default();
                tracing::info!(%version, ?extra, "running");
                CommandResult::deferred(async move { manager.run(&version, extra).await })
            }
            Command::Link => {
                let version = optional(arg)?;
                CommandResult::text(manager.link(version.as_ref())?)
            }
            Command::Unlink => {
                let version = optional(arg)?;
                CommandResult::text(manager.unlink(version.as_ref())?)
            }
            Command::Use => {
                self.require_mutation()?;
                let version = match arg {
                    Some("link") => Some(manager.linked_version()?),
                    _ => optional(arg)?,
                };
                CommandResult::text(manager.activate(version.as_ref())?)
            }
            Command::Fallback => {
                // Token 0 is discarded; token 1 must be a version.
                tracing::debug!(token = %args[0], "unrecognized command, treating as 'use'");
                let version = version::parse(arg)?;
                self.require_mutation()?;
                CommandResult::text(manager.activate(Some(&version))?)
            }
        };
        Ok(result)
    }

    fn require_mutation(&self) -> Result<(), CommandError> {
        if self.ctx.can_mutate_environment {
            Ok(())
        } else {
            Err(CommandError::Capability)
        }
    }
}

/// Parse an argument only when one was given (empty counts as absent).
fn optional(arg: Option<&str>) -> Result<Option<VersionSpecifier>, ParseError> {
    match arg {
        Some(raw) if !raw.is_empty() => version::parse(Some(raw)).map(Some),
        _ => Ok(None),
    }
}

/// Route, run, and report one invocation. Returns the process exit status.
pub async fn invoke<O: Write, E: Write>(
    args: &[String],
    ctx: &ExecutionContext,
    manager: &dyn VersionManager,
    out: O,
    err: E,
) -> ExitStatus {
    let mut reporter = Reporter::new(ctx.debug, out, err);
    let router = Router::new(ctx, manager);
    let routed = router.dispatch(args, reporter.status_mut());
    reporter.settle(routed).await;
    reporter.status()
}
