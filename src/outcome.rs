//! Command results, exit status policy, and failure rendering.

use futures::future::BoxFuture;
use std::io::Write;

use crate::EOL;
use crate::errors::CommandError;

/// What a routed command produced.
pub enum CommandResult<'a> {
    /// Nothing to print.
    Absent,
    /// Text available immediately.
    Text(String),
    /// Text (or failure) that must be awaited before the process exits.
    Deferred(BoxFuture<'a, anyhow::Result<Option<String>>>),
}

impl<'a> CommandResult<'a> {
    /// Empty text is treated the same as no result.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            CommandResult::Absent
        } else {
            CommandResult::Text(text)
        }
    }

    pub fn deferred<F>(fut: F) -> Self
    where
        F: std::future::Future<Output = anyhow::Result<Option<String>>> + Send + 'a,
    {
        CommandResult::Deferred(Box::pin(fut))
    }
}

impl std::fmt::Debug for CommandResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandResult::Absent => write!(f, "Absent"),
            CommandResult::Text(t) => f.debug_tuple("Text").field(t).finish(),
            CommandResult::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

/// Process exit status.
///
/// Usage output sets 127 only over a clean status; any failure sets 1,
/// replacing a usage status set earlier in the same invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitStatus(i32);

impl ExitStatus {
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    pub const FAILURE: ExitStatus = ExitStatus(1);
    pub const USAGE: ExitStatus = ExitStatus(127);

    pub fn mark_usage(&mut self) {
        if *self == Self::SUCCESS {
            *self = Self::USAGE;
        }
    }

    pub fn mark_failure(&mut self) {
        *self = Self::FAILURE;
    }

    pub fn code(self) -> i32 {
        self.0
    }
}

/// Render a failure for standard error.
///
/// The detailed form carries the error kind and the full debug rendering
/// (cause chain and backtrace when one was captured); it is always longer
/// than the short form.
pub fn render_failure(err: &CommandError, debug: bool) -> String {
    if !debug {
        return err.to_string();
    }
    let detail = match err {
        CommandError::Collaborator(e) => format!("{:?}", e),
        other => format!("{}{EOL}{EOL}Details: {:?}", other, other),
    };
    format!("[{}] {}", err.kind(), detail)
}

/// Strip exactly one trailing line separator. Text ending in two or more
/// separators is returned untouched.
pub fn trim_single_eol(text: String) -> String {
    match text.strip_suffix(EOL) {
        Some(rest) if !rest.ends_with(EOL) => rest.to_string(),
        _ => text,
    }
}

/// Writes command results to the output streams and tracks exit status.
pub struct Reporter<O: Write, E: Write> {
    debug: bool,
    out: O,
    err: E,
    status: ExitStatus,
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(debug: bool, out: O, err: E) -> Self {
        Self {
            debug,
            out,
            err,
            status: ExitStatus::SUCCESS,
        }
    }

    pub fn status(&self) -> ExitStatus {
        self.status
    }

    pub fn status_mut(&mut self) -> &mut ExitStatus {
        &mut self.status
    }

    #[cfg(test)]
    fn into_parts(self) -> (O, E, ExitStatus) {
        (self.out, self.err, self.status)
    }

    /// Print the routed result, awaiting it first when deferred. Routing
    /// failures and deferred failures are reported the same way.
    pub async fn settle(&mut self, routed: Result<CommandResult<'_>, CommandError>) {
        match routed {
            Ok(CommandResult::Absent) => {}
            Ok(CommandResult::Text(text)) => self.print(&text),
            Ok(CommandResult::Deferred(fut)) => match fut.await {
                Ok(Some(text)) if !text.is_empty() => self.print(&text),
                Ok(_) => {}
                Err(e) => self.fail(&CommandError::Collaborator(e)),
            },
            Err(e) => self.fail(&e),
        }
    }

    pub fn fail(&mut self, err: &CommandError) {
        tracing::debug!(kind = err.kind(), "command failed");
        let message = render_failure(err, self.debug);
        if let Err(e) = writeln!(self.err, "{}", message) {
            tracing::error!("Failed to write error report: {}", e);
        }
        self.status.mark_failure();
    }

    fn print(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text) {
            tracing::error!("Failed to write output: {}", e);
            self.status.mark_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ManagerError, ParseError};

    fn reporter(debug: bool) -> Reporter<Vec<u8>, Vec<u8>> {
        Reporter::new(debug, Vec::new(), Vec::new())
    }

    fn finish(r: Reporter<Vec<u8>, Vec<u8>>) -> (String, String, i32) {
        let (out, err, status) = r.into_parts();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
            status.code(),
        )
    }

    #[test]
    fn test_exit_status_usage_only_over_success() {
        assert_eq!(ExitStatus::default(), ExitStatus::SUCCESS);
        let mut status = ExitStatus::SUCCESS;
        status.mark_usage();
        assert_eq!(status, ExitStatus::USAGE);

        let mut failed = ExitStatus::FAILURE;
        failed.mark_usage();
        assert_eq!(failed, ExitStatus::FAILURE);
    }

    #[test]
    fn test_exit_status_failure_overrides_usage() {
        let mut status = ExitStatus::default();
        status.mark_usage();
        status.mark_failure();
        assert_eq!(status.code(), 1);
    }

    #[test]
    fn test_empty_text_is_absent() {
        assert!(matches!(CommandResult::text(""), CommandResult::Absent));
        assert!(matches!(CommandResult::text("x"), CommandResult::Text(_)));
    }

    #[test]
    fn test_trim_single_eol() {
        assert_eq!(trim_single_eol(format!("a{EOL}b{EOL}")), format!("a{EOL}b"));
        assert_eq!(trim_single_eol("a".to_string()), "a");
        assert_eq!(trim_single_eol(format!("a{EOL}{EOL}")), format!("a{EOL}{EOL}"));
        assert_eq!(trim_single_eol(EOL.to_string()), "");
    }

    #[test]
    fn test_render_short_vs_detailed_for_every_kind() {
        let errors = vec![
            CommandError::Parse(ParseError::Invalid { raw: "x".into() }),
            CommandError::Capability,
            CommandError::Collaborator(anyhow::Error::new(ManagerError::NoCurrentVersion)),
        ];
        for err in &errors {
            let short = render_failure(err, false);
            let detailed = render_failure(err, true);
            assert_eq!(short, err.to_string());
            assert!(detailed.len() > short.len(), "{detailed}");
            assert!(detailed.starts_with(&format!("[{}]", err.kind())));
            assert!(detailed.contains(&short));
        }
    }

    #[test]
    fn test_render_detailed_includes_cause_chain() {
        let err = CommandError::Collaborator(
            anyhow::Error::new(ManagerError::ExtractFailed { exit_code: 2 })
                .context("Failed to install node/6.3.1/x64"),
        );
        assert_eq!(render_failure(&err, false), "Failed to install node/6.3.1/x64");
        let detailed = render_failure(&err, true);
        assert!(detailed.contains("Caused by"));
        assert!(detailed.contains("exit code 2"));
    }

    #[tokio::test]
    async fn test_settle_absent_prints_nothing() {
        let mut r = reporter(false);
        r.settle(Ok(CommandResult::Absent)).await;
        assert_eq!(finish(r), (String::new(), String::new(), 0));
    }

    #[tokio::test]
    async fn test_settle_text_goes_to_stdout() {
        let mut r = reporter(false);
        r.settle(Ok(CommandResult::text("/home/u/.nvs/node/6.3.1/x64/bin/node")))
            .await;
        let (out, err, code) = finish(r);
        assert_eq!(out, "/home/u/.nvs/node/6.3.1/x64/bin/node\n");
        assert!(err.is_empty());
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_settle_deferred_success() {
        let mut r = reporter(false);
        r.settle(Ok(CommandResult::deferred(async {
            Ok(Some("installed".to_string()))
        })))
        .await;
        let (out, _, code) = finish(r);
        assert_eq!(out, "installed\n");
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_settle_deferred_empty_prints_nothing() {
        let mut r = reporter(false);
        r.settle(Ok(CommandResult::deferred(async { Ok(None) }))).await;
        assert_eq!(finish(r), (String::new(), String::new(), 0));
    }

    #[tokio::test]
    async fn test_settle_deferred_failure_matches_sync_failure() {
        let mut deferred = reporter(false);
        deferred
            .settle(Ok(CommandResult::deferred(async {
                Err(anyhow::anyhow!("network unreachable"))
            })))
            .await;

        let mut sync = reporter(false);
        sync.settle(Err(CommandError::Collaborator(anyhow::anyhow!(
            "network unreachable"
        ))))
        .await;

        let deferred = finish(deferred);
        assert_eq!(deferred, finish(sync));
        assert_eq!(deferred.1, "network unreachable\n");
        assert_eq!(deferred.2, 1);
    }

    #[tokio::test]
    async fn test_settle_failure_replaces_usage_status() {
        let mut r = reporter(false);
        r.status_mut().mark_usage();
        r.settle(Err(CommandError::Capability)).await;
        assert_eq!(r.status().code(), 1);
    }
}
