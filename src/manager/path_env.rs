//! `PATH` rewriting for `nvs use`.
//!
//! nvs cannot change its parent shell's environment directly. When invoked
//! through the sourced shell wrapper, `NVS_POSTSCRIPT` names a file that the
//! wrapper evaluates after nvs exits; the new `PATH` is written there.

use anyhow::{Context, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::EOL;

/// Directory holding the node binary within an installed version directory.
pub fn bin_dir(version_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        version_dir.to_path_buf()
    } else {
        version_dir.join("bin")
    }
}

/// Map a `PATH` entry back to the version directory it belongs to, if it is
/// the bin directory of a version under `home`.
pub fn version_dir_of(entry: &Path, home: &Path) -> Option<PathBuf> {
    let dir = if cfg!(windows) {
        entry.to_path_buf()
    } else if entry.file_name() == Some(OsStr::new("bin")) {
        entry.parent()?.to_path_buf()
    } else {
        return None;
    };
    let rel = dir.strip_prefix(home).ok()?;
    (rel.components().count() == 3).then_some(dir)
}

/// The first version directory found on `path`.
pub fn find_in_path(path: &OsStr, home: &Path) -> Option<PathBuf> {
    std::env::split_paths(path).find_map(|entry| version_dir_of(&entry, home))
}

/// Result of rewriting `PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathUpdate {
    pub removed: Vec<PathBuf>,
    pub added: Option<PathBuf>,
    pub new_path: OsString,
}

impl PathUpdate {
    pub fn is_unchanged(&self) -> bool {
        self.removed.is_empty() && self.added.is_none()
    }

    /// `PATH -= <dir>` / `PATH += <dir>` lines.
    pub fn describe(&self) -> String {
        let mut lines: Vec<String> = self
            .removed
            .iter()
            .map(|p| format!("PATH -= {}", p.display()))
            .collect();
        if let Some(added) = &self.added {
            lines.push(format!("PATH += {}", added.display()));
        }
        lines.join(EOL)
    }
}

/// Remove every nvs version bin directory from `path`, then prepend
/// `add` when given. Re-adding the directory already first on `path` is
/// reported as no change.
pub fn rewrite(path: Option<&OsStr>, home: &Path, add: Option<&Path>) -> Result<PathUpdate> {
    let entries: Vec<PathBuf> = path.map(|p| std::env::split_paths(p).collect()).unwrap_or_default();

    if let (Some(add), Some(first)) = (add, entries.first())
        && first == add
        && entries[1..].iter().all(|e| version_dir_of(e, home).is_none())
    {
        return Ok(PathUpdate {
            removed: Vec::new(),
            added: None,
            new_path: path.map(OsStr::to_os_string).unwrap_or_default(),
        });
    }

    let (removed, mut kept): (Vec<PathBuf>, Vec<PathBuf>) = entries
        .into_iter()
        .partition(|e| version_dir_of(e, home).is_some());

    if let Some(add) = add {
        kept.insert(0, add.to_path_buf());
    }

    let new_path = std::env::join_paths(&kept).context("Failed to build PATH")?;
    Ok(PathUpdate {
        removed,
        added: add.map(Path::to_path_buf),
        new_path,
    })
}

/// Write the shell statement that applies `new_path`, in the syntax implied
/// by the postscript's extension.
pub fn write_postscript(postscript: &Path, new_path: &OsStr) -> Result<()> {
    let value = new_path.to_string_lossy();
    let script = match postscript.extension().and_then(OsStr::to_str) {
        Some("cmd") | Some("bat") => format!("SET PATH={}\r\n", value),
        Some("ps1") => format!("$env:PATH = \"{}\"\r\n", value),
        _ => format!("export PATH=\"{}\"\n", value),
    };
    std::fs::write(postscript, script)
        .with_context(|| format!("Failed to write postscript {}", postscript.display()))
}
