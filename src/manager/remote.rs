//! Remote feed indexes.
//!
//! Each feed publishes an `index.json` listing its releases, newest first:
//!
//! ```json
//! [{"version": "v6.3.1", "lts": false, "files": ["linux-x64", "win-x86-zip"]},
//!  {"version": "v4.6.0", "lts": "Argon", "files": ["linux-x64"]}]
//! ```
//!
//! The last fetched index per feed is cached under `<home>/cache/` so that
//! the `lts` label can be resolved against installed versions offline.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::Feed;
use crate::errors::ManagerError;
use crate::version::{Label, SemVer, VersionOrLabel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteVersion {
    pub version: String,
    /// `false`, or the LTS codename.
    #[serde(default)]
    pub lts: serde_json::Value,
    #[serde(default)]
    pub files: Vec<String>,
}

impl RemoteVersion {
    pub fn semver(&self) -> Option<SemVer> {
        SemVer::parse(&self.version).filter(SemVer::is_complete)
    }

    pub fn lts_codename(&self) -> Option<&str> {
        self.lts.as_str()
    }

    pub fn is_lts(&self) -> bool {
        match &self.lts {
            serde_json::Value::Bool(b) => *b,
            serde_json::Value::String(s) => !s.is_empty(),
            _ => false,
        }
    }
}

/// Download a feed's index.
pub async fn fetch(feed: &Feed) -> Result<Vec<RemoteVersion>> {
    let url = feed.index_url();
    tracing::info!(feed = %feed.name, %url, "fetching index");
    let response = reqwest::get(&url)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| ManagerError::Download {
            url: url.clone(),
            message: e.to_string(),
        })?;
    let versions = response
        .json::<Vec<RemoteVersion>>()
        .await
        .with_context(|| format!("Failed to parse index from {}", url))?;
    Ok(versions)
}

pub fn cache_path(home: &Path, feed_name: &str) -> PathBuf {
    home.join("cache").join(format!("{}.json", feed_name))
}

pub fn save_cache(home: &Path, feed_name: &str, versions: &[RemoteVersion]) -> Result<()> {
    let path = cache_path(home, feed_name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
    }
    std::fs::write(&path, serde_json::to_string(versions)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

pub fn load_cache(home: &Path, feed_name: &str) -> Result<Option<Vec<RemoteVersion>>> {
    let path = cache_path(home, feed_name);
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(serde_json::from_str(&raw).with_context(|| {
        format!("Failed to parse {}", path.display())
    })?))
}

/// Newest release matching a version or label.
pub fn resolve<'v>(versions: &'v [RemoteVersion], wanted: &VersionOrLabel) -> Option<(&'v RemoteVersion, SemVer)> {
    versions
        .iter()
        .filter_map(|rv| rv.semver().map(|sv| (rv, sv)))
        .filter(|(rv, sv)| match wanted {
            VersionOrLabel::Semantic(w) => w.matches(sv),
            VersionOrLabel::Label(Label::Latest) => true,
            VersionOrLabel::Label(Label::Lts) => rv.is_lts(),
        })
        .max_by(|a, b| a.1.cmp(&b.1))
}

/// Complete versions the index marks as LTS.
pub fn lts_versions(versions: &[RemoteVersion]) -> Vec<SemVer> {
    versions
        .iter()
        .filter(|rv| rv.is_lts())
        .filter_map(RemoteVersion::semver)
        .collect()
}

/// One `feed/version` line per release, with the LTS codename appended.
pub fn format_listing(feed_name: &str, versions: &[RemoteVersion]) -> Vec<String> {
    versions
        .iter()
        .filter_map(|rv| {
            let sv = rv.semver()?;
            Some(match rv.lts_codename() {
                Some(codename) => format!("{}/{} ({})", feed_name, sv, codename),
                None => format!("{}/{}", feed_name, sv),
            })
        })
        .collect()
}
