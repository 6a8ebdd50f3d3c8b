//! Feed configuration, read from `<nvs home>/settings.toml`.
//!
//! ```toml
//! [[feeds]]
//! name = "node"
//! uri = "https://nodejs.org/dist/"
//!
//! [[feeds]]
//! name = "iojs"
//! uri = "https://iojs.org/dist/"
//! archive_prefix = "iojs"
//! ```
//!
//! Feed order matters: the first feed is the default for specifiers that
//! omit a feed name, and usage text lists feeds in this order.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::context::ExecutionContext;

pub const SETTINGS_FILE: &str = "settings.toml";

/// A named source of installable versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub name: String,
    /// Base URI; `index.json` and `v<version>/` archives live beneath it.
    pub uri: String,
    /// Leading part of archive file names (`<prefix>-v6.3.1-linux-x64.tar.gz`).
    /// Defaults to `node`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_prefix: Option<String>,
}

impl Feed {
    pub fn new(name: &str, uri: &str) -> Self {
        Self {
            name: name.to_string(),
            uri: uri.to_string(),
            archive_prefix: None,
        }
    }

    pub fn with_archive_prefix(mut self, prefix: &str) -> Self {
        self.archive_prefix = Some(prefix.to_string());
        self
    }

    pub fn archive_prefix(&self) -> &str {
        self.archive_prefix.as_deref().unwrap_or("node")
    }

    pub fn index_url(&self) -> String {
        format!("{}/index.json", self.uri.trim_end_matches('/'))
    }
}

fn default_feeds() -> Vec<Feed> {
    vec![
        Feed::new("node", "https://nodejs.org/dist/"),
        Feed::new("iojs", "https://iojs.org/dist/").with_archive_prefix("iojs"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NvsToml {
    #[serde(default = "default_feeds")]
    pub feeds: Vec<Feed>,
}

impl Default for NvsToml {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
        }
    }
}

impl NvsToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let toml: NvsToml = toml::from_str(content)?;
        if toml.feeds.is_empty() {
            anyhow::bail!("At least one feed must be configured");
        }
        Ok(toml)
    }

    /// Return warnings for suspicious but loadable settings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        for feed in &self.feeds {
            if !seen.insert(feed.name.as_str()) {
                warnings.push(format!("Duplicate feed name '{}'", feed.name));
            }
            if !(feed.uri.starts_with("https://") || feed.uri.starts_with("http://")) {
                warnings.push(format!(
                    "Feed '{}' has a non-http uri '{}'",
                    feed.name, feed.uri
                ));
            }
        }
        warnings
    }
}

/// Resolved runtime configuration: home directory plus feeds.
#[derive(Debug, Clone)]
pub struct NvsConfig {
    pub home: PathBuf,
    pub feeds: Vec<Feed>,
}

impl NvsConfig {
    /// Resolve the home directory from the context (or `~/.nvs`) and load
    /// `settings.toml` from it when present.
    pub fn load(ctx: &ExecutionContext) -> Result<Self> {
        let home = match &ctx.home {
            Some(home) => home.clone(),
            None => dirs::home_dir()
                .ok_or_else(|| anyhow!("Could not determine home directory"))?
                .join(".nvs"),
        };
        Self::load_from(home)
    }

    pub fn load_from(home: PathBuf) -> Result<Self> {
        let settings = home.join(SETTINGS_FILE);
        let toml = if settings.exists() {
            NvsToml::load(&settings)?
        } else {
            NvsToml::default()
        };
        for warning in toml.validate() {
            tracing::warn!("{}: {}", settings.display(), warning);
        }
        Ok(Self {
            home,
            feeds: toml.feeds,
        })
    }

    /// Default feeds without reading any settings file.
    pub fn defaults(home: PathBuf) -> Self {
        Self {
            home,
            feeds: default_feeds(),
        }
    }

    pub fn feed_names(&self) -> Vec<String> {
        self.feeds.iter().map(|f| f.name.clone()).collect()
    }

    pub fn default_feed(&self) -> &Feed {
        &self.feeds[0]
    }

    pub fn feed(&self, name: &str) -> Option<&Feed> {
        self.feeds.iter().find(|f| f.name == name)
    }
}
