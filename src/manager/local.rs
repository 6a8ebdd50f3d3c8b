//! Filesystem-backed version manager.
//!
//! Layout under the nvs home directory:
//!
//! ```text
//! <home>/<feed>/<version>/<arch>/bin/node   installed versions
//! <home>/current -> <feed>/<version>/<arch>  linked version
//! <home>/cache/<feed>.json                   last fetched feed index
//! <home>/settings.toml                       feed configuration
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::VersionManager;
use super::path_env::{self, PathUpdate};
use super::remote;
use crate::EOL;
use crate::config::{Feed, NvsConfig};
use crate::context::ExecutionContext;
use crate::errors::ManagerError;
use crate::version::{Label, SemVer, VersionOrLabel, VersionSpecifier};

const CURRENT_LINK: &str = "current";

/// A version present on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub feed: String,
    pub version: SemVer,
    pub arch: String,
    pub dir: PathBuf,
}

impl InstalledVersion {
    pub fn spec(&self) -> VersionSpecifier {
        VersionSpecifier::new(
            Some(self.feed.clone()),
            VersionOrLabel::Semantic(self.version.clone()),
            Some(self.arch.clone()),
        )
    }

    pub fn binary_path(&self) -> PathBuf {
        binary_path(&self.dir)
    }
}

impl std::fmt::Display for InstalledVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.feed, self.version, self.arch)
    }
}

fn binary_path(version_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        version_dir.join("node.exe")
    } else {
        version_dir.join("bin").join("node")
    }
}

fn archive_name(feed: &Feed, version: &SemVer, arch: &str) -> String {
    let (os, ext) = match std::env::consts::OS {
        "windows" => ("win", "zip"),
        "macos" => ("darwin", "tar.gz"),
        other => (other, "tar.gz"),
    };
    format!("{}-v{}-{}-{}.{}", feed.archive_prefix(), version, os, arch, ext)
}

pub struct LocalManager {
    config: NvsConfig,
    path: Option<OsString>,
    postscript: Option<PathBuf>,
}

impl LocalManager {
    pub fn new(config: NvsConfig, ctx: &ExecutionContext) -> Self {
        Self {
            config,
            path: ctx.path.clone(),
            postscript: ctx.postscript.clone(),
        }
    }

    fn home(&self) -> &Path {
        &self.config.home
    }

    fn link_path(&self) -> PathBuf {
        self.home().join(CURRENT_LINK)
    }

    fn feed(&self, name: Option<&str>) -> Result<&Feed> {
        match name {
            None => Ok(self.config.default_feed()),
            Some(name) => self.config.feed(name).ok_or_else(|| {
                ManagerError::UnknownFeed {
                    name: name.to_string(),
                    configured: self.config.feed_names().join(", "),
                }
                .into()
            }),
        }
    }

    fn version_dir(&self, feed: &str, version: &SemVer, arch: &str) -> PathBuf {
        self.home().join(feed).join(version.to_string()).join(arch)
    }

    /// All installed versions: feeds in configured order, newest first
    /// within a feed.
    pub fn installed(&self) -> Result<Vec<InstalledVersion>> {
        let mut all = Vec::new();
        for feed in &self.config.feeds {
            let feed_dir = self.home().join(&feed.name);
            if !feed_dir.is_dir() {
                continue;
            }
            let mut found = Vec::new();
            for entry in read_dir(&feed_dir)? {
                if !entry.path().is_dir() {
                    continue;
                }
                let Some(version) = entry
                    .file_name()
                    .to_str()
                    .and_then(SemVer::parse)
                    .filter(SemVer::is_complete)
                else {
                    continue;
                };
                for arch_entry in read_dir(&entry.path())? {
                    let dir = arch_entry.path();
                    if !binary_path(&dir).is_file() {
                        continue;
                    }
                    found.push(InstalledVersion {
                        feed: feed.name.clone(),
                        version: version.clone(),
                        arch: arch_entry.file_name().to_string_lossy().into_owned(),
                        dir,
                    });
                }
            }
            found.sort_by(|a, b| b.version.cmp(&a.version).then(a.arch.cmp(&b.arch)));
            all.extend(found);
        }
        Ok(all)
    }

    /// Recover an installed version from its directory.
    fn installed_at(&self, dir: &Path) -> Option<InstalledVersion> {
        let rel = dir.strip_prefix(self.home()).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        let [feed, version, arch] = parts.as_slice() else {
            return None;
        };
        Some(InstalledVersion {
            feed: feed.clone(),
            version: SemVer::parse(version).filter(SemVer::is_complete)?,
            arch: arch.clone(),
            dir: dir.to_path_buf(),
        })
    }

    /// The version whose bin directory is on `PATH`.
    fn current(&self) -> Option<InstalledVersion> {
        let path = self.path.as_deref()?;
        let dir = path_env::find_in_path(path, self.home())?;
        self.installed_at(&dir)
    }

    /// The version the `current` link points at.
    fn linked(&self) -> Option<InstalledVersion> {
        let target = std::fs::read_link(self.link_path()).ok()?;
        let target = if target.is_absolute() {
            target
        } else {
            self.home().join(target)
        };
        self.installed_at(&target)
    }

    fn resolve_installed(&self, spec: &VersionSpecifier) -> Result<InstalledVersion> {
        let feed = self.feed(spec.feed_name())?;
        let arch = spec.arch_or_host();
        let candidates: Vec<InstalledVersion> = self
            .installed()?
            .into_iter()
            .filter(|v| v.feed == feed.name && v.arch == arch)
            .collect();

        let found = match spec.version() {
            VersionOrLabel::Semantic(wanted) => {
                candidates.into_iter().find(|v| wanted.matches(&v.version))
            }
            VersionOrLabel::Label(Label::Latest) => candidates.into_iter().next(),
            VersionOrLabel::Label(Label::Lts) => {
                let lts = self.cached_lts(&feed.name)?;
                candidates.into_iter().find(|v| lts.contains(&v.version))
            }
        };
        found.ok_or_else(|| {
            ManagerError::NotInstalled {
                version: spec.to_string(),
            }
            .into()
        })
    }

    fn cached_lts(&self, feed_name: &str) -> Result<Vec<SemVer>> {
        let index = remote::load_cache(self.home(), feed_name)?.ok_or_else(|| {
            ManagerError::NoCachedIndex {
                feed: feed_name.to_string(),
            }
        })?;
        Ok(remote::lts_versions(&index))
    }

    fn current_or_linked(&self) -> Result<InstalledVersion> {
        self.current()
            .or_else(|| self.linked())
            .ok_or_else(|| ManagerError::NoCurrentVersion.into())
    }

    fn update_path(&self, add: Option<&Path>) -> Result<PathUpdate> {
        let update = path_env::rewrite(self.path.as_deref(), self.home(), add)?;
        if let Some(postscript) = &self.postscript
            && !update.is_unchanged()
        {
            path_env::write_postscript(postscript, &update.new_path)?;
        }
        Ok(update)
    }

    fn remove_link(&self) -> Result<()> {
        let link = self.link_path();
        #[cfg(windows)]
        let removed = std::fs::remove_dir(&link);
        #[cfg(not(windows))]
        let removed = std::fs::remove_file(&link);
        removed.with_context(|| format!("Failed to remove {}", link.display()))
    }

    fn create_link(&self, target: &Path) -> Result<()> {
        let link = self.link_path();
        #[cfg(windows)]
        let created = std::os::windows::fs::symlink_dir(target, &link);
        #[cfg(not(windows))]
        let created = std::os::unix::fs::symlink(target, &link);
        created.with_context(|| format!("Failed to link {}", link.display()))
    }

    fn has_link(&self) -> bool {
        std::fs::symlink_metadata(self.link_path()).is_ok()
    }

    async fn download_and_extract(&self, feed: &Feed, version: &SemVer, arch: &str) -> Result<()> {
        let name = archive_name(feed, version, arch);
        let url = format!("{}/v{}/{}", feed.uri.trim_end_matches('/'), version, name);
        let download_dir = self.home().join("cache").join("downloads");
        tokio::fs::create_dir_all(&download_dir)
            .await
            .context("Failed to create download directory")?;
        let archive = download_dir.join(&name);

        tracing::info!(%url, "downloading");
        let bytes = reqwest::get(&url)
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ManagerError::Download {
                url: url.clone(),
                message: e.to_string(),
            })?
            .bytes()
            .await
            .with_context(|| format!("Failed to read {}", url))?;
        tokio::fs::write(&archive, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", archive.display()))?;

        let target = self.version_dir(&feed.name, version, arch);
        tokio::fs::create_dir_all(&target)
            .await
            .with_context(|| format!("Failed to create {}", target.display()))?;

        let status = tokio::process::Command::new("tar")
            .arg("-xf")
            .arg(&archive)
            .arg("-C")
            .arg(&target)
            .arg("--strip-components=1")
            .status()
            .await
            .context("Failed to spawn tar")?;
        let _ = tokio::fs::remove_file(&archive).await;

        if !status.success() {
            let _ = tokio::fs::remove_dir_all(&target).await;
            return Err(ManagerError::ExtractFailed {
                exit_code: status.code().unwrap_or(-1),
            }
            .into());
        }
        Ok(())
    }
}

fn read_dir(dir: &Path) -> Result<Vec<std::fs::DirEntry>> {
    std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read {}", dir.display()))
}

/// Remove `dir` if empty, then its parent if that is now empty, stopping at
/// `home`.
fn prune_empty(dir: &Path, home: &Path) {
    let mut dir = dir.to_path_buf();
    while dir != home && dir.starts_with(home) {
        if std::fs::remove_dir(&dir).is_err() {
            break;
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => break,
        }
    }
}

#[async_trait]
impl VersionManager for LocalManager {
    fn version_binary_path(&self, version: Option<&VersionSpecifier>) -> Result<String> {
        let installed = match version {
            Some(spec) => self.resolve_installed(spec)?,
            None => self.current_or_linked()?,
        };
        Ok(installed.binary_path().display().to_string())
    }

    async fn install(&self, version: &VersionSpecifier) -> Result<Option<String>> {
        let feed = self.feed(version.feed_name())?;
        let index = remote::fetch(feed).await?;
        remote::save_cache(self.home(), &feed.name, &index)?;

        let (_, resolved) = remote::resolve(&index, version.version()).ok_or_else(|| {
            ManagerError::NotAvailable {
                feed: feed.name.clone(),
                version: version.version().to_string(),
            }
        })?;
        let arch = version.arch_or_host();
        let dir = self.version_dir(&feed.name, &resolved, &arch);

        if binary_path(&dir).is_file() {
            tracing::info!(dir = %dir.display(), "already installed");
        } else {
            self.download_and_extract(feed, &resolved, &arch)
                .await
                .with_context(|| format!("Failed to install {}/{}/{}", feed.name, resolved, arch))?;
        }
        Ok(Some(binary_path(&dir).display().to_string()))
    }

    fn uninstall(&self, version: &VersionSpecifier) -> Result<String> {
        let installed = self.resolve_installed(version)?;
        let mut lines = Vec::new();

        if self.linked().as_ref() == Some(&installed) {
            self.remove_link()?;
            lines.push(format!("Removed {}", self.link_path().display()));
        }
        if self.current().as_ref() == Some(&installed) && self.postscript.is_some() {
            let update = self.update_path(None)?;
            lines.push(update.describe());
        }

        std::fs::remove_dir_all(&installed.dir)
            .with_context(|| format!("Failed to remove {}", installed.dir.display()))?;
        if let Some(version_dir) = installed.dir.parent() {
            prune_empty(version_dir, self.home());
        }
        lines.push(format!("Removed {}", installed));
        Ok(lines.join(EOL))
    }

    fn list_installed(
        &self,
        feed_name: Option<&str>,
        version: Option<&VersionOrLabel>,
    ) -> Result<String> {
        let current = self.current();
        let linked = self.linked();
        let installed = self.installed()?;
        let mut listed = Vec::new();

        for feed in &self.config.feeds {
            if feed_name.is_some_and(|f| f != feed.name) {
                continue;
            }
            let in_feed: Vec<InstalledVersion> = installed
                .iter()
                .filter(|v| v.feed == feed.name)
                .cloned()
                .collect();
            let selected: Vec<InstalledVersion> = match version {
                None => in_feed,
                Some(VersionOrLabel::Semantic(wanted)) => in_feed
                    .into_iter()
                    .filter(|v| wanted.matches(&v.version))
                    .collect(),
                Some(VersionOrLabel::Label(Label::Latest)) => in_feed
                    .first()
                    .map(|newest| {
                        in_feed
                            .iter()
                            .filter(|v| v.version == newest.version)
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default(),
                Some(VersionOrLabel::Label(Label::Lts)) => {
                    match remote::load_cache(self.home(), &feed.name)? {
                        Some(index) => {
                            let lts = remote::lts_versions(&index);
                            in_feed
                                .into_iter()
                                .filter(|v| lts.contains(&v.version))
                                .collect()
                        }
                        None => Vec::new(),
                    }
                }
            };
            listed.extend(selected);
        }

        let mut text = String::new();
        for v in &listed {
            let current_mark = if current.as_ref() == Some(v) { '>' } else { ' ' };
            let linked_mark = if linked.as_ref() == Some(v) { '#' } else { ' ' };
            text.push_str(&format!("{}{}{}{}", current_mark, linked_mark, v, EOL));
        }
        Ok(text)
    }

    async fn list_available(&self, feed_name: Option<&str>) -> Result<Option<String>> {
        let feed = self.feed(feed_name)?;
        let index = remote::fetch(feed).await?;
        remote::save_cache(self.home(), &feed.name, &index)?;
        Ok(Some(remote::format_listing(&feed.name, &index).join(EOL)))
    }

    async fn run(&self, version: &VersionSpecifier, args: &[String]) -> Result<Option<String>> {
        let installed = self.resolve_installed(version)?;
        let binary = installed.binary_path();
        tracing::info!(binary = %binary.display(), "spawning");
        let status = tokio::process::Command::new(&binary)
            .args(args)
            .status()
            .await
            .with_context(|| format!("Failed to run {}", binary.display()))?;
        if !status.success() {
            return Err(ManagerError::ChildExit {
                exit_code: status.code().unwrap_or(-1),
            }
            .into());
        }
        Ok(None)
    }

    fn link(&self, version: Option<&VersionSpecifier>) -> Result<String> {
        let installed = match version {
            Some(spec) => self.resolve_installed(spec)?,
            None => self.current().ok_or(ManagerError::NoCurrentVersion)?,
        };
        if self.has_link() {
            self.remove_link()?;
        }
        self.create_link(&installed.dir)?;
        Ok(format!(
            "{} -> {}",
            self.link_path().display(),
            installed.dir.display()
        ))
    }

    fn unlink(&self, version: Option<&VersionSpecifier>) -> Result<String> {
        if !self.has_link() {
            return Ok(String::new());
        }
        if let Some(spec) = version {
            let installed = self.resolve_installed(spec)?;
            if self.linked().as_ref() != Some(&installed) {
                return Ok(String::new());
            }
        }
        self.remove_link()?;
        Ok(format!("Removed {}", self.link_path().display()))
    }

    fn activate(&self, version: Option<&VersionSpecifier>) -> Result<String> {
        let bin = match version {
            Some(spec) => Some(path_env::bin_dir(&self.resolve_installed(spec)?.dir)),
            None => None,
        };
        let update = self.update_path(bin.as_deref())?;
        Ok(update.describe())
    }

    fn linked_version(&self) -> Result<VersionSpecifier> {
        self.linked()
            .map(|v| v.spec())
            .ok_or_else(|| ManagerError::NoCurrentVersion.into())
    }

    fn feed_names(&self) -> Vec<String> {
        self.config.feed_names()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::version::host_arch;
    use tempfile::{TempDir, tempdir};

    fn fake_install(home: &Path, feed: &str, version: &str, arch: &str) -> PathBuf {
        let dir = home.join(feed).join(version).join(arch);
        std::fs::create_dir_all(dir.join("bin")).unwrap();
        std::fs::write(dir.join("bin").join("node"), "#!/bin/sh\nexit 0\n").unwrap();
        dir
    }

    fn setup() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let home = dir.path().join(".nvs");
        let arch = host_arch();
        fake_install(&home, "node", "4.6.0", &arch);
        fake_install(&home, "node", "6.3.1", &arch);
        fake_install(&home, "node", "6.10.0", &arch);
        fake_install(&home, "iojs", "3.3.1", &arch);
        (dir, home)
    }

    fn manager(home: &Path, path: Option<&str>, postscript: Option<PathBuf>) -> LocalManager {
        let ctx = ExecutionContext {
            path: path.map(OsString::from),
            postscript,
            ..ExecutionContext::interactive()
        };
        LocalManager::new(NvsConfig::load_from(home.to_path_buf()).unwrap(), &ctx)
    }

    fn spec(s: &str) -> VersionSpecifier {
        s.parse().unwrap()
    }

    #[test]
    fn test_installed_orders_feeds_then_newest_first() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        let names: Vec<String> = m
            .installed()
            .unwrap()
            .iter()
            .map(|v| format!("{}/{}", v.feed, v.version))
            .collect();
        assert_eq!(
            names,
            vec!["node/6.10.0", "node/6.3.1", "node/4.6.0", "iojs/3.3.1"]
        );
    }

    #[test]
    fn test_installed_ignores_incomplete_dirs() {
        let (_dir, home) = setup();
        std::fs::create_dir_all(home.join("node").join("8.0.0").join("x64")).unwrap();
        std::fs::create_dir_all(home.join("node").join("junk")).unwrap();
        let m = manager(&home, None, None);
        assert_eq!(m.installed().unwrap().len(), 4);
    }

    #[test]
    fn test_which_resolves_partial_to_newest() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        let path = m.version_binary_path(Some(&spec("6"))).unwrap();
        assert!(path.ends_with(&format!("node/6.10.0/{}/bin/node", host_arch())));
    }

    #[test]
    fn test_which_not_installed() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        let err = m.version_binary_path(Some(&spec("5"))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ManagerError>(),
            Some(ManagerError::NotInstalled { .. })
        ));
    }

    #[test]
    fn test_which_without_version_uses_path_then_link() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        assert!(m.version_binary_path(None).is_err());

        let bin = home.join("iojs/3.3.1").join(host_arch()).join("bin");
        let path = format!("{}:/usr/bin", bin.display());
        let m = manager(&home, Some(&path), None);
        assert!(m.version_binary_path(None).unwrap().contains("iojs/3.3.1"));
    }

    #[test]
    fn test_unknown_feed() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        let err = m.version_binary_path(Some(&spec("nope/6"))).unwrap_err();
        assert!(err.to_string().contains("Configured feeds: node, iojs"));
    }

    #[test]
    fn test_lts_label_requires_cache() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        let err = m.version_binary_path(Some(&spec("lts"))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ManagerError>(),
            Some(ManagerError::NoCachedIndex { .. })
        ));

        let index: Vec<remote::RemoteVersion> = serde_json::from_str(
            r#"[{"version":"v6.10.0","lts":false},{"version":"v4.6.0","lts":"Argon"}]"#,
        )
        .unwrap();
        remote::save_cache(&home, "node", &index).unwrap();
        let path = m.version_binary_path(Some(&spec("lts"))).unwrap();
        assert!(path.contains("4.6.0"));
    }

    #[test]
    fn test_list_installed_marks_and_filters() {
        let (_dir, home) = setup();
        let bin = home.join("node/6.3.1").join(host_arch()).join("bin");
        let m = manager(&home, Some(&bin.display().to_string()), None);
        m.link(Some(&spec("4.6.0"))).unwrap();

        let arch = host_arch();
        let all = m.list_installed(None, None).unwrap();
        assert_eq!(
            all,
            format!(
                "  node/6.10.0/{arch}\n> node/6.3.1/{arch}\n #node/4.6.0/{arch}\n  iojs/3.3.1/{arch}\n"
            )
        );

        let iojs = m.list_installed(Some("iojs"), None).unwrap();
        assert_eq!(iojs, format!("  iojs/3.3.1/{arch}\n"));

        let six = spec("6.3").version().clone();
        let filtered = m.list_installed(Some("node"), Some(&six)).unwrap();
        assert_eq!(filtered, format!("> node/6.3.1/{arch}\n"));
    }

    #[test]
    fn test_list_installed_unknown_feed_is_empty() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        assert_eq!(m.list_installed(Some("nope"), None).unwrap(), "");
    }

    #[test]
    fn test_link_unlink_and_linked_version() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        assert!(m.linked_version().is_err());
        assert_eq!(m.unlink(None).unwrap(), "");

        let out = m.link(Some(&spec("6.3.1"))).unwrap();
        assert!(out.contains("current ->"));
        assert_eq!(
            m.linked_version().unwrap().to_string(),
            format!("node/6.3.1/{}", host_arch())
        );

        // Relinking replaces the existing link.
        m.link(Some(&spec("4.6.0"))).unwrap();
        assert!(m.linked_version().unwrap().to_string().contains("4.6.0"));

        // Unlinking a different version leaves the link alone.
        assert_eq!(m.unlink(Some(&spec("6.3.1"))).unwrap(), "");
        assert!(m.linked_version().is_ok());

        assert!(m.unlink(None).unwrap().starts_with("Removed"));
        assert!(m.linked_version().is_err());
    }

    #[test]
    fn test_link_without_version_needs_current() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        assert!(m.link(None).is_err());
    }

    #[test]
    fn test_uninstall_removes_dir_link_and_empty_parents() {
        let (_dir, home) = setup();
        let m = manager(&home, None, None);
        m.link(Some(&spec("iojs/3.3.1"))).unwrap();

        let out = m.uninstall(&spec("iojs/3.3.1")).unwrap();
        assert!(out.contains("Removed"));
        assert!(out.contains("iojs/3.3.1"));
        assert!(!home.join("iojs").exists());
        assert!(!home.join(CURRENT_LINK).exists());
        assert!(home.join("node").exists());
    }

    #[test]
    fn test_activate_writes_postscript() {
        let (dir, home) = setup();
        let postscript = dir.path().join("post.sh");
        let old = home.join("node/4.6.0").join(host_arch()).join("bin");
        let path = format!("{}:/usr/bin", old.display());
        let m = manager(&home, Some(&path), Some(postscript.clone()));

        let out = m.activate(Some(&spec("6.3.1"))).unwrap();
        let new = home.join("node/6.3.1").join(host_arch()).join("bin");
        assert_eq!(
            out,
            format!("PATH -= {}\nPATH += {}", old.display(), new.display())
        );
        assert_eq!(
            std::fs::read_to_string(&postscript).unwrap(),
            format!("export PATH=\"{}:/usr/bin\"\n", new.display())
        );
    }

    #[test]
    fn test_activate_none_removes_versions() {
        let (_dir, home) = setup();
        let old = home.join("node/4.6.0").join(host_arch()).join("bin");
        let path = format!("{}:/usr/bin", old.display());
        let m = manager(&home, Some(&path), None);
        assert_eq!(
            m.activate(None).unwrap(),
            format!("PATH -= {}", old.display())
        );
    }

    #[tokio::test]
    async fn test_run_propagates_exit_code() {
        let (_dir, home) = setup();
        let dir = home.join("node/6.3.1").join(host_arch());
        let node = dir.join("bin").join("node");
        std::fs::write(&node, "#!/bin/sh\nexit \"$1\"\n").unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&node, std::fs::Permissions::from_mode(0o755)).unwrap();

        let m = manager(&home, None, None);
        assert_eq!(m.run(&spec("6.3.1"), &["0".to_string()]).await.unwrap(), None);

        let err = m.run(&spec("6.3.1"), &["3".to_string()]).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ManagerError>(),
            Some(ManagerError::ChildExit { exit_code: 3 })
        ));
    }

    #[test]
    fn test_archive_name() {
        let config = NvsConfig::load_from(tempdir().unwrap().path().to_path_buf()).unwrap();

        let node = config.feed("node").unwrap();
        let name = archive_name(node, &SemVer::parse("6.3.1").unwrap(), "x64");
        assert!(name.starts_with("node-v6.3.1-"));
        assert!(name.contains("-x64."));

        let iojs = config.feed("iojs").unwrap();
        let name = archive_name(iojs, &SemVer::parse("3.3.1").unwrap(), "x86");
        assert!(name.starts_with("iojs-v3.3.1-"));
        assert!(name.contains("-x86."));
    }
}
