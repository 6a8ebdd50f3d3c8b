//! Version manager collaborators.
//!
//! The router talks to a [`VersionManager`]; the real implementation is
//! [`LocalManager`], which manages versions under the nvs home directory.
//!
//! | Module     | Concern                                          |
//! |------------|--------------------------------------------------|
//! | `local`    | installed versions, links, run, install/remove   |
//! | `remote`   | feed `index.json` fetch, cache, and resolution   |
//! | `path_env` | `PATH` rewriting and the shell postscript        |

pub mod local;
pub mod path_env;
pub mod remote;

use anyhow::Result;
use async_trait::async_trait;

use crate::version::{VersionOrLabel, VersionSpecifier};

pub use local::LocalManager;

/// Abstraction over version management for testability.
/// Real implementation: `LocalManager`. Test double: `RecordingManager`.
///
/// Synchronous methods produce immediate text; async methods are the
/// deferred operations awaited by the result normalizer.
#[async_trait]
pub trait VersionManager: Send + Sync {
    fn version_binary_path(&self, version: Option<&VersionSpecifier>) -> Result<String>;

    async fn install(&self, version: &VersionSpecifier) -> Result<Option<String>>;

    fn uninstall(&self, version: &VersionSpecifier) -> Result<String>;

    fn list_installed(
        &self,
        feed_name: Option<&str>,
        version: Option<&VersionOrLabel>,
    ) -> Result<String>;

    async fn list_available(&self, feed_name: Option<&str>) -> Result<Option<String>>;

    async fn run(&self, version: &VersionSpecifier, args: &[String]) -> Result<Option<String>>;

    fn link(&self, version: Option<&VersionSpecifier>) -> Result<String>;

    fn unlink(&self, version: Option<&VersionSpecifier>) -> Result<String>;

    fn activate(&self, version: Option<&VersionSpecifier>) -> Result<String>;

    fn linked_version(&self) -> Result<VersionSpecifier>;

    fn feed_names(&self) -> Vec<String>;
}
