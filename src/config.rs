//! Configuration surface for the update engine.
//!
//! [`UpdateOptions`] is the single parameter set callers hand to
//! [`crate::update`]. Fields that are not meaningful to the mechanism the
//! engine ends up selecting are simply ignored: a version-control
//! installation never looks at the layout policy, an archive installation
//! never looks at the client binary name.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout applied to pointer probes, archive downloads, and the
/// pull subprocess.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default leaf name of the version marker file, created under the
/// installation directory.
pub const DEFAULT_MARKER_LEAF: &str = ".upkeep-url";

/// How the unpacked archive's top level relates to the application root.
///
/// Release pipelines are inconsistent about whether an archive wraps its
/// contents in a single top-level directory (`app-1.2.3/...`) or ships them
/// flat. This policy controls how the normalizer copes with that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArchiveLayout {
    /// Auto-detect: a single top-level directory entry is treated as the
    /// root; anything else means the archive is flat.
    #[default]
    Auto,
    /// The caller asserts the archive wraps its contents: exactly one
    /// top-level entry is required, and any other count is an error rather
    /// than a guess.
    Wrapped,
    /// The caller asserts the archive is flat: the unpacked directory itself
    /// is the root, no inspection performed.
    Flat,
}

/// Options controlling a single update invocation.
///
/// Only the pointer URL is required. Everything else has a default suited to
/// the common case of an application updating the directory it runs from.
///
/// # Examples
///
/// ```rust,no_run
/// use upkeep::{ArchiveLayout, UpdateOptions};
/// use std::time::Duration;
///
/// let options = UpdateOptions::new("https://example.com/releases/latest")
///     .install_dir("/opt/app")
///     .timeout(Duration::from_secs(120))
///     .layout(ArchiveLayout::Wrapped);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// The stable "latest" pointer URL. Must answer a plain GET with an HTTP
    /// redirect whose `Location` header is the versioned archive URL.
    pub url: String,

    /// The installation directory to update. Defaults to the directory
    /// containing the running executable.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,

    /// Where the version marker file lives. Absolute paths are used as-is;
    /// relative paths are anchored under the installation directory.
    /// Defaults to [`DEFAULT_MARKER_LEAF`] under the installation directory.
    #[serde(default)]
    pub marker_file: Option<PathBuf>,

    /// Timeout for network requests and the pull subprocess.
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Archive layout disambiguation policy.
    #[serde(default)]
    pub layout: ArchiveLayout,

    /// Version-control client binary name used for pull-based updates.
    #[serde(default = "default_vcs_command")]
    pub vcs_command: String,

    /// Re-probe the pointer after download and normalization, and abandon
    /// the attempt if the fingerprint moved in the meantime. Off by default:
    /// the race it closes is between concurrent updaters, which the engine
    /// does not otherwise coordinate.
    #[serde(default)]
    pub recheck_before_install: bool,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_vcs_command() -> String {
    crate::utils::platform::default_vcs_command().to_string()
}

impl UpdateOptions {
    /// Creates options for the given pointer URL with all defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            install_dir: None,
            marker_file: None,
            timeout: DEFAULT_TIMEOUT,
            layout: ArchiveLayout::Auto,
            vcs_command: crate::utils::platform::default_vcs_command().to_string(),
            recheck_before_install: false,
        }
    }

    /// Sets the installation directory to update.
    #[must_use]
    pub fn install_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.install_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the version marker file path.
    #[must_use]
    pub fn marker_file(mut self, path: impl AsRef<Path>) -> Self {
        self.marker_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the request/subprocess timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the archive layout policy.
    #[must_use]
    pub const fn layout(mut self, layout: ArchiveLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the version-control client binary name.
    #[must_use]
    pub fn vcs_command(mut self, command: impl Into<String>) -> Self {
        self.vcs_command = command.into();
        self
    }

    /// Enables or disables the pre-activation freshness re-check.
    #[must_use]
    pub const fn recheck_before_install(mut self, recheck: bool) -> Self {
        self.recheck_before_install = recheck;
        self
    }
}
