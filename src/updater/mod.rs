//! Engine entry point: strategy selection and the two update flows.
//!
//! One invocation makes one decision: the installation directory is
//! resolved once, inspected for version-control metadata, and the whole
//! update is delegated to exactly one mechanism — the two never run
//! together.
//!
//! ```text
//! update(options)
//!    ├── resolve installation directory (explicit, or own-program location)
//!    ├── <dir>/.git is a directory?
//!    │     ├── yes → VcsUpdate: `<client> pull` with timeout
//!    │     └── no  → ArchiveUpdate:
//!    │            1. read marker file (absent ⇒ no prior install recorded)
//!    │            2. probe pointer URL, redirects disabled;
//!    │               Location header = fingerprint
//!    │            3. fingerprint == marker ⇒ AlreadyCurrent, nothing fetched
//!    │            4. stream archive into a private staging dir
//!    │               (created next to the installation, same filesystem)
//!    │            5. extract + normalize root per layout policy
//!    │            6. write fingerprint into the *candidate* tree
//!    │            7. (optional) re-probe pointer, abort if it moved
//!    │            8. three-rename atomic swap
//!    └── report UpdateOutcome
//! ```
//!
//! Each strategy is an explicit configuration variant carrying only the
//! parameters that mechanism needs; the selector builds the right one and
//! ignores the rest of the options.
//!
//! The engine offers no protection against two invocations racing on the
//! same installation directory. If concurrent invocation is possible in
//! your deployment, serialize callers externally (a lock file, a
//! single-instance daemon — whatever the embedding application already
//! has).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::archive;
use crate::config::{ArchiveLayout, DEFAULT_MARKER_LEAF, UpdateOptions};
use crate::core::UpkeepError;
use crate::fetcher;
use crate::installer;
use crate::utils::paths::{resolve_file_path, resolve_install_dir};
use crate::vcs::{VcsUpdate, is_vcs_dir};
use crate::version;

/// The mechanism selected for one invocation, with its full parameter set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UpdateStrategy {
    /// The installation is a version-control working tree; update by
    /// pulling.
    Vcs(VcsUpdate),
    /// The installation came from an archive; update by fingerprint
    /// comparison, download, and atomic swap.
    Archive(ArchiveUpdate),
}

/// Configuration for one archive-based update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveUpdate {
    /// The stable "latest" pointer URL
    pub url: String,
    /// The installation directory to replace
    pub install_dir: PathBuf,
    /// Resolved path of the version marker file
    pub marker_file: PathBuf,
    /// Timeout for the pointer probe and the download
    pub timeout: Duration,
    /// Archive layout disambiguation policy
    pub layout: ArchiveLayout,
    /// Re-probe the pointer before activation
    pub recheck_before_install: bool,
}

/// What an update invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The version-control mechanism ran a successful pull.
    Pulled,
    /// The pointer's fingerprint matched the marker; nothing was fetched.
    AlreadyCurrent,
    /// A new archive build was downloaded and activated.
    Installed {
        /// The fingerprint now recorded in the marker file
        fingerprint: String,
    },
}

/// Result of a probe-only [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCheck {
    /// The installation is a version-control working tree; freshness is the
    /// pull tool's business, not the engine's.
    VcsManaged,
    /// The pointer's fingerprint matches the persisted marker.
    UpToDate,
    /// A build other than the installed one is available.
    UpdateAvailable {
        /// The fingerprint the pointer currently resolves to
        fingerprint: String,
    },
}

/// Selects the update mechanism for the given options.
///
/// Resolves the installation directory once and probes it for
/// version-control metadata; builds the matching strategy variant with
/// exactly the parameters that mechanism needs.
///
/// # Errors
///
/// Returns [`UpkeepError::NoInstallDir`] when no directory is given and the
/// own-program default cannot be derived.
pub fn select_strategy(options: &UpdateOptions) -> Result<UpdateStrategy> {
    let install_dir = resolve_install_dir(options.install_dir.as_deref())?;

    let strategy = if is_vcs_dir(&install_dir) {
        tracing::debug!(
            target: "updater",
            "{} has version-control metadata, updating via pull",
            install_dir.display()
        );
        UpdateStrategy::Vcs(VcsUpdate {
            install_dir,
            command: options.vcs_command.clone(),
            timeout: options.timeout,
        })
    } else {
        let marker_file =
            resolve_file_path(&install_dir, options.marker_file.as_deref(), DEFAULT_MARKER_LEAF);
        UpdateStrategy::Archive(ArchiveUpdate {
            url: options.url.clone(),
            install_dir,
            marker_file,
            timeout: options.timeout,
            layout: options.layout,
            recheck_before_install: options.recheck_before_install,
        })
    };

    Ok(strategy)
}

/// Runs one update with the given options.
///
/// # Errors
///
/// Any [`UpkeepError`] from the selected mechanism; see the crate-level
/// documentation for the taxonomy.
pub async fn update(options: &UpdateOptions) -> Result<UpdateOutcome> {
    match select_strategy(options)? {
        UpdateStrategy::Vcs(vcs) => {
            vcs.run().await?;
            Ok(UpdateOutcome::Pulled)
        }
        UpdateStrategy::Archive(archive) => archive.run().await,
    }
}

/// Reports whether an update is available, without mutating anything.
///
/// For archive installations this costs exactly one pointer probe — no
/// download. For version-control installations the engine has no cheap
/// remote probe and reports [`UpdateCheck::VcsManaged`].
///
/// # Errors
///
/// Returns [`UpkeepError::ResolutionFailed`] when the pointer probe fails.
pub async fn check(options: &UpdateOptions) -> Result<UpdateCheck> {
    match select_strategy(options)? {
        UpdateStrategy::Vcs(_) => Ok(UpdateCheck::VcsManaged),
        UpdateStrategy::Archive(archive) => {
            let current = version::read_marker(&archive.marker_file)?;
            let latest = version::resolve_latest(&archive.url, archive.timeout).await?;

            if current.as_deref() == Some(latest.as_str()) {
                Ok(UpdateCheck::UpToDate)
            } else {
                Ok(UpdateCheck::UpdateAvailable {
                    fingerprint: latest,
                })
            }
        }
    }
}

impl ArchiveUpdate {
    /// Runs the archive flow: probe, compare, fetch, normalize, swap.
    ///
    /// # Errors
    ///
    /// `ResolutionFailed`, `DownloadFailed`, `ExtractFailed`,
    /// `ArchiveRootMismatch`, `FingerprintMoved`, `BackupFailed`, or
    /// `ActivateFailed` depending on the stage that fails.
    pub async fn run(&self) -> Result<UpdateOutcome> {
        let current = version::read_marker(&self.marker_file)?;
        let latest = version::resolve_latest(&self.url, self.timeout).await?;

        if current.as_deref() == Some(latest.as_str()) {
            tracing::debug!(
                target: "updater",
                "Latest available version is at {} which is already installed",
                latest
            );
            return Ok(UpdateOutcome::AlreadyCurrent);
        }

        // Private staging area for this attempt; removed on drop whatever
        // happens. Staged next to the installation directory so the final
        // renames stay on one filesystem.
        let staging = staging_dir(&self.install_dir)?;

        let archive_path = staging.path().join("download");
        fetcher::download(&latest, &archive_path, self.timeout).await?;

        let unpack_dir = staging.path().join("unpack");
        archive::extract(&archive_path, &unpack_dir)?;
        let candidate = archive::normalize_root(&unpack_dir, self.layout)?;

        // The new tree carries its own marker before it ever goes live; the
        // live tree's marker is never touched in place.
        let marker_leaf = self
            .marker_file
            .file_name()
            .map_or_else(|| DEFAULT_MARKER_LEAF.into(), std::ffi::OsStr::to_os_string);
        version::write_marker(&candidate.join(marker_leaf), &latest)?;

        if self.recheck_before_install {
            let now = version::resolve_latest(&self.url, self.timeout).await?;
            if now != latest {
                return Err(UpkeepError::FingerprintMoved {
                    expected: latest,
                    found: now,
                }
                .into());
            }
        }

        installer::activate(&self.install_dir, &candidate)?;

        tracing::info!(
            target: "updater",
            "Installed {} at {}",
            latest,
            self.install_dir.display()
        );

        Ok(UpdateOutcome::Installed {
            fingerprint: latest,
        })
    }
}

/// Creates the per-attempt staging directory.
///
/// Placed in the installation directory's parent so the swap's renames
/// never cross a filesystem boundary; falls back to the system temp
/// directory when there is no usable parent.
fn staging_dir(install_dir: &Path) -> Result<tempfile::TempDir> {
    let parent = install_dir
        .parent()
        .filter(|p| p.is_dir())
        .map_or_else(std::env::temp_dir, Path::to_path_buf);

    tempfile::Builder::new()
        .prefix(".upkeep-stage-")
        .tempdir_in(&parent)
        .with_context(|| format!("Failed to create staging directory in {}", parent.display()))
}
