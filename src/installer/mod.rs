//! The atomic install: activating a prepared candidate tree.
//!
//! Replacing a live, possibly-running application directory cannot be truly
//! atomic across separate filesystem operations. What this module does
//! instead is make the window of inconsistency as narrow and as clearly
//! identifiable as possible: three directory renames, each effectively
//! instantaneous compared to a copy, ordered so that a complete tree is
//! always addressable at either the installation path or the backup path —
//! never neither.
//!
//! 1. rename the live tree aside to the backup path — failure here changes
//!    nothing ([`UpkeepError::BackupFailed`], safe to retry)
//! 2. rename the candidate into the installation path — failure here is the
//!    one genuinely unsafe state: the installation path is missing while
//!    the backup holds the last-good tree
//!    ([`UpkeepError::ActivateFailed`], names both paths for manual
//!    recovery)
//! 3. delete the backup tree — the new installation is already active, so a
//!    failure here is logged and swallowed, never escalated
//!
//! Renames only work within one filesystem, so the caller must stage the
//! candidate on the same filesystem as the installation directory (the
//! engine stages next to it, in the parent directory). Once step 1 begins
//! the sequence runs to completion or clearly-reported failure; there is no
//! mid-flight cancellation.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::UpkeepError;

/// Suffix appended to the installation directory's name to form the backup
/// path.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Returns the backup path for an installation directory: a sibling with
/// [`BACKUP_SUFFIX`] appended to the file name.
#[must_use]
pub fn backup_path(install_dir: &Path) -> PathBuf {
    let mut name = install_dir.file_name().map_or_else(
        || install_dir.as_os_str().to_os_string(),
        std::ffi::OsStr::to_os_string,
    );
    name.push(BACKUP_SUFFIX);
    install_dir.with_file_name(name)
}

/// Activates a fully prepared candidate root at the installation path.
///
/// The candidate must already contain everything the new installation
/// needs, including its version marker file — nothing is written into it
/// here, only renamed.
///
/// # Errors
///
/// - [`UpkeepError::BackupFailed`] — step 1 failed, nothing changed
/// - [`UpkeepError::ActivateFailed`] — step 2 failed after step 1
///   succeeded; the installation path may be absent and the backup must be
///   restored manually
pub fn activate(install_dir: &Path, candidate_root: &Path) -> Result<()> {
    let backup = backup_path(install_dir);

    tracing::debug!(
        target: "installer",
        "Moving current installation {} to {}",
        install_dir.display(),
        backup.display()
    );
    fs::rename(install_dir, &backup).map_err(|e| UpkeepError::BackupFailed {
        path: install_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    tracing::debug!(
        target: "installer",
        "Moving new installation {} into place",
        candidate_root.display()
    );
    fs::rename(candidate_root, install_dir).map_err(|e| UpkeepError::ActivateFailed {
        candidate: candidate_root.to_path_buf(),
        backup: backup.clone(),
        reason: e.to_string(),
    })?;

    // The new tree is live from here on. A stale backup is a cleanup
    // problem, not an update failure.
    if let Err(e) = fs::remove_dir_all(&backup) {
        tracing::warn!(
            target: "installer",
            "New installation is active, but removing the backup {} failed: {}",
            backup.display(),
            e
        );
    }

    Ok(())
}
