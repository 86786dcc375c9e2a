//! Resolution of the installation directory and paths anchored under it.
//!
//! The engine needs exactly one caller-independent default when no
//! installation directory is supplied: the directory containing the running
//! executable. That auto-discovery is a convenience layer — embedders
//! running in environments where "own program location" is not meaningful
//! (containers that exec a shim, test harnesses, etc.) should pass the
//! directory explicitly and never hit this fallback.
//!
//! Relative paths are deliberately resolved against the executable-derived
//! base, not the process working directory: a self-updating application has
//! no control over where it was launched from.

use crate::core::UpkeepError;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Returns the default installation directory: the directory containing the
/// running executable.
///
/// # Errors
///
/// Returns [`UpkeepError::NoInstallDir`] if the executable's own location
/// cannot be determined or has no parent directory.
pub fn default_install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| UpkeepError::NoInstallDir {
        reason: format!("cannot locate the running executable: {e}"),
    })?;

    // Resolve symlinks so an installation reached through e.g. a PATH
    // symlink still points at the real tree being updated.
    let exe = exe.canonicalize().map_err(|e| UpkeepError::NoInstallDir {
        reason: format!("cannot canonicalize executable path {}: {e}", exe.display()),
    })?;

    let dir = exe.parent().ok_or_else(|| UpkeepError::NoInstallDir {
        reason: format!("executable path {} has no parent directory", exe.display()),
    })?;

    Ok(dir.to_path_buf())
}

/// Resolves the installation directory from an optional caller-supplied
/// path.
///
/// - `None` resolves to [`default_install_dir`]
/// - a relative path is anchored under the default base, not the process
///   working directory
/// - an absolute path passes through unchanged
///
/// # Errors
///
/// Returns [`UpkeepError::NoInstallDir`] when the default base is needed but
/// cannot be determined.
pub fn resolve_install_dir(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        None => default_install_dir(),
        Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
        Some(path) => Ok(default_install_dir()?.join(path)),
    }
}

/// Resolves an auxiliary file path relative to the installation directory.
///
/// Absolute paths pass through; relative paths are anchored under
/// `install_dir`; `None` resolves to `default_leaf` under `install_dir`.
#[must_use]
pub fn resolve_file_path(install_dir: &Path, file: Option<&Path>, default_leaf: &str) -> PathBuf {
    match file {
        None => install_dir.join(default_leaf),
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => install_dir.join(path),
    }
}
