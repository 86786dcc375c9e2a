//! Filesystem helpers: directory creation, atomic writes, and tree removal.
//!
//! The atomic write here uses the same temp-and-rename strategy the
//! installer relies on for whole directories: content lands in a sibling
//! `.tmp` file, is synced to disk, and is renamed over the target, so a
//! reader never observes a partially written file.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Ensures a directory exists, creating it and all parents if necessary.
///
/// # Errors
///
/// Fails if the path exists but is not a directory, or if creation fails.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Ensures that the parent directory of a file path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Atomically writes a string to a file using a write-then-rename strategy.
///
/// The content is written to a temporary sibling file, synced to disk, and
/// renamed over the target path. The file either contains the new content or
/// the old content, never a partial write.
///
/// # Errors
///
/// Fails if the temporary file cannot be created, written, synced, or
/// renamed over the target.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    use std::io::Write;

    ensure_parent_dir(path)?;

    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;
        file.sync_all().context("Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Recursively removes a directory tree, with error context.
///
/// # Errors
///
/// Fails if the tree exists and cannot be fully removed.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}
