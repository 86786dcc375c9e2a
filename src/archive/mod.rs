//! Archive extraction and root normalization.
//!
//! Two jobs: turn the downloaded file into a tree on disk, and decide which
//! path inside that tree is the true application root.
//!
//! The container format is sniffed from the file's leading bytes — the
//! staged download has no meaningful name, and the versioned URL is an
//! opaque fingerprint the engine refuses to interpret. Supported formats:
//! zip, and plain or gzip/bzip2/xz-compressed tar.
//!
//! Normalization exists because release pipelines disagree about layout:
//! some archives wrap everything in a single top-level directory
//! (`app-1.2.3/...`), others ship the tree flat. [`normalize_root`] applies
//! the caller's [`ArchiveLayout`] policy to disambiguate.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::config::ArchiveLayout;
use crate::core::UpkeepError;
use crate::utils::fs::ensure_dir;

/// Container formats recognized by the sniffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveFormat {
    Zip,
    TarGz,
    TarBz2,
    TarXz,
    Tar,
}

/// Offset of the `ustar` magic in a tar header block.
const TAR_MAGIC_OFFSET: usize = 257;

fn sniff_format(path: &Path) -> Result<ArchiveFormat> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open downloaded file: {}", path.display()))?;

    let mut header = [0u8; TAR_MAGIC_OFFSET + 8];
    let read = file.read(&mut header).with_context(|| {
        format!("Failed to read downloaded file header: {}", path.display())
    })?;
    let header = &header[..read];

    let format = if header.starts_with(b"PK\x03\x04") || header.starts_with(b"PK\x05\x06") {
        ArchiveFormat::Zip
    } else if header.starts_with(&[0x1f, 0x8b]) {
        ArchiveFormat::TarGz
    } else if header.starts_with(b"BZh") {
        ArchiveFormat::TarBz2
    } else if header.starts_with(&[0xfd, b'7', b'z', b'X', b'Z', 0x00]) {
        ArchiveFormat::TarXz
    } else if header.len() >= TAR_MAGIC_OFFSET + 5
        && &header[TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + 5] == b"ustar"
    {
        ArchiveFormat::Tar
    } else {
        return Err(UpkeepError::ExtractFailed {
            reason: "unrecognized archive format".to_string(),
        }
        .into());
    };

    Ok(format)
}

/// Unpacks the downloaded archive into `dest`.
///
/// # Errors
///
/// Returns [`UpkeepError::ExtractFailed`] for unrecognized or corrupt input
/// and for zip entries whose paths would escape the destination.
pub fn extract(archive_path: &Path, dest: &Path) -> Result<()> {
    let format = sniff_format(archive_path)?;
    ensure_dir(dest)?;

    tracing::debug!(
        target: "archive",
        "Extracting {} as {:?} into {}",
        archive_path.display(),
        format,
        dest.display()
    );

    match format {
        ArchiveFormat::Zip => extract_zip(archive_path, dest),
        ArchiveFormat::TarGz | ArchiveFormat::TarBz2 | ArchiveFormat::TarXz | ArchiveFormat::Tar => {
            extract_tar(archive_path, dest, format)
        }
    }
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| UpkeepError::ExtractFailed {
        reason: format!("not a readable zip archive: {e}"),
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| UpkeepError::ExtractFailed {
            reason: format!("failed to read zip entry {i}: {e}"),
        })?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(UpkeepError::ExtractFailed {
                reason: format!("zip entry '{}' escapes the extraction root", entry.name()),
            }
            .into());
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            ensure_dir(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                ensure_dir(parent)?;
            }
            let mut outfile = File::create(&outpath)
                .with_context(|| format!("Failed to create file: {}", outpath.display()))?;
            std::io::copy(&mut entry, &mut outfile).map_err(|e| UpkeepError::ExtractFailed {
                reason: format!("failed to extract '{}': {e}", entry.name()),
            })?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                let _ = std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode));
            }
        }
    }

    Ok(())
}

fn extract_tar(archive_path: &Path, dest: &Path, format: ArchiveFormat) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let decoder: Box<dyn Read> = match format {
        ArchiveFormat::TarGz => Box::new(flate2::read::GzDecoder::new(file)),
        ArchiveFormat::TarBz2 => Box::new(bzip2::read::BzDecoder::new(file)),
        ArchiveFormat::TarXz => Box::new(xz2::read::XzDecoder::new(file)),
        _ => Box::new(file),
    };

    let mut archive = tar::Archive::new(decoder);
    archive.unpack(dest).map_err(|e| UpkeepError::ExtractFailed {
        reason: format!("failed to unpack tar archive: {e}"),
    })?;

    Ok(())
}

/// Determines which path inside the unpacked tree is the application root.
///
/// - [`ArchiveLayout::Auto`]: if the top level contains exactly one entry
///   and it is a directory, that entry is the root (archive built with a
///   wrapping directory); otherwise the unpacked tree itself is the root.
/// - [`ArchiveLayout::Wrapped`]: exactly one top-level entry is required —
///   the caller asserted the archive format is known, so any other count is
///   an error rather than a guess. The single entry is the root whether or
///   not it is a directory.
/// - [`ArchiveLayout::Flat`]: the unpacked tree itself, no inspection.
///
/// # Errors
///
/// Returns [`UpkeepError::ArchiveRootMismatch`] naming the actual top-level
/// entry count when the `Wrapped` policy is violated.
pub fn normalize_root(unpacked: &Path, layout: ArchiveLayout) -> Result<PathBuf> {
    if layout == ArchiveLayout::Flat {
        return Ok(unpacked.to_path_buf());
    }

    let entries: Vec<PathBuf> = std::fs::read_dir(unpacked)
        .with_context(|| format!("Failed to list unpacked tree: {}", unpacked.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()
        .context("Failed to read unpacked tree entry")?;

    match layout {
        ArchiveLayout::Auto => {
            if let [only] = entries.as_slice() {
                if only.is_dir() {
                    return Ok(only.clone());
                }
            }
            Ok(unpacked.to_path_buf())
        }
        ArchiveLayout::Wrapped => {
            if let [only] = entries.as_slice() {
                Ok(only.clone())
            } else {
                Err(UpkeepError::ArchiveRootMismatch {
                    found: entries.len(),
                }
                .into())
            }
        }
        ArchiveLayout::Flat => unreachable!("handled above"),
    }
}
