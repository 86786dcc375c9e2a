//! Error types for the update engine.
//!
//! Every failure the engine can produce is a variant of [`UpkeepError`].
//! Errors are surfaced synchronously to the caller of the in-progress
//! operation and are never retried internally — retry policy, if any,
//! belongs to the embedding application, which knows whether a timeout or a
//! flaky remote is worth another attempt.
//!
//! Functions throughout the crate return [`anyhow::Result`], so typed
//! variants stay recoverable via [`anyhow::Error::downcast_ref`] for callers
//! that dispatch on failure class:
//!
//! ```rust,no_run
//! use upkeep::core::UpkeepError;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = upkeep::UpdateOptions::new("https://example.com/latest");
//! if let Err(err) = upkeep::update(&options).await {
//!     match err.downcast_ref::<UpkeepError>() {
//!         Some(UpkeepError::ActivateFailed { backup, .. }) => {
//!             eprintln!("installation missing; restore manually from {}", backup.display());
//!         }
//!         _ => eprintln!("update failed: {err:#}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the update engine.
///
/// The two installer variants deserve special attention:
/// [`BackupFailed`](Self::BackupFailed) means nothing was changed and the
/// operation is safe to retry, while [`ActivateFailed`](Self::ActivateFailed)
/// is the one state in which the installation path may be left absent and an
/// operator must restore the named backup by hand. They are deliberately
/// separate variants so callers can tell recoverable from
/// needs-manual-intervention failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UpkeepError {
    /// No installation directory was supplied and none could be derived
    /// from the running executable's own location.
    ///
    /// There is no other default to fall back to; embedders running in an
    /// environment where "own program location" is not meaningful must pass
    /// the installation directory explicitly.
    #[error("no installation directory given and none could be derived: {reason}")]
    NoInstallDir {
        /// Why the executable-relative default could not be determined
        reason: String,
    },

    /// The configured version-control client binary was not found in PATH.
    #[error("version-control client '{command}' is not installed or not found in PATH")]
    VcsClientNotFound {
        /// The client binary name that could not be located
        command: String,
    },

    /// The pull subprocess exited with a non-zero status.
    ///
    /// Carries the captured standard output and standard error verbatim for
    /// diagnostics; the engine makes no attempt to interpret them.
    #[error("pull failed\nstdout: {stdout}\nstderr: {stderr}")]
    PullFailed {
        /// Captured standard output of the pull subprocess
        stdout: String,
        /// Captured standard error of the pull subprocess
        stderr: String,
    },

    /// The pull subprocess did not finish within the configured timeout.
    ///
    /// Distinct from [`PullFailed`](Self::PullFailed): no exit status exists,
    /// and the working tree is in whatever state the client left it.
    #[error("pull timed out after {secs} seconds")]
    PullTimedOut {
        /// The configured timeout, in seconds
        secs: u64,
    },

    /// The "latest" pointer URL could not be resolved to a fingerprint.
    ///
    /// Raised when the pointer request fails outright, answers with a
    /// non-redirect status (the protocol requires a redirect — the
    /// `Location` header is the fingerprint), or redirects without a usable
    /// `Location` header.
    #[error("failed to resolve latest version from {url}: {reason}")]
    ResolutionFailed {
        /// The pointer URL that was probed
        url: String,
        /// What went wrong with the probe
        reason: String,
    },

    /// The archive download aborted.
    #[error("failed to download {url}: {reason}")]
    DownloadFailed {
        /// The versioned archive URL
        url: String,
        /// Non-success HTTP status or transport failure description
        reason: String,
    },

    /// The downloaded file could not be unpacked.
    #[error("failed to extract downloaded archive: {reason}")]
    ExtractFailed {
        /// Unrecognized format, corrupt data, or an unsafe entry path
        reason: String,
    },

    /// The forced-wrapping layout policy was violated.
    ///
    /// The caller asserted the archive wraps its contents in a single
    /// top-level entry; ambiguity is an error rather than a guess.
    #[error("archive top level contains {found} entries; expected exactly 1")]
    ArchiveRootMismatch {
        /// The number of top-level entries actually present
        found: usize,
    },

    /// Step 1 of the install swap failed: the live installation directory
    /// could not be renamed aside. Nothing was changed — safe to report and
    /// retry.
    #[error("failed to move current installation {path} aside: {reason}")]
    BackupFailed {
        /// The installation directory that could not be renamed
        path: PathBuf,
        /// The underlying rename failure
        reason: String,
    },

    /// Step 2 of the install swap failed: the candidate tree could not be
    /// moved into place *after* the live tree was renamed aside.
    ///
    /// The installation path may now be absent; the backup path holds the
    /// last-good tree and must be restored manually.
    #[error(
        "failed to activate {candidate}: installation path is missing, last-good tree preserved at {backup}: {reason}"
    )]
    ActivateFailed {
        /// The candidate root that failed to move into place
        candidate: PathBuf,
        /// The backup directory holding the previous installation
        backup: PathBuf,
        /// The underlying rename failure
        reason: String,
    },

    /// The pre-activation freshness re-check found that the pointer moved
    /// while the archive was being fetched and unpacked.
    #[error("latest version moved during update: expected {expected}, found {found}")]
    FingerprintMoved {
        /// The fingerprint this attempt downloaded
        expected: String,
        /// The fingerprint the pointer resolves to now
        found: String,
    },
}
