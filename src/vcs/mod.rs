//! Pull-based updates for version-controlled installations.
//!
//! When the installation directory carries version-control metadata, the
//! whole update is a single `pull` run by the system client against that
//! directory. The engine performs no atomic-swap dance here: the client's
//! own working-tree semantics govern partial-failure recovery.
//!
//! Success is exit code zero, nothing more. A non-zero exit surfaces as
//! [`UpkeepError::PullFailed`] with the client's stdout and stderr captured
//! verbatim, and a timeout is its own failure
//! ([`UpkeepError::PullTimedOut`]) — never silently treated as success.

pub mod command_builder;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::UpkeepError;
use crate::utils::platform::command_exists;
use command_builder::VcsCommand;

/// Conventionally named metadata subdirectory that marks a
/// version-controlled installation.
pub const VCS_METADATA_DIR: &str = ".git";

/// Configuration for one pull-based update.
///
/// Constructed by the strategy selector; carries only what a pull needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsUpdate {
    /// The installation directory (must be the working tree root)
    pub install_dir: PathBuf,
    /// Client binary name
    pub command: String,
    /// Subprocess timeout
    pub timeout: Duration,
}

impl VcsUpdate {
    /// Runs `<command> pull` against the installation directory.
    ///
    /// # Errors
    ///
    /// - [`UpkeepError::VcsClientNotFound`] if the client binary is missing
    /// - [`UpkeepError::PullFailed`] on non-zero exit
    /// - [`UpkeepError::PullTimedOut`] if the timeout elapses
    pub async fn run(&self) -> Result<()> {
        ensure_vcs_available(&self.command)?;

        tracing::info!(
            target: "vcs",
            "Pulling updates into {}",
            self.install_dir.display()
        );

        VcsCommand::new(&self.command)
            .args(["pull"])
            .current_dir(&self.install_dir)
            .with_timeout(self.timeout)
            .execute()
            .await?;

        Ok(())
    }
}

/// Returns `true` when the directory contains version-control metadata.
///
/// Checks for a `.git` *directory*; a `.git` file (worktree or submodule
/// pointer) does not count, so such installations take the archive path.
#[must_use]
pub fn is_vcs_dir(install_dir: &Path) -> bool {
    install_dir.join(VCS_METADATA_DIR).is_dir()
}

/// Verifies the configured client binary exists in PATH.
///
/// # Errors
///
/// Returns [`UpkeepError::VcsClientNotFound`] when it does not.
pub fn ensure_vcs_available(command: &str) -> Result<()> {
    if command_exists(command) {
        Ok(())
    } else {
        Err(UpkeepError::VcsClientNotFound {
            command: command.to_string(),
        }
        .into())
    }
}
