//! Builder for invoking the version-control client as a subprocess.
//!
//! The engine shells out to the system client (like Cargo's
//! `git-fetch-with-cli`) instead of embedding a VCS library: the system
//! binary already knows about the user's authentication helpers, SSH agents,
//! and proxy configuration, and its working-tree semantics govern
//! partial-failure recovery — this engine treats them as opaque.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::core::UpkeepError;

/// Builder for constructing and executing version-control commands with
/// captured output and a bounded timeout.
///
/// # Examples
///
/// ```rust,no_run
/// use upkeep::vcs::command_builder::VcsCommand;
/// use std::time::Duration;
///
/// # async fn example() -> anyhow::Result<()> {
/// let output = VcsCommand::new("git")
///     .args(["pull"])
///     .current_dir("/opt/app")
///     .with_timeout(Duration::from_secs(60))
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
pub struct VcsCommand {
    /// Client binary name (e.g. "git")
    program: String,

    /// Arguments passed to the client
    args: Vec<String>,

    /// Working directory for the subprocess
    current_dir: Option<PathBuf>,

    /// Maximum duration to wait for completion (None = no timeout)
    timeout_duration: Option<Duration>,
}

impl VcsCommand {
    /// Creates a new command builder for the given client binary.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout_duration: None,
        }
    }

    /// Adds multiple arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory for the subprocess.
    ///
    /// The client is run *in* this directory rather than being pointed at it
    /// with client-specific flags, so the builder stays agnostic of which
    /// client binary is configured.
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets the maximum duration to wait for the subprocess.
    #[must_use]
    pub const fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout_duration = Some(duration);
        self
    }

    /// Executes the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`UpkeepError::PullTimedOut`] if the subprocess outlives the
    ///   configured timeout (the child is killed on drop)
    /// - [`UpkeepError::PullFailed`] on a non-zero exit status, carrying the
    ///   captured output verbatim
    /// - spawn failures (e.g. binary missing) with context
    pub async fn execute(self) -> Result<VcsOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        tracing::debug!(
            target: "vcs",
            "Executing command: {} {} (cwd: {})",
            self.program,
            self.args.join(" "),
            self.current_dir.as_deref().unwrap_or_else(|| Path::new(".")).display()
        );

        let output_future = cmd.output();

        let output = if let Some(duration) = self.timeout_duration {
            match timeout(duration, output_future).await {
                Ok(result) => result
                    .with_context(|| format!("Failed to execute {}", self.program))?,
                Err(_) => {
                    tracing::warn!(
                        target: "vcs",
                        "Command timed out after {} seconds: {} {}",
                        duration.as_secs(),
                        self.program,
                        self.args.join(" ")
                    );
                    return Err(UpkeepError::PullTimedOut {
                        secs: duration.as_secs(),
                    }
                    .into());
                }
            }
        } else {
            output_future.await.with_context(|| format!("Failed to execute {}", self.program))?
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!(
                target: "vcs",
                "Command failed with exit code: {:?}",
                output.status.code()
            );
            if !stderr.is_empty() {
                tracing::debug!(target: "vcs", "Error: {}", stderr.trim());
            }

            return Err(UpkeepError::PullFailed { stdout, stderr }.into());
        }

        if !stdout.is_empty() {
            tracing::debug!(target: "vcs", "{}", stdout.trim());
        }

        Ok(VcsOutput { stdout, stderr })
    }
}

/// Captured output from a version-control command.
#[derive(Debug)]
pub struct VcsOutput {
    /// Standard output of the subprocess
    pub stdout: String,
    /// Standard error of the subprocess
    pub stderr: String,
}
