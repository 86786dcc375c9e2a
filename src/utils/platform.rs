//! Platform-specific defaults and command discovery.

/// Returns `true` when compiled for Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(target_os = "windows")
}

/// Returns the platform-appropriate name of the default version-control
/// client.
///
/// - **Windows**: `git.exe` to explicitly invoke the executable
/// - **Unix-like**: `git`, relying on PATH resolution
///
/// This is the command name, not a full path; the binary must still be
/// reachable through the system PATH.
#[must_use]
pub const fn default_vcs_command() -> &'static str {
    if is_windows() { "git.exe" } else { "git" }
}

/// Checks whether a command is available in the system PATH.
#[must_use]
pub fn command_exists(command: &str) -> bool {
    which::which(command).is_ok()
}
