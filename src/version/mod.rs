//! Version fingerprinting: the redirect probe and the marker file.
//!
//! The engine never parses version numbers. The caller supplies a stable
//! "latest" pointer URL which, by contract, answers with an HTTP redirect
//! whose `Location` header is the canonical versioned archive URL. That
//! resolved URL *is* the version fingerprint: if it equals the string
//! persisted in the marker file, the installation is current and no
//! download happens. Exact string equality — no semantic comparison is
//! performed or assumed.
//!
//! The marker file is a single-line UTF-8 file inside the installation
//! directory, trimmed on read. It is only ever written into a *candidate*
//! tree before activation, never into the live tree in place, so a crashed
//! update can never leave a half-true marker behind.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::core::UpkeepError;
use crate::utils::fs::safe_write;

/// Resolves the pointer URL to the current version fingerprint.
///
/// Issues a GET with redirect-following disabled and reads the `Location`
/// header of the redirect response.
///
/// # Errors
///
/// Returns [`UpkeepError::ResolutionFailed`] when the request fails, the
/// response is not a redirect (including 200s that unexpectedly serve a
/// body — the protocol requires a redirect by design), or the `Location`
/// header is missing or unreadable.
pub async fn resolve_latest(url: &str, timeout: Duration) -> Result<String> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client.get(url).send().await.map_err(|e| UpkeepError::ResolutionFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_redirection() {
        return Err(UpkeepError::ResolutionFailed {
            url: url.to_string(),
            reason: format!("expected a redirect, got {status}"),
        }
        .into());
    }

    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| UpkeepError::ResolutionFailed {
            url: url.to_string(),
            reason: "redirect response carries no usable Location header".to_string(),
        })?;

    tracing::debug!(target: "version", "{} resolves to {}", url, location);

    Ok(location.to_string())
}

/// Reads the persisted fingerprint from the marker file.
///
/// Returns `None` when the file does not exist — no prior archive install
/// recorded. Content is trimmed of surrounding whitespace.
///
/// # Errors
///
/// Fails only if the file exists but cannot be read as UTF-8.
pub fn read_marker(path: &Path) -> Result<Option<String>> {
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read version marker: {}", path.display()))?;

    Ok(Some(content.trim().to_string()))
}

/// Writes the fingerprint to the marker file atomically.
///
/// # Errors
///
/// Fails if the atomic write cannot complete.
pub fn write_marker(path: &Path, fingerprint: &str) -> Result<()> {
    safe_write(path, fingerprint)
}
