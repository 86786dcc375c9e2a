//! Streaming download of the versioned archive.
//!
//! Archives may be large, so the body is streamed to disk in bounded chunks
//! rather than buffered in memory. The destination always lives under the
//! attempt's private staging directory; nothing is ever visible at an
//! externally-observable path.

use anyhow::{Context, Result};
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::core::UpkeepError;

/// Downloads `url` to `dest`, streaming chunk by chunk.
///
/// Redirects are followed here (the versioned URL is whatever the pointer
/// resolved to; hosting platforms routinely bounce it once more to a CDN).
/// The timeout bounds connection establishment and each read, not the whole
/// transfer — a slow large archive is fine, a stalled one is not.
///
/// # Errors
///
/// Returns [`UpkeepError::DownloadFailed`] on a non-success HTTP status or a
/// transport failure mid-stream.
pub async fn download(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    let client = reqwest::Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client.get(url).send().await.map_err(|e| UpkeepError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpkeepError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {status}"),
        }
        .into());
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("Failed to create download file: {}", dest.display()))?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| UpkeepError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        downloaded += chunk.len() as u64;
        file.write_all(&chunk)
            .await
            .with_context(|| format!("Failed to write download file: {}", dest.display()))?;
    }

    file.flush().await.context("Failed to flush download file")?;

    tracing::debug!(target: "fetcher", "Downloaded {} bytes from {}", downloaded, url);

    Ok(())
}
