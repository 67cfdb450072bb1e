//! Streaming release download with progress reporting.
//!
//! Fetches a release asset over HTTPS in bounded chunks, writing to disk as
//! bytes arrive and reporting cumulative progress against the advertised
//! Content-Length. Optionally verifies a SHA-256 checksum; a mismatched
//! file is deleted rather than left behind.

use anyhow::{Context, Result};
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

// ============================================================================
// URL Validation
// ============================================================================

/// Hosts release downloads may come from.
const ALLOWED_DOMAINS: &[&str] = &["github.com"];

/// Requires HTTPS and an allowlisted host before any bytes move.
fn validate_url(url_str: &str) -> Result<()> {
    let url = Url::parse(url_str).with_context(|| format!("Invalid URL: {}", url_str))?;

    if url.scheme() != "https" {
        anyhow::bail!("URL must use HTTPS: {}", url_str);
    }

    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("URL must have a host: {}", url_str))?;

    let is_allowed = ALLOWED_DOMAINS
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)));

    if !is_allowed {
        anyhow::bail!(
            "Download domain not allowed: {}. Allowed: {:?}",
            host,
            ALLOWED_DOMAINS
        );
    }

    Ok(())
}

// ============================================================================
// Progress
// ============================================================================

/// Cumulative progress for an in-flight fetch.
#[derive(Debug, Clone)]
pub struct FetchProgress {
    /// Bytes written so far.
    pub bytes_fetched: u64,
    /// Total bytes from the Content-Length header, when the server sent one.
    pub total_bytes: Option<u64>,
    /// 0.0 to 100.0, or `None` when the total is unknown.
    pub percent: Option<f32>,
}

impl FetchProgress {
    fn new(bytes_fetched: u64, total_bytes: Option<u64>) -> Self {
        let percent = total_bytes.map(|total| {
            if total > 0 {
                (bytes_fetched as f32 / total as f32) * 100.0
            } else {
                0.0
            }
        });

        Self {
            bytes_fetched,
            total_bytes,
            percent,
        }
    }
}

// ============================================================================
// Download
// ============================================================================

/// Streams `url` into `dest`, invoking `progress_cb` as chunks land.
///
/// Returns the number of bytes written. The callback sees a monotonically
/// non-decreasing byte count that reaches the total exactly when the stream
/// ends. On a checksum mismatch the file is removed and an error returned;
/// other failures leave cleanup to the caller, which knows whether a
/// partial file should survive.
pub async fn download_file<F>(
    url: &str,
    dest: &Path,
    expected_sha256: Option<&str>,
    progress_cb: F,
) -> Result<u64>
where
    F: Fn(FetchProgress),
{
    info!("Downloading {} to {}", url, dest.display());

    validate_url(url)?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to start download from {}", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!(
            "Download failed with status {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        );
    }

    let total_bytes = response.content_length();
    debug!("Content-Length: {:?}", total_bytes);

    let mut file = File::create(dest)
        .await
        .with_context(|| format!("Failed to create file: {}", dest.display()))?;

    let mut stream = response.bytes_stream();
    let mut bytes_fetched: u64 = 0;
    let mut hasher = Sha256::new();

    progress_cb(FetchProgress::new(0, total_bytes));

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.context("Failed to read chunk from response stream")?;

        hasher.update(&chunk);
        file.write_all(&chunk)
            .await
            .context("Failed to write chunk to file")?;

        bytes_fetched += chunk.len() as u64;
        progress_cb(FetchProgress::new(bytes_fetched, total_bytes));
    }

    file.flush().await.context("Failed to flush file")?;

    if let Some(expected) = expected_sha256 {
        let actual_hex = to_hex(&hasher.finalize());
        if actual_hex != expected.to_lowercase() {
            let _ = tokio::fs::remove_file(dest).await;
            anyhow::bail!(
                "SHA256 checksum mismatch!\nExpected: {}\nActual: {}",
                expected,
                actual_hex
            );
        }
        debug!("SHA256 verified: {}", actual_hex);
    }

    info!(
        "Download complete: {} bytes written to {}",
        bytes_fetched,
        dest.display()
    );

    Ok(bytes_fetched)
}

fn to_hex(hash: &[u8]) -> String {
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_percent_tracks_total() {
        let progress = FetchProgress::new(50, Some(100));
        assert_eq!(progress.bytes_fetched, 50);
        assert_eq!(progress.percent, Some(50.0));

        assert_eq!(FetchProgress::new(50, None).percent, None);
        assert_eq!(FetchProgress::new(0, Some(0)).percent, Some(0.0));
        assert_eq!(FetchProgress::new(100, Some(100)).percent, Some(100.0));
    }

    #[test]
    fn simulated_stream_reaches_exactly_one_hundred() {
        // Chunked accounting the way download_file does it.
        let total = 8192u64 * 3;
        let mut fetched = 0u64;
        let mut last_percent = 0.0f32;

        for _ in 0..3 {
            fetched += 8192;
            let progress = FetchProgress::new(fetched, Some(total));
            let percent = progress.percent.unwrap();
            assert!(percent >= last_percent, "progress must not decrease");
            last_percent = percent;
        }
        assert_eq!(last_percent, 100.0);
    }

    #[test]
    fn https_is_required() {
        assert!(validate_url("http://github.com/file.bin").is_err());
        assert!(validate_url("https://github.com/file.bin").is_ok());
    }

    #[test]
    fn only_release_host_domains_allowed() {
        assert!(validate_url(
            "https://github.com/mikf/gallery-dl/releases/download/v1.29.7/gallery-dl.bin"
        )
        .is_ok());
        assert!(validate_url("https://objects.github.com/asset").is_ok());

        assert!(validate_url("https://example.com/gallery-dl.bin").is_err());
        assert!(validate_url("https://github.com.evil.org/fake.bin").is_err());
    }

    #[test]
    fn hex_formatting() {
        assert_eq!(to_hex(&[0x00, 0xab, 0xff]), "00abff");
    }
}
