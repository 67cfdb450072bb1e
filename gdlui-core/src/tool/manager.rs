//! Coordinates resolution, fetching, and installation of gallery-dl.
//!
//! State machine: unresolved → probe → resolved | not-found. On not-found
//! the front-end may trigger [`ToolManager::fetch`], which downloads the
//! platform asset, finishes the install (chmod or pip), and moves the state
//! to resolved. Any failure reverts to not-found with the partial file
//! removed; recovery is a manual re-trigger, never an automatic retry.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{info, warn};

use super::downloader::{download_file, FetchProgress};
use super::paths;
use super::release::{self, ReleaseAsset};
use super::resolver;
use super::types::{ArtifactKind, Platform, Resolution, ResolvedTool, ToolSource};

/// Timeout for the post-install `--version` probe.
const VERIFY_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Tool Manager
// ============================================================================

/// Owns the gallery-dl resolution state for the lifetime of the app.
///
/// Created once at startup; written again only after a successful fetch.
pub struct ToolManager {
    install_dir: PathBuf,
    platform: Option<Platform>,
    resolution: Resolution,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolManager {
    /// Probes for an existing executable and records the outcome.
    pub fn new() -> Self {
        let install_dir = paths::install_dir();
        let platform = Platform::detect();
        let resolution = resolver::resolve();

        info!(
            install_dir = %install_dir.display(),
            ?platform,
            resolved = resolution.is_resolved(),
            "ToolManager initialized"
        );

        Self {
            install_dir,
            platform,
            resolution,
        }
    }

    /// Manager rooted at a custom install directory (used by tests).
    pub fn with_install_dir(install_dir: PathBuf, platform: Option<Platform>) -> Self {
        let resolution = resolver::probe(&install_dir, resolver::CANDIDATE_NAMES);
        Self {
            install_dir,
            platform,
            resolution,
        }
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// The command to invoke, when resolved.
    pub fn command(&self) -> Option<&str> {
        self.resolution.command()
    }

    pub fn platform(&self) -> Option<Platform> {
        self.platform
    }

    /// The release asset a fetch would download on this platform.
    pub fn planned_asset(&self) -> ReleaseAsset {
        release::asset_for(self.platform)
    }

    // ========================================================================
    // Fetch & Install
    // ========================================================================

    /// Downloads and installs the release asset for this platform.
    ///
    /// Direct binaries are saved into the install directory and, on
    /// unix-likes, marked executable. The wheel fallback is handed to
    /// `pip install` and deleted afterwards. On success the manager is
    /// resolved; on any failure the partial file is removed and the state
    /// stays not-found.
    pub async fn fetch<F>(&mut self, progress_cb: F) -> Result<ResolvedTool>
    where
        F: Fn(FetchProgress) + Send + Sync,
    {
        let asset = release::asset_for(self.platform);
        self.fetch_asset(asset, progress_cb).await
    }

    async fn fetch_asset<F>(&mut self, asset: ReleaseAsset, progress_cb: F) -> Result<ResolvedTool>
    where
        F: Fn(FetchProgress) + Send + Sync,
    {
        paths::ensure_dir(&self.install_dir)?;
        let dest = self.install_dir.join(asset.local_name);

        let result = self.fetch_into(&asset, &dest, progress_cb).await;
        match result {
            Ok(tool) => {
                self.resolution = Resolution::Resolved(tool.clone());
                Ok(tool)
            }
            Err(e) => {
                // A half-written artifact must not be picked up by the next
                // resolution probe.
                if dest.exists() {
                    if let Err(cleanup) = std::fs::remove_file(&dest) {
                        warn!(path = %dest.display(), error = %cleanup, "Failed to remove partial file");
                    }
                }
                self.resolution = Resolution::NotFound;
                Err(e)
            }
        }
    }

    async fn fetch_into<F>(
        &self,
        asset: &ReleaseAsset,
        dest: &Path,
        progress_cb: F,
    ) -> Result<ResolvedTool>
    where
        F: Fn(FetchProgress) + Send + Sync,
    {
        download_file(&asset.url, dest, asset.sha256, progress_cb).await?;

        match asset.kind {
            ArtifactKind::Binary => {
                if self.platform.map(|p| p.is_unix()).unwrap_or(cfg!(unix)) {
                    make_executable(dest)?;
                }
                info!(path = %dest.display(), "gallery-dl installed");
                Ok(ResolvedTool {
                    command: dest.to_string_lossy().into_owned(),
                    source: ToolSource::InstallDir,
                })
            }
            ArtifactKind::Wheel => {
                info!("Installing gallery-dl from wheel via pip");
                pip_install(dest).await?;
                if let Err(e) = std::fs::remove_file(dest) {
                    warn!(path = %dest.display(), error = %e, "Failed to remove wheel after install");
                }
                Ok(ResolvedTool {
                    command: "gallery-dl".to_string(),
                    source: ToolSource::PackageInstall,
                })
            }
        }
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Runs `<command> --version` and returns the reported version line.
    pub async fn verify(&self) -> Result<String> {
        let command = self
            .command()
            .ok_or_else(|| anyhow::anyhow!("gallery-dl is not resolved"))?;

        let output = timeout(
            Duration::from_secs(VERIFY_TIMEOUT_SECS),
            Command::new(command)
                .arg("--version")
                .stdin(Stdio::null())
                .output(),
        )
        .await
        .map_err(|_| anyhow::anyhow!("gallery-dl --version timed out"))?
        .with_context(|| format!("Failed to run {} --version", command))?;

        if !output.status.success() {
            anyhow::bail!(
                "gallery-dl --version failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Runs `pip install <wheel>` through the platform's Python.
async fn pip_install(wheel: &Path) -> Result<()> {
    let python = if cfg!(windows) { "python" } else { "python3" };

    let output = Command::new(python)
        .args(["-m", "pip", "install"])
        .arg(wheel)
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Failed to run {} -m pip install", python))?;

    if !output.status.success() {
        anyhow::bail!(
            "pip install failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

/// Adds owner/group/other execute bits on unix; no-op elsewhere.
fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for {}", path.display()))?;

        let mut permissions = metadata.permissions();
        permissions.set_mode(permissions.mode() | 0o755);

        std::fs::set_permissions(path, permissions).with_context(|| {
            format!("Failed to set executable permission on {}", path.display())
        })?;
    }

    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn manager_starts_not_found_in_empty_dir() {
        let dir = TempDir::new().unwrap();
        // Guard against a developer machine that has gallery-dl on PATH.
        let manager = ToolManager::with_install_dir(dir.path().to_path_buf(), None);
        if which::which("gallery-dl").is_err() {
            assert_eq!(manager.resolution(), &Resolution::NotFound);
            assert_eq!(manager.command(), None);
        }
    }

    #[test]
    fn manager_resolves_binary_in_install_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("gallery-dl"), b"#!/bin/sh\n").unwrap();

        let manager = ToolManager::with_install_dir(dir.path().to_path_buf(), None);
        assert!(manager.resolution().is_resolved());
    }

    #[test]
    fn planned_asset_matches_platform() {
        let dir = TempDir::new().unwrap();
        let manager =
            ToolManager::with_install_dir(dir.path().to_path_buf(), Some(Platform::LinuxX64));
        assert_eq!(manager.planned_asset().local_name, "gallery-dl");

        let manager = ToolManager::with_install_dir(dir.path().to_path_buf(), None);
        assert_eq!(manager.planned_asset().kind, ArtifactKind::Wheel);
    }

    #[cfg(unix)]
    #[test]
    fn make_executable_sets_mode_bits() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tool");
        std::fs::write(&path, b"#!/bin/sh\necho hi\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        make_executable(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o755, 0o755);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn verify_reports_the_version_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gallery-dl");
        std::fs::write(&path, b"#!/bin/sh\necho 1.29.7\n").unwrap();
        make_executable(&path).unwrap();

        let manager = ToolManager::with_install_dir(dir.path().to_path_buf(), None);
        assert_eq!(manager.verify().await.unwrap(), "1.29.7");
    }

    #[tokio::test]
    async fn verify_fails_when_unresolved() {
        let dir = TempDir::new().unwrap();
        let manager = ToolManager::with_install_dir(dir.path().to_path_buf(), None);
        if manager.resolution() == &Resolution::NotFound {
            assert!(manager.verify().await.is_err());
        }
    }

    #[tokio::test]
    async fn failed_fetch_reverts_to_not_found_and_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        let mut manager =
            ToolManager::with_install_dir(dir.path().to_path_buf(), Some(Platform::LinuxX64));

        // A URL the allowlist rejects fails the fetch before any network
        // traffic happens.
        let mut bad_asset = manager.planned_asset();
        bad_asset.url = "https://example.com/gallery-dl.bin".to_string();
        let dest = dir.path().join(bad_asset.local_name);
        // Leftover from an earlier interrupted download; the failed fetch
        // has to clean it up.
        std::fs::write(&dest, b"partial").unwrap();

        let result = manager.fetch_asset(bad_asset, |_| {}).await;
        assert!(result.is_err());
        assert_eq!(manager.resolution(), &Resolution::NotFound);
        assert!(!dest.exists());
    }
}
