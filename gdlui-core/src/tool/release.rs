//! The pinned gallery-dl release and its per-platform download assets.

use super::types::{ArtifactKind, Platform};

// ============================================================================
// Release Definition
// ============================================================================

/// Pinned gallery-dl version offered by the fetcher.
pub const TOOL_VERSION: &str = "1.29.7";

/// Base URL all asset filenames are appended to.
pub const RELEASE_BASE_URL: &str =
    "https://github.com/mikf/gallery-dl/releases/download/v1.29.7/";

/// Wheel filename used when no prebuilt binary exists for the platform.
const WHEEL_FILE: &str = "gallery_dl-1.29.7-py3-none-any.whl";

/// One downloadable release artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// Full download URL.
    pub url: String,
    /// Filename on the release host.
    pub file_name: &'static str,
    /// Filename to save as locally. Differs from `file_name` for the unix
    /// binary, which ships as `gallery-dl.bin` but installs as `gallery-dl`.
    pub local_name: &'static str,
    pub kind: ArtifactKind,
    /// Expected SHA-256 (lowercase hex), when the release publishes one.
    pub sha256: Option<&'static str>,
}

/// Selects the artifact for a platform.
///
/// Four branches: Windows x86_64 gets the 64-bit exe, other Windows the
/// 32-bit exe, unix-likes the standalone `.bin`, and unknown platforms fall
/// back to the pip wheel.
pub fn asset_for(platform: Option<Platform>) -> ReleaseAsset {
    let (file_name, local_name, kind) = match platform {
        Some(Platform::WindowsX64) => ("gallery-dl.exe", "gallery-dl.exe", ArtifactKind::Binary),
        Some(Platform::WindowsX86) => {
            ("gallery-dl_x86.exe", "gallery-dl_x86.exe", ArtifactKind::Binary)
        }
        Some(
            Platform::LinuxX64 | Platform::LinuxArm64 | Platform::MacosX64 | Platform::MacosArm64,
        ) => ("gallery-dl.bin", "gallery-dl", ArtifactKind::Binary),
        None => (WHEEL_FILE, WHEEL_FILE, ArtifactKind::Wheel),
    };

    ReleaseAsset {
        url: format!("{}{}", RELEASE_BASE_URL, file_name),
        file_name,
        local_name,
        kind,
        sha256: None,
    }
}
