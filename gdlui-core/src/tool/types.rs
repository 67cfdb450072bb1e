//! Core types for locating and fetching the gallery-dl executable.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Platform Detection
// ============================================================================

/// A supported platform (OS + architecture) for release-asset selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    LinuxX64,
    LinuxArm64,
    MacosX64,
    MacosArm64,
    WindowsX64,
    /// Windows on anything other than x86_64 (the 32-bit release build).
    WindowsX86,
}

impl Platform {
    /// Detects the current platform at compile time.
    ///
    /// Returns `None` on platforms without a prebuilt release binary; the
    /// fetcher falls back to the pip wheel there.
    pub fn detect() -> Option<Self> {
        #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
        {
            Some(Platform::LinuxX64)
        }
        #[cfg(all(target_os = "linux", target_arch = "aarch64"))]
        {
            Some(Platform::LinuxArm64)
        }
        #[cfg(all(target_os = "macos", target_arch = "x86_64"))]
        {
            Some(Platform::MacosX64)
        }
        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        {
            Some(Platform::MacosArm64)
        }
        #[cfg(all(target_os = "windows", target_arch = "x86_64"))]
        {
            Some(Platform::WindowsX64)
        }
        #[cfg(all(target_os = "windows", not(target_arch = "x86_64")))]
        {
            Some(Platform::WindowsX86)
        }
        #[cfg(not(any(
            all(target_os = "linux", target_arch = "x86_64"),
            all(target_os = "linux", target_arch = "aarch64"),
            all(target_os = "macos", target_arch = "x86_64"),
            all(target_os = "macos", target_arch = "aarch64"),
            target_os = "windows",
        )))]
        {
            None
        }
    }

    /// Human-readable platform name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LinuxX64 => "Linux (x86_64)",
            Self::LinuxArm64 => "Linux (ARM64)",
            Self::MacosX64 => "macOS (Intel)",
            Self::MacosArm64 => "macOS (Apple Silicon)",
            Self::WindowsX64 => "Windows (x86_64)",
            Self::WindowsX86 => "Windows (32-bit)",
        }
    }

    /// True for platforms whose fetched binary needs an executable bit.
    pub fn is_unix(&self) -> bool {
        !matches!(self, Self::WindowsX64 | Self::WindowsX86)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Artifacts
// ============================================================================

/// What kind of release artifact a platform gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// A standalone executable, usable after an optional chmod.
    Binary,
    /// A Python wheel that must be handed to `pip install`.
    Wheel,
}

// ============================================================================
// Resolution
// ============================================================================

/// Where a resolved gallery-dl command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSource {
    /// Found in (or fetched into) the app's own install directory.
    InstallDir,
    /// Found on the system search path.
    SearchPath,
    /// Installed through pip; invoked by bare command name.
    PackageInstall,
}

/// A usable gallery-dl command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    /// Full path, or bare command name after a package install.
    pub command: String,
    pub source: ToolSource,
}

/// Outcome of probing for the executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedTool),
    NotFound,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The command to invoke, when resolved.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Resolved(tool) => Some(&tool.command),
            Self::NotFound => None,
        }
    }
}
