//! Install-directory path resolution.
//!
//! The fetched gallery-dl binary lives in a fixed app-owned directory under
//! the user's local data dir:
//!
//! - Linux: `~/.local/share/gdlui/bin/`
//! - macOS: `~/Library/Application Support/gdlui/bin/`
//! - Windows: `C:\Users\<User>\AppData\Local\gdlui\bin\`
//!
//! When no local data dir is available (unusual, e.g. stripped-down
//! containers) the OS temp dir is used instead.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// App directory name under the local data dir.
const APP_DIR: &str = "gdlui";

/// Returns the base gdlui data directory.
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Returns the directory the fetched executable is installed into.
///
/// Path: `{data}/gdlui/bin/`
pub fn install_dir() -> PathBuf {
    data_dir().join("bin")
}

/// Ensures the install directory exists.
pub fn ensure_dirs_exist() -> Result<()> {
    ensure_dir(&install_dir())
}

/// Creates `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(())
}
