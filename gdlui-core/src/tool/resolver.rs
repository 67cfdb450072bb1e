//! Locates an existing gallery-dl executable.
//!
//! Probe order: the app's own install directory first (which is where the
//! fetcher puts a downloaded binary), then the system search path. First
//! hit wins.

use std::path::Path;
use tracing::debug;

use super::paths;
use super::types::{Resolution, ResolvedTool, ToolSource};

/// Executable names to look for, in probe order.
pub const CANDIDATE_NAMES: &[&str] = &["gallery-dl", "gallery-dl.exe"];

/// Resolves gallery-dl from the default install dir and the search path.
pub fn resolve() -> Resolution {
    probe(&paths::install_dir(), CANDIDATE_NAMES)
}

/// Probes a specific install directory, then the search path, for any of
/// the candidate names.
pub fn probe(install_dir: &Path, names: &[&str]) -> Resolution {
    for name in names {
        let candidate = install_dir.join(name);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Found tool in install dir");
            return Resolution::Resolved(ResolvedTool {
                command: candidate.to_string_lossy().into_owned(),
                source: ToolSource::InstallDir,
            });
        }
    }

    for name in names {
        if let Ok(path) = which::which(name) {
            debug!(path = %path.display(), "Found tool on search path");
            return Resolution::Resolved(ResolvedTool {
                command: path.to_string_lossy().into_owned(),
                source: ToolSource::SearchPath,
            });
        }
    }

    Resolution::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Improbable names keep the search-path leg of the probe from matching
    // something real on the test machine.
    const FAKE_NAMES: &[&str] = &["gdlui-test-tool-d41d8cd9", "gdlui-test-tool-d41d8cd9.exe"];

    #[test]
    fn absent_everywhere_yields_not_found() {
        let dir = TempDir::new().unwrap();
        assert_eq!(probe(dir.path(), FAKE_NAMES), Resolution::NotFound);
    }

    #[test]
    fn install_dir_hit_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FAKE_NAMES[0]);
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();

        match probe(dir.path(), FAKE_NAMES) {
            Resolution::Resolved(tool) => {
                assert_eq!(tool.command, path.to_string_lossy());
                assert_eq!(tool.source, ToolSource::InstallDir);
            }
            Resolution::NotFound => panic!("expected a resolved tool"),
        }
    }

    #[test]
    fn second_candidate_name_is_probed_too() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FAKE_NAMES[1]);
        std::fs::write(&path, b"").unwrap();

        assert!(probe(dir.path(), FAKE_NAMES).is_resolved());
    }

    #[test]
    fn directories_do_not_count_as_executables() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(FAKE_NAMES[0])).unwrap();

        assert_eq!(probe(dir.path(), FAKE_NAMES), Resolution::NotFound);
    }
}
