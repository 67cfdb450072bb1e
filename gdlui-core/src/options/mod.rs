//! The option model: every user-configurable gallery-dl run parameter.
//!
//! An [`OptionSet`] is filled in by the front-end, handed to the command
//! assembler once per invocation, and never mutated while a run is in
//! flight. Unset here means "emit nothing": an empty string or a `false`
//! flag contributes no tokens to the assembled command line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// =============================================================================
// Defaults
// =============================================================================

/// Default retry count passed as `-R`.
pub const DEFAULT_RETRIES: &str = "4";

/// Default HTTP timeout in seconds passed as `--http-timeout`.
pub const DEFAULT_HTTP_TIMEOUT: &str = "30.0";

fn default_retries() -> String {
    DEFAULT_RETRIES.to_string()
}

fn default_http_timeout() -> String {
    DEFAULT_HTTP_TIMEOUT.to_string()
}

// =============================================================================
// Option Set
// =============================================================================

/// The full collection of run parameters for one gallery-dl invocation.
///
/// Numeric-looking settings (retries, timeout, sleep, ...) stay as free
/// text: gallery-dl does its own parsing and accepts forms like `2.5M` or
/// `0.5-1.5` that a typed field would have to replicate for no gain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    /// Target directory (`-d`).
    #[serde(default)]
    pub destination: String,

    /// Filename format string (`-f`).
    #[serde(default)]
    pub filename_format: String,

    /// Custom User-Agent header (`--user-agent`).
    #[serde(default)]
    pub user_agent: String,

    /// File with one URL per line (`-i`).
    #[serde(default)]
    pub input_file: String,

    /// Never prompt for passwords or tokens (`--no-input`).
    #[serde(default)]
    pub no_input: bool,

    /// Quiet mode (`-q`).
    #[serde(default)]
    pub quiet: bool,

    /// Verbose mode (`-v`).
    #[serde(default)]
    pub verbose: bool,

    /// Print URLs instead of downloading (`-g`).
    #[serde(default)]
    pub get_urls_only: bool,

    /// Simulate without downloading (`-s`).
    #[serde(default)]
    pub simulate: bool,

    /// Maximum retry count (`-R`).
    #[serde(default = "default_retries")]
    pub retries: String,

    /// HTTP timeout in seconds (`--http-timeout`).
    #[serde(default = "default_http_timeout")]
    pub http_timeout: String,

    /// Proxy URL (`--proxy`).
    #[serde(default)]
    pub proxy: String,

    /// Force IPv4 (`-4`).
    #[serde(default)]
    pub force_ipv4: bool,

    /// Force IPv6 (`-6`).
    #[serde(default)]
    pub force_ipv6: bool,

    /// Skip TLS certificate validation (`--no-check-certificate`).
    #[serde(default)]
    pub no_check_certificate: bool,

    /// Download rate limit, e.g. `500k` or `2.5M` (`-r`).
    #[serde(default)]
    pub rate_limit: String,

    /// Seconds to sleep between downloads (`--sleep`).
    #[serde(default)]
    pub sleep: String,

    /// Do not use `.part` files (`--no-part`).
    #[serde(default)]
    pub no_part: bool,

    /// Overwrite existing files instead of skipping (`--no-skip`).
    #[serde(default)]
    pub no_skip: bool,

    /// Do not set file modification times (`--no-mtime`).
    #[serde(default)]
    pub no_mtime: bool,

    /// Metadata extraction only, no file downloads (`--no-download`).
    #[serde(default)]
    pub no_download: bool,

    /// Login username (`-u`).
    #[serde(default)]
    pub username: String,

    /// Login password (`-p`).
    #[serde(default)]
    pub password: String,

    /// Use `.netrc` authentication (`--netrc`).
    #[serde(default)]
    pub netrc: bool,

    /// Cookies file in Netscape format (`-C`).
    #[serde(default)]
    pub cookies_file: String,

    /// Abort after this many consecutive skips (`-A`).
    #[serde(default)]
    pub abort_after_skips: String,

    /// Minimum file size, e.g. `100KB` (`--filesize-min`).
    #[serde(default)]
    pub min_size: String,

    /// Maximum file size, e.g. `10MB` (`--filesize-max`).
    #[serde(default)]
    pub max_size: String,

    /// Index range, e.g. `1-10` or `1:10:2` (`--range`).
    #[serde(default)]
    pub index_range: String,

    /// Filter expression in gallery-dl's selection DSL (`--filter`).
    ///
    /// Usually produced by the filter builder, but free text: the user may
    /// hand-edit it and the builder just appends to whatever is here.
    #[serde(default)]
    pub filter: String,

    /// Write metadata JSON next to each file (`--write-metadata`).
    #[serde(default)]
    pub write_metadata: bool,

    /// Write tag text files next to each file (`--write-tags`).
    #[serde(default)]
    pub write_tags: bool,

    /// Store downloads in a ZIP archive (`--zip`).
    #[serde(default)]
    pub zip: bool,

    /// Store downloads in a CBZ archive (`--cbz`).
    #[serde(default)]
    pub cbz: bool,

    /// Command to run for each downloaded file (`--exec`).
    #[serde(default)]
    pub exec_per_file: String,

    /// Command to run after all downloads finished (`--exec-after`).
    #[serde(default)]
    pub exec_after_all: String,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            destination: String::new(),
            filename_format: String::new(),
            user_agent: String::new(),
            input_file: String::new(),
            no_input: false,
            quiet: false,
            verbose: false,
            get_urls_only: false,
            simulate: false,
            retries: default_retries(),
            http_timeout: default_http_timeout(),
            proxy: String::new(),
            force_ipv4: false,
            force_ipv6: false,
            no_check_certificate: false,
            rate_limit: String::new(),
            sleep: String::new(),
            no_part: false,
            no_skip: false,
            no_mtime: false,
            no_download: false,
            username: String::new(),
            password: String::new(),
            netrc: false,
            cookies_file: String::new(),
            abort_after_skips: String::new(),
            min_size: String::new(),
            max_size: String::new(),
            index_range: String::new(),
            filter: String::new(),
            write_metadata: false,
            write_tags: false,
            zip: false,
            cbz: false,
            exec_per_file: String::new(),
            exec_after_all: String::new(),
        }
    }
}

impl OptionSet {
    /// Loads an option profile from a JSON file.
    ///
    /// Missing fields fall back to their defaults, so a profile only needs
    /// to carry the settings it actually changes.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Invalid profile JSON: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_original_form_values() {
        let opts = OptionSet::default();
        assert_eq!(opts.retries, "4");
        assert_eq!(opts.http_timeout, "30.0");
        assert!(opts.destination.is_empty());
        assert!(!opts.verbose);
    }

    #[test]
    fn partial_profile_keeps_defaults() {
        let opts: OptionSet =
            serde_json::from_str(r#"{"destination": "/tmp/dl", "quiet": true}"#).unwrap();
        assert_eq!(opts.destination, "/tmp/dl");
        assert!(opts.quiet);
        assert_eq!(opts.retries, "4");
    }

    #[test]
    fn load_reads_profile_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(br#"{"verbose": true, "rate_limit": "500k"}"#)
            .unwrap();

        let opts = OptionSet::load(&path).unwrap();
        assert!(opts.verbose);
        assert_eq!(opts.rate_limit, "500k");
    }

    #[test]
    fn load_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(OptionSet::load(&path).is_err());
    }

    #[test]
    fn roundtrips_through_json() {
        let mut opts = OptionSet::default();
        opts.filter = "extension == 'jpg'".to_string();
        opts.cbz = true;

        let json = serde_json::to_string(&opts).unwrap();
        let back: OptionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(opts, back);
    }
}
