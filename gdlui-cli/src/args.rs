//! Command-line argument surface.
//!
//! Every flag here maps onto one [`OptionSet`] field; the heavy lifting
//! (flag ordering, token emission) stays in the core assembler. A profile
//! file provides the baseline and explicit flags override it.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;

use gdlui_core::{build_fragment, FilterExpression, FilterKind, OptionSet};

// =============================================================================
// Filter Criteria
// =============================================================================

/// One `--match` criterion: `KIND=VALUE`, or `KIND=START..END` for ranges.
///
/// Kinds are the kebab-case ids from [`FilterKind`], e.g.
/// `--match extension-equals=jpg` or
/// `--match date-between=2020-01-01..2021-01-01`.
#[derive(Debug, Clone)]
pub struct MatchSpec {
    pub kind: FilterKind,
    pub value: String,
    pub value2: String,
}

impl FromStr for MatchSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected KIND=VALUE, got: {}", s))?;
        let kind: FilterKind = kind.parse()?;

        let (value, value2) = if kind.needs_second_value() {
            match rest.split_once("..") {
                Some((start, end)) => (start, end),
                None => (rest, ""),
            }
        } else {
            (rest, "")
        };

        Ok(Self {
            kind,
            value: value.to_string(),
            value2: value2.to_string(),
        })
    }
}

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "gdlui",
    version,
    about = "A front-end for the gallery-dl downloader",
    after_help = "Filter kinds for --match: extension-equals, extension-in, \
                  extension-not-in, tags-contain, tags-not-contain, \
                  filename-contains, filename-not-contains, filename-regex, \
                  filename-not-regex, date-after, date-before, date-between"
)]
pub struct Cli {
    /// URLs to download
    pub urls: Vec<String>,

    /// Option profile (JSON) loaded before flag overrides
    #[arg(long, value_name = "FILE")]
    pub profile: Option<PathBuf>,

    /// Print the assembled command line without running it
    #[arg(long)]
    pub print_only: bool,

    /// Accept the download offer without prompting when gallery-dl is missing
    #[arg(short = 'y', long)]
    pub yes: bool,

    // --- general -------------------------------------------------------------
    /// Target directory
    #[arg(short = 'd', long, value_name = "DIR")]
    pub destination: Option<String>,

    /// Filename format string
    #[arg(long, value_name = "FORMAT")]
    pub filename_format: Option<String>,

    /// Custom User-Agent header
    #[arg(long, value_name = "UA")]
    pub user_agent: Option<String>,

    // --- input ---------------------------------------------------------------
    /// File with one URL per line
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input_file: Option<String>,

    /// Never prompt for passwords or tokens
    #[arg(long)]
    pub no_input: bool,

    // --- output --------------------------------------------------------------
    /// Quiet mode
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print URLs instead of downloading
    #[arg(short = 'g', long)]
    pub get_urls: bool,

    /// Simulate without downloading
    #[arg(short = 's', long)]
    pub simulate: bool,

    // --- networking ----------------------------------------------------------
    /// Maximum retry count
    #[arg(long, value_name = "N")]
    pub retries: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub http_timeout: Option<String>,

    /// Proxy URL
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Force IPv4
    #[arg(short = '4', long)]
    pub ipv4: bool,

    /// Force IPv6
    #[arg(short = '6', long)]
    pub ipv6: bool,

    /// Skip TLS certificate validation
    #[arg(long)]
    pub no_check_certificate: bool,

    // --- download ------------------------------------------------------------
    /// Download rate limit, e.g. 500k or 2.5M
    #[arg(long, value_name = "RATE")]
    pub rate_limit: Option<String>,

    /// Seconds to sleep between downloads
    #[arg(long, value_name = "SECS")]
    pub sleep: Option<String>,

    /// Do not use .part files
    #[arg(long)]
    pub no_part: bool,

    /// Overwrite existing files instead of skipping
    #[arg(long)]
    pub no_skip: bool,

    /// Do not set file modification times
    #[arg(long)]
    pub no_mtime: bool,

    /// Metadata extraction only, no file downloads
    #[arg(long)]
    pub no_download: bool,

    // --- authentication ------------------------------------------------------
    /// Login username
    #[arg(short = 'u', long, value_name = "USER")]
    pub username: Option<String>,

    /// Login password
    #[arg(short = 'p', long, value_name = "PASS")]
    pub password: Option<String>,

    /// Use .netrc authentication
    #[arg(long)]
    pub netrc: bool,

    /// Cookies file in Netscape format
    #[arg(long, value_name = "FILE")]
    pub cookies: Option<String>,

    // --- selection -----------------------------------------------------------
    /// Abort after this many consecutive skips
    #[arg(long, value_name = "N")]
    pub abort_after: Option<String>,

    /// Minimum file size, e.g. 100KB
    #[arg(long, value_name = "SIZE")]
    pub min_size: Option<String>,

    /// Maximum file size, e.g. 10MB
    #[arg(long, value_name = "SIZE")]
    pub max_size: Option<String>,

    /// Index range, e.g. 1-10 or 1:10:2
    #[arg(long, value_name = "RANGE")]
    pub range: Option<String>,

    /// Filter expression in gallery-dl's selection DSL
    #[arg(long, value_name = "EXPR")]
    pub filter: Option<String>,

    /// Add a built filter criterion (repeatable, AND-chained)
    #[arg(long = "match", value_name = "KIND=VALUE")]
    pub matches: Vec<MatchSpec>,

    // --- post-processing -----------------------------------------------------
    /// Write metadata JSON next to each file
    #[arg(long)]
    pub write_metadata: bool,

    /// Write tag text files next to each file
    #[arg(long)]
    pub write_tags: bool,

    /// Store downloads in a ZIP archive
    #[arg(long)]
    pub zip: bool,

    /// Store downloads in a CBZ archive
    #[arg(long)]
    pub cbz: bool,

    /// Command to run for each downloaded file
    #[arg(long, value_name = "CMD")]
    pub exec: Option<String>,

    /// Command to run after all downloads finished
    #[arg(long, value_name = "CMD")]
    pub exec_after: Option<String>,
}

impl Cli {
    /// Builds the option set: profile baseline, then flag overrides, then
    /// `--match` criteria appended to the filter expression.
    pub fn to_options(&self) -> Result<OptionSet> {
        let mut opts = match &self.profile {
            Some(path) => OptionSet::load(path)?,
            None => OptionSet::default(),
        };

        override_string(&mut opts.destination, &self.destination);
        override_string(&mut opts.filename_format, &self.filename_format);
        override_string(&mut opts.user_agent, &self.user_agent);
        override_string(&mut opts.input_file, &self.input_file);
        opts.no_input |= self.no_input;
        opts.quiet |= self.quiet;
        opts.verbose |= self.verbose;
        opts.get_urls_only |= self.get_urls;
        opts.simulate |= self.simulate;
        override_string(&mut opts.retries, &self.retries);
        override_string(&mut opts.http_timeout, &self.http_timeout);
        override_string(&mut opts.proxy, &self.proxy);
        opts.force_ipv4 |= self.ipv4;
        opts.force_ipv6 |= self.ipv6;
        opts.no_check_certificate |= self.no_check_certificate;
        override_string(&mut opts.rate_limit, &self.rate_limit);
        override_string(&mut opts.sleep, &self.sleep);
        opts.no_part |= self.no_part;
        opts.no_skip |= self.no_skip;
        opts.no_mtime |= self.no_mtime;
        opts.no_download |= self.no_download;
        override_string(&mut opts.username, &self.username);
        override_string(&mut opts.password, &self.password);
        opts.netrc |= self.netrc;
        override_string(&mut opts.cookies_file, &self.cookies);
        override_string(&mut opts.abort_after_skips, &self.abort_after);
        override_string(&mut opts.min_size, &self.min_size);
        override_string(&mut opts.max_size, &self.max_size);
        override_string(&mut opts.index_range, &self.range);
        override_string(&mut opts.filter, &self.filter);
        opts.write_metadata |= self.write_metadata;
        opts.write_tags |= self.write_tags;
        opts.zip |= self.zip;
        opts.cbz |= self.cbz;
        override_string(&mut opts.exec_per_file, &self.exec);
        override_string(&mut opts.exec_after_all, &self.exec_after);

        if !self.matches.is_empty() {
            let mut expr = FilterExpression::from(std::mem::take(&mut opts.filter));
            for spec in &self.matches {
                let fragment = build_fragment(spec.kind, &spec.value, &spec.value2)
                    .with_context(|| format!("--match {}", spec.kind))?;
                expr.push(&fragment);
            }
            opts.filter = expr.into_inner();
        }

        Ok(opts)
    }
}

fn override_string(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}
