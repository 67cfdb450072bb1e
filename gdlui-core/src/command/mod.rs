//! Assembles gallery-dl command lines from an [`OptionSet`].
//!
//! Pure and deterministic: the same inputs always produce the same token
//! sequence, in the fixed order gallery-dl's CLI contract expects, with the
//! URLs trailing. Tokens are kept as discrete argv elements end to end, so
//! values with spaces or shell metacharacters need no quoting anywhere.

use std::fmt;

use crate::options::OptionSet;

// =============================================================================
// Command Line
// =============================================================================

/// One ready-to-spawn invocation: program first, then its arguments.
///
/// Built fresh per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// All tokens in spawn order, program included.
    pub fn argv(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }
}

impl fmt::Display for CommandLine {
    // Space-joined for logging only; this is not shell-safe quoting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().collect::<Vec<_>>().join(" "))
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Renders an option set and URL list into a command line for `program`.
///
/// Every option contributes zero tokens when unset (empty string / `false`),
/// one fixed flag token for booleans, or a flag-plus-value pair for text
/// settings. Blank URL lines are dropped.
pub fn assemble(program: impl Into<String>, opts: &OptionSet, urls: &[String]) -> CommandLine {
    let mut args: Vec<String> = Vec::new();

    value_arg(&mut args, "-d", &opts.destination);
    value_arg(&mut args, "-f", &opts.filename_format);
    value_arg(&mut args, "--user-agent", &opts.user_agent);
    value_arg(&mut args, "-i", &opts.input_file);
    flag_arg(&mut args, "--no-input", opts.no_input);
    flag_arg(&mut args, "-q", opts.quiet);
    flag_arg(&mut args, "-v", opts.verbose);
    flag_arg(&mut args, "-g", opts.get_urls_only);
    flag_arg(&mut args, "-s", opts.simulate);
    value_arg(&mut args, "-R", &opts.retries);
    value_arg(&mut args, "--http-timeout", &opts.http_timeout);
    value_arg(&mut args, "--proxy", &opts.proxy);
    flag_arg(&mut args, "-4", opts.force_ipv4);
    flag_arg(&mut args, "-6", opts.force_ipv6);
    flag_arg(&mut args, "--no-check-certificate", opts.no_check_certificate);
    value_arg(&mut args, "-r", &opts.rate_limit);
    value_arg(&mut args, "--sleep", &opts.sleep);
    flag_arg(&mut args, "--no-part", opts.no_part);
    flag_arg(&mut args, "--no-skip", opts.no_skip);
    flag_arg(&mut args, "--no-mtime", opts.no_mtime);
    flag_arg(&mut args, "--no-download", opts.no_download);
    value_arg(&mut args, "-u", &opts.username);
    value_arg(&mut args, "-p", &opts.password);
    flag_arg(&mut args, "--netrc", opts.netrc);
    value_arg(&mut args, "-C", &opts.cookies_file);
    value_arg(&mut args, "-A", &opts.abort_after_skips);
    value_arg(&mut args, "--filesize-min", &opts.min_size);
    value_arg(&mut args, "--filesize-max", &opts.max_size);
    value_arg(&mut args, "--range", &opts.index_range);
    value_arg(&mut args, "--filter", &opts.filter);
    flag_arg(&mut args, "--write-metadata", opts.write_metadata);
    flag_arg(&mut args, "--write-tags", opts.write_tags);
    flag_arg(&mut args, "--zip", opts.zip);
    flag_arg(&mut args, "--cbz", opts.cbz);
    value_arg(&mut args, "--exec", &opts.exec_per_file);
    value_arg(&mut args, "--exec-after", &opts.exec_after_all);

    args.extend(
        urls.iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(str::to_string),
    );

    CommandLine {
        program: program.into(),
        args,
    }
}

fn flag_arg(args: &mut Vec<String>, flag: &str, enabled: bool) {
    if enabled {
        args.push(flag.to_string());
    }
}

fn value_arg(args: &mut Vec<String>, flag: &str, value: &str) {
    if !value.is_empty() {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}
