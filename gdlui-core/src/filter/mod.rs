//! Builder for gallery-dl `--filter` expressions.
//!
//! gallery-dl selects files with a small Python-flavored boolean DSL
//! (`extension == 'jpg' and date >= datetime(2020, 1, 1)`). This module
//! turns one human-chosen criterion into a single condition fragment via a
//! fixed template, and chains fragments with `and`.
//!
//! Generation only: the combined expression is plain text that the user may
//! hand-edit freely, and the builder never parses it back. Each append just
//! concatenates after whatever text is currently present.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Validation failures while building a condition fragment.
///
/// These are inline, recoverable input errors: the expression text is left
/// untouched and the user re-enters the value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Value cannot be empty")]
    ValueRequired,

    #[error("No valid values provided")]
    NoValues,

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate,

    #[error("End date is required for date range")]
    EndDateRequired,
}

// =============================================================================
// Criterion Kinds
// =============================================================================

/// The fixed set of criterion kinds the builder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    /// `extension == '<v>'`
    ExtensionEquals,
    /// `extension in ('a', 'b')`
    ExtensionIn,
    /// `extension not in ('a', 'b')`
    ExtensionNotIn,
    /// `contains(tags, ('''t1''', '''t2'''))`
    TagsContain,
    /// `not contains(tags, (...))`
    TagsNotContain,
    /// Case-insensitive filename substring test.
    FilenameContains,
    /// Negated case-insensitive filename substring test.
    FilenameNotContains,
    /// `re.search(r'<v>', filename)`
    FilenameRegex,
    /// `not re.search(r'<v>', filename)`
    FilenameNotRegex,
    /// `date >= datetime(y, m, d)`
    DateAfter,
    /// `date < datetime(y, m, d)`
    DateBefore,
    /// Half-open range between two dates. Needs a second value.
    DateBetween,
}

impl FilterKind {
    /// All kinds, in the order the original selection form listed them.
    pub fn all() -> &'static [FilterKind] {
        &[
            Self::ExtensionEquals,
            Self::ExtensionIn,
            Self::ExtensionNotIn,
            Self::TagsContain,
            Self::TagsNotContain,
            Self::FilenameContains,
            Self::FilenameNotContains,
            Self::FilenameRegex,
            Self::FilenameNotRegex,
            Self::DateAfter,
            Self::DateBefore,
            Self::DateBetween,
        ]
    }

    /// Stable kebab-case identifier, also accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtensionEquals => "extension-equals",
            Self::ExtensionIn => "extension-in",
            Self::ExtensionNotIn => "extension-not-in",
            Self::TagsContain => "tags-contain",
            Self::TagsNotContain => "tags-not-contain",
            Self::FilenameContains => "filename-contains",
            Self::FilenameNotContains => "filename-not-contains",
            Self::FilenameRegex => "filename-regex",
            Self::FilenameNotRegex => "filename-not-regex",
            Self::DateAfter => "date-after",
            Self::DateBefore => "date-before",
            Self::DateBetween => "date-between",
        }
    }

    /// Short input hint for this kind, shown next to the value field.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::ExtensionEquals => "Enter extension without dot (e.g. 'jpg')",
            Self::ExtensionIn | Self::ExtensionNotIn => {
                "Enter extensions separated by commas (e.g. 'jpg,png,gif')"
            }
            Self::TagsContain | Self::TagsNotContain => {
                "Enter tags separated by commas (e.g. 'tag1,tag2')"
            }
            Self::FilenameContains => "Enter text that should be in the filename (case insensitive)",
            Self::FilenameNotContains => {
                "Enter text that should NOT be in the filename (case insensitive)"
            }
            Self::FilenameRegex => "Enter regex pattern (e.g. '(?i)stills|mainvid')",
            Self::FilenameNotRegex => "Enter regex pattern to exclude",
            Self::DateAfter | Self::DateBefore => "Enter date in YYYY-MM-DD format",
            Self::DateBetween => "Enter start and end date, both in YYYY-MM-DD format",
        }
    }

    /// True for kinds that need a second value (the range end date).
    pub fn needs_second_value(&self) -> bool {
        matches!(self, Self::DateBetween)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "extension-equals" => Ok(Self::ExtensionEquals),
            "extension-in" => Ok(Self::ExtensionIn),
            "extension-not-in" => Ok(Self::ExtensionNotIn),
            "tags-contain" => Ok(Self::TagsContain),
            "tags-not-contain" => Ok(Self::TagsNotContain),
            "filename-contains" => Ok(Self::FilenameContains),
            "filename-not-contains" => Ok(Self::FilenameNotContains),
            "filename-regex" => Ok(Self::FilenameRegex),
            "filename-not-regex" => Ok(Self::FilenameNotRegex),
            "date-after" => Ok(Self::DateAfter),
            "date-before" => Ok(Self::DateBefore),
            "date-between" => Ok(Self::DateBetween),
            _ => Err(format!("Unknown filter kind: {}", s)),
        }
    }
}

// =============================================================================
// Fragment Generation
// =============================================================================

/// Builds one condition fragment from a criterion kind and its raw inputs.
///
/// `value2` is only consulted for [`FilterKind::DateBetween`]. Inputs are
/// trimmed; comma lists drop empty elements. On any validation failure no
/// fragment is produced and the caller's state stays unchanged.
pub fn build_fragment(
    kind: FilterKind,
    value: &str,
    value2: &str,
) -> Result<String, FilterError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FilterError::ValueRequired);
    }

    let fragment = match kind {
        FilterKind::ExtensionEquals => format!("extension == '{}'", value),

        FilterKind::ExtensionIn => {
            format!("extension in ({})", quoted_list(value, "'")?)
        }

        FilterKind::ExtensionNotIn => {
            format!("extension not in ({})", quoted_list(value, "'")?)
        }

        // Triple quotes keep tags containing apostrophes intact.
        FilterKind::TagsContain => {
            format!("contains(tags, ({}))", quoted_list(value, "'''")?)
        }

        FilterKind::TagsNotContain => {
            format!("not contains(tags, ({}))", quoted_list(value, "'''")?)
        }

        FilterKind::FilenameContains => {
            format!("'{}' in filename.lower()", value.to_lowercase())
        }

        FilterKind::FilenameNotContains => {
            format!("'{}' not in filename.lower()", value.to_lowercase())
        }

        FilterKind::FilenameRegex => format!("re.search(r'{}', filename)", value),

        FilterKind::FilenameNotRegex => format!("not re.search(r'{}', filename)", value),

        FilterKind::DateAfter => {
            let (y, m, d) = parse_date(value)?;
            format!("date >= datetime({}, {}, {})", y, m, d)
        }

        FilterKind::DateBefore => {
            let (y, m, d) = parse_date(value)?;
            format!("date < datetime({}, {}, {})", y, m, d)
        }

        FilterKind::DateBetween => {
            let value2 = value2.trim();
            if value2.is_empty() {
                return Err(FilterError::EndDateRequired);
            }
            let (y1, m1, d1) = parse_date(value)?;
            let (y2, m2, d2) = parse_date(value2)?;
            format!(
                "datetime({}, {}, {}) <= date < datetime({}, {}, {})",
                y1, m1, d1, y2, m2, d2
            )
        }
    };

    Ok(fragment)
}

/// Splits a comma list, trims elements, drops empties, and wraps each in
/// the given quote string. Fails when nothing survives the cleanup.
fn quoted_list(input: &str, quote: &str) -> Result<String, FilterError> {
    let items: Vec<String> = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("{q}{s}{q}", q = quote, s = s))
        .collect();

    if items.is_empty() {
        return Err(FilterError::NoValues);
    }
    Ok(items.join(", "))
}

/// Parses `YYYY-MM-DD` as exactly three '-'-separated integers.
///
/// Only the shape is checked; calendar validity is left to gallery-dl's own
/// `datetime`, matching the original behavior.
fn parse_date(input: &str) -> Result<(i64, i64, i64), FilterError> {
    let parts: Vec<&str> = input.split('-').collect();
    if parts.len() != 3 {
        return Err(FilterError::InvalidDate);
    }

    let mut nums = [0i64; 3];
    for (slot, part) in nums.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<i64>()
            .map_err(|_| FilterError::InvalidDate)?;
    }
    Ok((nums[0], nums[1], nums[2]))
}

// =============================================================================
// Filter Expression
// =============================================================================

/// The combined expression: fragments joined by `and`, kept as plain text.
///
/// The user may hand-edit the text at any time; [`FilterExpression::push`]
/// tolerates that and simply appends after the current content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression(String);

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Appends a fragment with `and` conjunction, or adopts it wholesale
    /// when the expression is still empty.
    pub fn push(&mut self, fragment: &str) {
        if self.is_empty() {
            self.0 = fragment.to_string();
        } else {
            let current = self.0.trim().to_string();
            self.0 = format!("{} and {}", current, fragment);
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for FilterExpression {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_equals() {
        let frag = build_fragment(FilterKind::ExtensionEquals, "jpg", "").unwrap();
        assert_eq!(frag, "extension == 'jpg'");
    }

    #[test]
    fn extension_in_cleans_list() {
        let frag = build_fragment(FilterKind::ExtensionIn, "jpg, png ,gif", "").unwrap();
        assert_eq!(frag, "extension in ('jpg', 'png', 'gif')");
    }

    #[test]
    fn extension_not_in() {
        let frag = build_fragment(FilterKind::ExtensionNotIn, "mp4,webm", "").unwrap();
        assert_eq!(frag, "extension not in ('mp4', 'webm')");
    }

    #[test]
    fn tags_use_triple_quotes() {
        let frag = build_fragment(FilterKind::TagsContain, "cat, dog", "").unwrap();
        assert_eq!(frag, "contains(tags, ('''cat''', '''dog'''))");

        let frag = build_fragment(FilterKind::TagsNotContain, "cat", "").unwrap();
        assert_eq!(frag, "not contains(tags, ('''cat'''))");
    }

    #[test]
    fn filename_contains_lowercases() {
        let frag = build_fragment(FilterKind::FilenameContains, "StIlLs", "").unwrap();
        assert_eq!(frag, "'stills' in filename.lower()");

        let frag = build_fragment(FilterKind::FilenameNotContains, "RAW", "").unwrap();
        assert_eq!(frag, "'raw' not in filename.lower()");
    }

    #[test]
    fn filename_regex_passthrough() {
        let frag = build_fragment(FilterKind::FilenameRegex, "(?i)stills|mainvid", "").unwrap();
        assert_eq!(frag, "re.search(r'(?i)stills|mainvid', filename)");

        let frag = build_fragment(FilterKind::FilenameNotRegex, "tmp", "").unwrap();
        assert_eq!(frag, "not re.search(r'tmp', filename)");
    }

    #[test]
    fn date_after_accepts_short_components() {
        let frag = build_fragment(FilterKind::DateAfter, "2020-1-5", "").unwrap();
        assert_eq!(frag, "date >= datetime(2020, 1, 5)");
    }

    #[test]
    fn date_before() {
        let frag = build_fragment(FilterKind::DateBefore, "2020-12-31", "").unwrap();
        assert_eq!(frag, "date < datetime(2020, 12, 31)");
    }

    #[test]
    fn date_rejects_wrong_separator() {
        assert_eq!(
            build_fragment(FilterKind::DateAfter, "2020/01/05", ""),
            Err(FilterError::InvalidDate)
        );
    }

    #[test]
    fn date_rejects_wrong_shape() {
        assert_eq!(
            build_fragment(FilterKind::DateAfter, "2020-01", ""),
            Err(FilterError::InvalidDate)
        );
        assert_eq!(
            build_fragment(FilterKind::DateAfter, "2020-01-05-07", ""),
            Err(FilterError::InvalidDate)
        );
    }

    #[test]
    fn date_between_requires_end_date() {
        assert_eq!(
            build_fragment(FilterKind::DateBetween, "2020-01-01", ""),
            Err(FilterError::EndDateRequired)
        );
    }

    #[test]
    fn date_between_renders_half_open_range() {
        let frag = build_fragment(FilterKind::DateBetween, "2020-01-01", "2021-06-15").unwrap();
        assert_eq!(
            frag,
            "datetime(2020, 1, 1) <= date < datetime(2021, 6, 15)"
        );
    }

    #[test]
    fn empty_value_rejected_before_kind_logic() {
        for kind in FilterKind::all() {
            assert_eq!(
                build_fragment(*kind, "   ", "2020-01-01"),
                Err(FilterError::ValueRequired)
            );
        }
    }

    #[test]
    fn list_of_only_commas_rejected() {
        assert_eq!(
            build_fragment(FilterKind::ExtensionIn, " , ,", ""),
            Err(FilterError::NoValues)
        );
    }

    #[test]
    fn expression_push_inserts_and() {
        let mut expr = FilterExpression::new();
        assert!(expr.is_empty());

        expr.push("extension == 'jpg'");
        assert_eq!(expr.as_str(), "extension == 'jpg'");

        expr.push("date < datetime(2021, 1, 1)");
        assert_eq!(
            expr.as_str(),
            "extension == 'jpg' and date < datetime(2021, 1, 1)"
        );
    }

    #[test]
    fn expression_tolerates_hand_edits() {
        let mut expr = FilterExpression::from("width >= 1000 or height >= 1000".to_string());
        expr.push("extension == 'png'");
        assert_eq!(
            expr.as_str(),
            "width >= 1000 or height >= 1000 and extension == 'png'"
        );
    }

    #[test]
    fn kind_ids_roundtrip() {
        for kind in FilterKind::all() {
            let parsed: FilterKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
        assert!("no-such-kind".parse::<FilterKind>().is_err());
    }

    #[test]
    fn every_kind_has_a_hint() {
        for kind in FilterKind::all() {
            assert!(!kind.hint().is_empty());
        }
    }
}
