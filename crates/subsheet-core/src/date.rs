//! DateNormalizer: Resolves free-text dates against an ordered pattern list.
//!
//! Resolution is attempted in order:
//!
//! 1. pre-normalization (trim, collapse whitespace, strip ordinal suffixes,
//!    canonicalize month names to three-letter abbreviations);
//! 2. each configured pattern, top to bottom. A pattern wins only if its
//!    anchored shape matches the text *and* chrono yields a calendar-valid
//!    date with a four-digit year;
//! 3. the permissive fallback (RFC 3339/2822 timestamps, ISO-like and US
//!    date-times, long textual dates), when enabled.
//!
//! The order is fixed per [`DateNormalizer`], so an ambiguous string such as
//! `01/02/2024` resolves the same way on every call.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use phf::phf_map;
use regex::Regex;
use std::sync::LazyLock;

use crate::config::{ConfigError, DateConfig};

// ---------------------------------------------------------------------------
// Pattern catalog
// ---------------------------------------------------------------------------

/// Built-in precedence, identical to the embedded `[dates] precedence`.
pub const DEFAULT_PRECEDENCE: &[&str] = &[
    "MM/dd/yyyy",
    "yyyy-MM-dd",
    "dd/MM/yyyy",
    "MM-dd-yyyy",
    "dd-MM-yyyy",
    "M/d/yy",
    "yyyy/MM/dd",
    "dd.MM.yyyy",
    "MM.dd.yyyy",
    "d MMM yyyy",
    "MMM d, yyyy",
    "MMM d yyyy",
    "d-MMM-yyyy",
    "d-MMM-yy",
];

struct PatternSpec {
    name: &'static str,
    shape: &'static str,
    format: &'static str,
}

// Shapes run against pre-normalized text, where month names are always
// three ASCII letters.
const CATALOG: &[PatternSpec] = &[
    PatternSpec { name: "MM/dd/yyyy", shape: r"^\d{1,2}/\d{1,2}/\d{4}$", format: "%m/%d/%Y" },
    PatternSpec { name: "yyyy-MM-dd", shape: r"^\d{4}-\d{1,2}-\d{1,2}$", format: "%Y-%m-%d" },
    PatternSpec { name: "dd/MM/yyyy", shape: r"^\d{1,2}/\d{1,2}/\d{4}$", format: "%d/%m/%Y" },
    PatternSpec { name: "MM-dd-yyyy", shape: r"^\d{1,2}-\d{1,2}-\d{4}$", format: "%m-%d-%Y" },
    PatternSpec { name: "dd-MM-yyyy", shape: r"^\d{1,2}-\d{1,2}-\d{4}$", format: "%d-%m-%Y" },
    PatternSpec { name: "M/d/yy", shape: r"^\d{1,2}/\d{1,2}/\d{2}$", format: "%m/%d/%y" },
    PatternSpec { name: "yyyy/MM/dd", shape: r"^\d{4}/\d{1,2}/\d{1,2}$", format: "%Y/%m/%d" },
    PatternSpec { name: "dd.MM.yyyy", shape: r"^\d{1,2}\.\d{1,2}\.\d{4}$", format: "%d.%m.%Y" },
    PatternSpec { name: "MM.dd.yyyy", shape: r"^\d{1,2}\.\d{1,2}\.\d{4}$", format: "%m.%d.%Y" },
    PatternSpec { name: "d MMM yyyy", shape: r"^\d{1,2} [A-Za-z]{3} \d{4}$", format: "%d %b %Y" },
    PatternSpec { name: "MMM d, yyyy", shape: r"^[A-Za-z]{3} \d{1,2}, \d{4}$", format: "%b %d, %Y" },
    PatternSpec { name: "MMM d yyyy", shape: r"^[A-Za-z]{3} \d{1,2} \d{4}$", format: "%b %d %Y" },
    PatternSpec { name: "d-MMM-yyyy", shape: r"^\d{1,2}-[A-Za-z]{3}-\d{4}$", format: "%d-%b-%Y" },
    PatternSpec { name: "d-MMM-yy", shape: r"^\d{1,2}-[A-Za-z]{3}-\d{2}$", format: "%d-%b-%y" },
];

static CATALOG_SHAPES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    CATALOG
        .iter()
        .map(|spec| Regex::new(spec.shape).expect("valid regex"))
        .collect()
});

/// Names accepted in `[dates] precedence`, in catalog order.
pub fn catalog_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|spec| spec.name)
}

/// Date-time and long-form layouts tried by the fallback, after the
/// RFC 3339 and RFC 2822 parsers.
const FALLBACK_DATETIMES: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
];

const FALLBACK_DATES: &[&str] = &[
    "%B %d %Y",
    "%B %d, %Y",
    "%d %B, %Y",
    "%d %B %Y",
    "%A, %B %d, %Y",
    "%A %B %d %Y",
    "%A, %d %B %Y",
    "%Y %B %d",
];

// ---------------------------------------------------------------------------
// Pre-normalization
// ---------------------------------------------------------------------------

static MONTHS: phf::Map<&'static str, &'static str> = phf_map! {
    "jan" => "Jan", "january" => "Jan",
    "feb" => "Feb", "february" => "Feb",
    "mar" => "Mar", "march" => "Mar",
    "apr" => "Apr", "april" => "Apr",
    "may" => "May",
    "jun" => "Jun", "june" => "Jun",
    "jul" => "Jul", "july" => "Jul",
    "aug" => "Aug", "august" => "Aug",
    "sep" => "Sep", "sept" => "Sep", "september" => "Sep",
    "oct" => "Oct", "october" => "Oct",
    "nov" => "Nov", "november" => "Nov",
    "dec" => "Dec", "december" => "Dec",
};

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid regex"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+\.?").expect("valid regex"));

/// Canonical text the patterns are matched against.
pub fn prenormalize(text: &str) -> String {
    let collapsed = WHITESPACE_RE.replace_all(text.trim(), " ");
    let no_ordinals = ORDINAL_RE.replace_all(&collapsed, "$1");
    WORD_RE
        .replace_all(&no_ordinals, |caps: &regex::Captures<'_>| {
            let word = &caps[0];
            let key = word.trim_end_matches('.').to_ascii_lowercase();
            match MONTHS.get(key.as_str()) {
                Some(canonical) => (*canonical).to_string(),
                None => word.to_string(),
            }
        })
        .into_owned()
}

// ---------------------------------------------------------------------------
// DateNormalizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("date is empty")]
    Empty,

    #[error("unparseable date {input:?}")]
    Unparseable { input: String },
}

/// How a date was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    /// A named catalog pattern.
    Pattern(&'static str),
    /// The permissive fallback parser.
    Fallback,
}

impl std::fmt::Display for MatchedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchedBy::Pattern(name) => write!(f, "pattern {name}"),
            MatchedBy::Fallback => write!(f, "fallback"),
        }
    }
}

/// A resolved date plus the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMatch {
    pub date: NaiveDate,
    pub matched_by: MatchedBy,
}

impl DateMatch {
    /// Canonical `YYYY-MM-DD` form.
    pub fn iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Copy)]
struct Pattern {
    name: &'static str,
    catalog_index: usize,
    format: &'static str,
}

/// Ordered multi-format date parser.
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    patterns: Vec<Pattern>,
    fallback: bool,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_PRECEDENCE, true).expect("built-in date precedence must be valid")
    }
}

impl DateNormalizer {
    /// Build a normalizer that tries `precedence` top to bottom.
    ///
    /// Every name must come from [`catalog_names`] and appear at most once.
    pub fn new<S: AsRef<str>>(precedence: &[S], fallback: bool) -> Result<Self, ConfigError> {
        if precedence.is_empty() && !fallback {
            return Err(ConfigError::NoDatePatterns);
        }

        let mut patterns: Vec<Pattern> = Vec::with_capacity(precedence.len());
        for name in precedence {
            let name = name.as_ref();
            let (catalog_index, spec) = CATALOG
                .iter()
                .enumerate()
                .find(|(_, spec)| spec.name == name)
                .ok_or_else(|| ConfigError::UnknownDatePattern(name.to_string()))?;
            if patterns.iter().any(|p| p.catalog_index == catalog_index) {
                return Err(ConfigError::DuplicateDatePattern(name.to_string()));
            }
            patterns.push(Pattern {
                name: spec.name,
                catalog_index,
                format: spec.format,
            });
        }

        Ok(Self { patterns, fallback })
    }

    pub fn from_config(config: &DateConfig) -> Result<Self, ConfigError> {
        Self::new(&config.precedence, config.fallback)
    }

    /// Pattern names in the order they are tried.
    pub fn precedence(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.patterns.iter().map(|p| p.name)
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback
    }

    /// Resolve `text` to a calendar date, reporting which rule matched.
    pub fn parse(&self, text: &str) -> Result<DateMatch, DateError> {
        if text.trim().is_empty() {
            return Err(DateError::Empty);
        }

        let canonical = prenormalize(text);

        for pattern in &self.patterns {
            if !CATALOG_SHAPES[pattern.catalog_index].is_match(&canonical) {
                continue;
            }
            if let Some(date) = NaiveDate::parse_from_str(&canonical, pattern.format)
                .ok()
                .filter(has_four_digit_year)
            {
                return Ok(DateMatch {
                    date,
                    matched_by: MatchedBy::Pattern(pattern.name),
                });
            }
        }

        if self.fallback {
            if let Some(date) = fallback_parse(&canonical) {
                return Ok(DateMatch {
                    date,
                    matched_by: MatchedBy::Fallback,
                });
            }
        }

        Err(DateError::Unparseable {
            input: text.to_string(),
        })
    }

    /// Resolve `text` to a calendar date.
    pub fn parse_date(&self, text: &str) -> Result<NaiveDate, DateError> {
        self.parse(text).map(|m| m.date)
    }
}

static DEFAULT_NORMALIZER: LazyLock<DateNormalizer> = LazyLock::new(DateNormalizer::default);

/// Parse `text` with the built-in precedence and fallback enabled.
pub fn parse_flexible_date(text: &str) -> Result<NaiveDate, DateError> {
    DEFAULT_NORMALIZER.parse_date(text)
}

fn has_four_digit_year(date: &NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

fn fallback_parse(text: &str) -> Option<NaiveDate> {
    let from_timestamp = DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .map(|dt| dt.date_naive())
        .ok();

    from_timestamp
        .or_else(|| {
            FALLBACK_DATETIMES
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            FALLBACK_DATES
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
        .filter(has_four_digit_year)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case::us_slash("06/01/2024", ymd(2024, 6, 1), "MM/dd/yyyy")]
    #[case::us_unpadded("6/1/2024", ymd(2024, 6, 1), "MM/dd/yyyy")]
    #[case::iso("2024-06-01", ymd(2024, 6, 1), "yyyy-MM-dd")]
    #[case::day_first_when_month_invalid("25/12/2024", ymd(2024, 12, 25), "dd/MM/yyyy")]
    #[case::us_dash("12-25-2024", ymd(2024, 12, 25), "MM-dd-yyyy")]
    #[case::day_first_dash("25-12-2024", ymd(2024, 12, 25), "dd-MM-yyyy")]
    #[case::two_digit_year("6/1/24", ymd(2024, 6, 1), "M/d/yy")]
    #[case::two_digit_year_last_century("6/1/99", ymd(1999, 6, 1), "M/d/yy")]
    #[case::year_first_slash("2024/06/01", ymd(2024, 6, 1), "yyyy/MM/dd")]
    #[case::dotted("25.12.2024", ymd(2024, 12, 25), "dd.MM.yyyy")]
    #[case::dotted_us_when_day_invalid("12.25.2024", ymd(2024, 12, 25), "MM.dd.yyyy")]
    #[case::day_month_name("5 Jun 2024", ymd(2024, 6, 5), "d MMM yyyy")]
    #[case::month_name_comma("Jun 01, 2024", ymd(2024, 6, 1), "MMM d, yyyy")]
    #[case::medium_date("Jun 1, 2024", ymd(2024, 6, 1), "MMM d, yyyy")]
    #[case::full_month_name("June 1, 2024", ymd(2024, 6, 1), "MMM d, yyyy")]
    #[case::no_comma("Jun 1 2024", ymd(2024, 6, 1), "MMM d yyyy")]
    #[case::excel("5-Jun-2024", ymd(2024, 6, 5), "d-MMM-yyyy")]
    #[case::excel_short("5-Jun-24", ymd(2024, 6, 5), "d-MMM-yy")]
    #[case::ordinal("1st June 2024", ymd(2024, 6, 1), "d MMM yyyy")]
    #[case::sept("Sept 3, 2024", ymd(2024, 9, 3), "MMM d, yyyy")]
    #[case::abbrev_with_period("Sep. 3, 2024", ymd(2024, 9, 3), "MMM d, yyyy")]
    #[case::upper_case("JUN 01, 2024", ymd(2024, 6, 1), "MMM d, yyyy")]
    #[case::padded_whitespace("  06/01/2024 ", ymd(2024, 6, 1), "MM/dd/yyyy")]
    fn resolves_catalog_patterns(
        #[case] input: &str,
        #[case] expected: NaiveDate,
        #[case] pattern: &'static str,
    ) {
        let m = DateNormalizer::default().parse(input).unwrap();
        assert_eq!(m.date, expected);
        assert_eq!(m.matched_by, MatchedBy::Pattern(pattern));
    }

    #[rstest]
    #[case::rfc3339("2024-06-01T10:00:00Z", ymd(2024, 6, 1))]
    #[case::rfc3339_offset("2024-06-01T23:30:00-05:00", ymd(2024, 6, 1))]
    #[case::rfc2822("Sat, 01 Jun 2024 10:00:00 +0000", ymd(2024, 6, 1))]
    #[case::naive_datetime("2024-06-01T10:00:00", ymd(2024, 6, 1))]
    #[case::naive_space("2024-06-01 10:00", ymd(2024, 6, 1))]
    #[case::us_datetime("06/01/2024 10:00", ymd(2024, 6, 1))]
    #[case::us_datetime_12h("06/01/2024 10:00 AM", ymd(2024, 6, 1))]
    #[case::us_datetime_12h_seconds("6/1/2024 3:45:10 pm", ymd(2024, 6, 1))]
    #[case::us_datetime_12h_evening("06/01/2024 11:59 PM", ymd(2024, 6, 1))]
    #[case::day_month_comma("1 June, 2024", ymd(2024, 6, 1))]
    #[case::weekday_long("Saturday, June 1, 2024", ymd(2024, 6, 1))]
    fn resolves_via_fallback(#[case] input: &str, #[case] expected: NaiveDate) {
        let m = DateNormalizer::default().parse(input).unwrap();
        assert_eq!(m.date, expected);
        assert_eq!(m.matched_by, MatchedBy::Fallback);
    }

    #[rstest]
    #[case::feb_31("31/02/2024")]
    #[case::apr_31("04/31/2024")]
    #[case::month_13("13/13/2024")]
    #[case::not_a_leap_year("02/29/2023")]
    #[case::words("next tuesday")]
    #[case::number("45000")]
    #[case::partial("2024-06")]
    #[case::wrong_weekday("Monday, June 1, 2024")]
    fn rejects_invalid_dates(#[case] input: &str) {
        let err = DateNormalizer::default().parse(input).unwrap_err();
        assert_eq!(
            err,
            DateError::Unparseable {
                input: input.to_string()
            }
        );
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn empty_input_fails_immediately(#[case] input: &str) {
        assert_eq!(DateNormalizer::default().parse(input), Err(DateError::Empty));
    }

    #[test]
    fn ambiguous_date_resolves_month_first_every_time() {
        let normalizer = DateNormalizer::default();
        for _ in 0..100 {
            assert_eq!(normalizer.parse_date("01/02/2024"), Ok(ymd(2024, 1, 2)));
        }
        assert_eq!(parse_flexible_date("01/02/2024"), Ok(ymd(2024, 1, 2)));
    }

    #[test]
    fn custom_precedence_changes_ambiguous_resolution() {
        let day_first = DateNormalizer::new(&["dd/MM/yyyy", "MM/dd/yyyy"], false).unwrap();
        assert_eq!(day_first.parse_date("01/02/2024"), Ok(ymd(2024, 2, 1)));
        assert_eq!(day_first.parse_date("12/25/2024"), Ok(ymd(2024, 12, 25)));
    }

    #[test]
    fn disabled_fallback_rejects_timestamps() {
        let strict = DateNormalizer::new(DEFAULT_PRECEDENCE, false).unwrap();
        assert!(matches!(
            strict.parse("2024-06-01T10:00:00Z"),
            Err(DateError::Unparseable { .. })
        ));
    }

    #[test]
    fn unknown_pattern_is_a_config_error() {
        let err = DateNormalizer::new(&["yyyy-MM-dd", "dd/mm/YYYY"], true).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDatePattern(name) if name == "dd/mm/YYYY"));
    }

    #[test]
    fn duplicate_pattern_is_a_config_error() {
        let err = DateNormalizer::new(&["yyyy-MM-dd", "yyyy-MM-dd"], true).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateDatePattern(_)));
    }

    #[test]
    fn no_patterns_without_fallback_is_a_config_error() {
        let empty: &[&str] = &[];
        assert!(matches!(
            DateNormalizer::new(empty, false),
            Err(ConfigError::NoDatePatterns)
        ));
        assert!(DateNormalizer::new(empty, true).is_ok());
    }

    #[test]
    fn default_precedence_covers_whole_catalog() {
        let names: Vec<&str> = catalog_names().collect();
        assert_eq!(names, DEFAULT_PRECEDENCE.to_vec());
    }

    #[test]
    fn prenormalize_canonicalizes_text() {
        assert_eq!(prenormalize("  june   1st,  2024 "), "Jun 1, 2024");
        assert_eq!(prenormalize("SEPTEMBER 22nd 2024"), "Sep 22 2024");
        assert_eq!(prenormalize("2024-06-01T10:00:00Z"), "2024-06-01T10:00:00Z");
        assert_eq!(prenormalize("06/01/2024  10:00 am"), "06/01/2024 10:00 am");
    }

    #[test]
    fn iso_is_zero_padded() {
        let m = DateNormalizer::default().parse("6/1/2024").unwrap();
        assert_eq!(m.iso(), "2024-06-01");
    }
}
