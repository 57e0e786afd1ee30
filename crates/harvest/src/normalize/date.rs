// ABOUTME: Date normalization: label stripping and delimiter probing followed by a parse attempt chain.
// ABOUTME: Output is always the canonical "%b %d, %Y" form (e.g. "Jan 08, 2020") or None.

//! Date normalization.
//!
//! Sites wrap their publication dates in labels ("Published:", "Released:")
//! and surround them with unrelated text ("| Runtime 90 min"). The normalizer
//! walks an ordered rule list. Label and truncation rules accumulate; delimiter
//! rules probe both sides of the delimiter without consuming the text. After
//! every step the candidate is parsed, and the first success is returned in
//! the canonical display format.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical display format for every normalized date.
pub const CANONICAL_DATE_FORMAT: &str = "%b %d, %Y";

/// A single text transform in the date chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRule {
    /// Parse the text as-is.
    Identity,
    /// Remove every occurrence of a label. Accumulates.
    StripLabel(&'static str),
    /// Keep the text left of the first occurrence of a marker. Accumulates.
    Truncate(&'static str),
    /// Try the segment left of the delimiter, then the one right of it.
    /// Does not accumulate.
    Split(&'static str),
}

/// The default rule chain, in application order.
pub const DATE_RULES: &[DateRule] = &[
    DateRule::Identity,
    DateRule::StripLabel("Date Added:"),
    DateRule::StripLabel("Published: "),
    DateRule::StripLabel("PUBLISHED"),
    DateRule::StripLabel("Published"),
    DateRule::StripLabel("Release Date:"),
    DateRule::StripLabel("Date:"),
    DateRule::StripLabel("Released:"),
    DateRule::StripLabel("Added on:"),
    DateRule::StripLabel("Added:"),
    DateRule::StripLabel("Added"),
    DateRule::Truncate("Available"),
    DateRule::Truncate("Runtime"),
    DateRule::Split("|"),
    DateRule::Split("\u{2022}"),
    DateRule::Split(":"),
    DateRule::Split("\u{1F4C5}"),
];

impl DateRule {
    /// Returns (text carried to the next rule, candidates to parse now).
    fn apply(&self, text: &str) -> (String, Vec<String>) {
        match self {
            DateRule::Identity => (text.to_string(), vec![text.to_string()]),
            DateRule::StripLabel(label) => {
                let next = text.replace(label, "");
                (next.clone(), vec![next])
            }
            DateRule::Truncate(marker) => {
                let next = match text.find(marker) {
                    Some(pos) => text[..pos].to_string(),
                    None => text.to_string(),
                };
                (next.clone(), vec![next])
            }
            DateRule::Split(delim) => {
                let mut parts = text.split(delim);
                let candidates = match (parts.next(), parts.next()) {
                    (Some(left), Some(right)) => vec![left.to_string(), right.to_string()],
                    _ => Vec::new(),
                };
                (text.to_string(), candidates)
            }
        }
    }
}

/// Normalizes a raw date string into the canonical format.
///
/// `format` is an explicit strftime-style format supplied by the site
/// configuration; when present it is the only parser used. Returns `None`
/// when no rule/parse combination succeeds.
pub fn normalize_date(raw: &str, format: Option<&str>) -> Option<String> {
    let cleaned = raw.replace(['\n', '\r'], " ");
    let mut current = cleaned.trim().to_string();
    if current.is_empty() {
        return None;
    }

    for rule in DATE_RULES {
        let (next, candidates) = rule.apply(&current);
        for candidate in candidates {
            if let Some(date) = parse_candidate(&candidate, format) {
                return Some(date.format(CANONICAL_DATE_FORMAT).to_string());
            }
        }
        current = next;
    }
    None
}

fn parse_candidate(candidate: &str, format: Option<&str>) -> Option<NaiveDate> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    match format.filter(|f| !f.trim().is_empty()) {
        Some(fmt) => parse_with_format(candidate, fmt),
        None => parse_generic(candidate),
    }
}

/// Parses with an explicit format, accepting date-only or date-time formats.
pub fn parse_with_format(s: &str, fmt: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
        return Some(date);
    }
    NaiveDateTime::parse_from_str(s, fmt)
        .ok()
        .map(|dt| dt.date())
}

static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap());

static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:mon|tue|tues|wed|thu|thur|thurs|fri|sat|sun)(?:day|sday|nesday|urday)?\.?,?\s+")
        .unwrap()
});

/// Drops a leading weekday and day-of-month ordinal suffixes
/// ("Sat, March 3rd" becomes "March 3").
fn prepare(s: &str) -> String {
    let s = WEEKDAY_RE.replace(s.trim(), "");
    ORDINAL_RE.replace_all(&s, "$1").trim().to_string()
}

/// Best-effort generic date parsing.
///
/// Tries common loose patterns first, then falls back to dateparser. Pure
/// digit strings are not handed to dateparser, which would read them as
/// timestamps. A month and day without any year take the current year.
pub fn parse_generic(s: &str) -> Option<NaiveDate> {
    let s = prepare(s);
    if s.is_empty() {
        return None;
    }
    parse_loose(&s)
        .or_else(|| parse_without_year(&s, Utc::now().year()))
        .or_else(|| {
            if s.chars().all(|c| c.is_ascii_digit()) || !has_year(&s) {
                return None;
            }
            dateparser::parse_with_timezone(&s, &Utc)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn parse_loose(s: &str) -> Option<NaiveDate> {
    const FULL_YEAR: &[&str] = &[
        "%b %e, %Y", // Jan 5, 2024
        "%b %d, %Y", // Jan 05, 2024
        "%B %e, %Y", // January 5, 2024
        "%B %d, %Y", // January 05, 2024
        "%e %b %Y",  // 5 Jan 2024
        "%d %b %Y",  // 05 Jan 2024
        "%e %B %Y",  // 5 January 2024
        "%d %B %Y",  // 05 January 2024
        "%b %e %Y",  // Jan 5 2024
        "%B %e %Y",  // January 5 2024
        "%Y-%m-%d",  // 2024-01-05
        "%m/%d/%Y",  // 01/05/2024
        "%d.%m.%Y",  // 05.01.2024
        "%Y/%m/%d",  // 2024/01/05
    ];
    // %y maps 00-68 to 20xx and 69-99 to 19xx.
    const SHORT_YEAR: &[&str] = &[
        "%m/%d/%y", // 01/05/24
        "%d.%m.%y", // 05.01.24
    ];

    // %Y takes any digit count; a two digit year would otherwise land in year 22.
    FULL_YEAR
        .iter()
        .filter_map(|pat| NaiveDate::parse_from_str(s, pat).ok())
        .find(|date| date.year() >= 1000)
        .or_else(|| {
            SHORT_YEAR
                .iter()
                .find_map(|pat| NaiveDate::parse_from_str(s, pat).ok())
        })
}

/// Month and day with no year at all ("Mar 3", "3 March"), read in `year`.
fn parse_without_year(s: &str, year: i32) -> Option<NaiveDate> {
    const NO_YEAR: &[&str] = &["%b %e %Y", "%B %e %Y", "%e %b %Y", "%e %B %Y"];
    if has_year(s) {
        return None;
    }
    let dated = format!("{} {}", s.trim_end_matches(',').trim(), year);
    NO_YEAR
        .iter()
        .find_map(|pat| NaiveDate::parse_from_str(&dated, pat).ok())
}

fn has_year(s: &str) -> bool {
    let mut run = 0;
    for c in s.chars() {
        if c.is_ascii_digit() {
            run += 1;
            if run == 4 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_label_with_runtime_suffix() {
        assert_eq!(
            normalize_date("Published: March 3, 2022 | Runtime 90 min", None),
            Some("Mar 03, 2022".to_string())
        );
    }

    #[test]
    fn plain_dates_in_several_shapes() {
        assert_eq!(normalize_date("January 8, 2020", None), Some("Jan 08, 2020".to_string()));
        assert_eq!(normalize_date("2020-01-08", None), Some("Jan 08, 2020".to_string()));
        assert_eq!(normalize_date("8 Jan 2020", None), Some("Jan 08, 2020".to_string()));
        assert_eq!(normalize_date("  Jan 08, 2020\n", None), Some("Jan 08, 2020".to_string()));
    }

    #[test]
    fn labels_are_stripped() {
        assert_eq!(
            normalize_date("Release Date: 12/25/2021", None),
            Some("Dec 25, 2021".to_string())
        );
        assert_eq!(
            normalize_date("Added on: Feb 2, 2019", None),
            Some("Feb 02, 2019".to_string())
        );
        assert_eq!(
            normalize_date("PUBLISHED 2018-07-04", None),
            Some("Jul 04, 2018".to_string())
        );
    }

    #[test]
    fn right_hand_side_of_delimiter() {
        assert_eq!(
            normalize_date("Jane Doe \u{2022} June 1, 2023", None),
            Some("Jun 01, 2023".to_string())
        );
        assert_eq!(
            normalize_date("\u{1F4C5} 2023-06-01", None),
            Some("Jun 01, 2023".to_string())
        );
        assert_eq!(
            normalize_date("HD 1080p | Oct 9, 2017", None),
            Some("Oct 09, 2017".to_string())
        );
    }

    #[test]
    fn explicit_format_is_used() {
        assert_eq!(
            normalize_date("03.04.2021", Some("%d.%m.%Y")),
            Some("Apr 03, 2021".to_string())
        );
        assert_eq!(
            normalize_date("Date: 2021/04/03", Some("%Y/%m/%d")),
            Some("Apr 03, 2021".to_string())
        );
    }

    #[test]
    fn explicit_format_mismatch_is_absent() {
        assert_eq!(normalize_date("April 3, 2021", Some("%d.%m.%Y")), None);
    }

    #[test]
    fn unparseable_is_absent_not_partial() {
        assert_eq!(normalize_date("Published: soon | Runtime 90 min", None), None);
        assert_eq!(normalize_date("", None), None);
        assert_eq!(normalize_date("1700000000", None), None);
        assert_eq!(normalize_date("12:30", None), None);
    }

    #[test]
    fn two_digit_years_land_in_this_century() {
        assert_eq!(normalize_date("03/03/22", None), Some("Mar 03, 2022".to_string()));
        assert_eq!(
            normalize_date("Published: 3/3/22", None),
            Some("Mar 03, 2022".to_string())
        );
        assert_eq!(normalize_date("03.03.22", None), Some("Mar 03, 2022".to_string()));
        assert_eq!(normalize_date("12/31/99", None), Some("Dec 31, 1999".to_string()));
    }

    #[test]
    fn ordinal_suffixes_are_dropped() {
        assert_eq!(
            normalize_date("Published: March 3rd, 2022", None),
            Some("Mar 03, 2022".to_string())
        );
        assert_eq!(normalize_date("21st June 2020", None), Some("Jun 21, 2020".to_string()));
    }

    #[test]
    fn leading_weekday_is_dropped() {
        assert_eq!(normalize_date("Sat, 05 Mar 2022", None), Some("Mar 05, 2022".to_string()));
        assert_eq!(
            normalize_date("Wednesday, January 8th, 2020", None),
            Some("Jan 08, 2020".to_string())
        );
    }

    #[test]
    fn missing_year_takes_the_current_one() {
        let year = Utc::now().year();
        assert_eq!(normalize_date("Mar 3", None), Some(format!("Mar 03, {year}")));
        assert_eq!(
            parse_without_year("3 March,", 2021),
            NaiveDate::from_ymd_opt(2021, 3, 3)
        );
        assert_eq!(parse_without_year("Feb 29", 2023), None);
        assert_eq!(parse_without_year("Mar 3 2021", 2024), None);
    }

    #[test]
    fn output_always_matches_canonical_format() {
        let inputs = [
            "Date: 2024-02-29",
            "Released: Feb 29, 2024",
            "x | 29 February 2024",
            "nonsense",
            "Runtime 12:00",
        ];
        for input in inputs {
            if let Some(out) = normalize_date(input, None) {
                assert!(
                    NaiveDate::parse_from_str(&out, CANONICAL_DATE_FORMAT).is_ok(),
                    "non-canonical output {out:?} for {input:?}"
                );
            }
        }
    }
}
