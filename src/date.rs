use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

/// `12/03/2025`
pub(crate) const SLASH_DATE: &str = r"\b\d{1,2}/\d{1,2}/\d{4}\b";
/// `12-03-2025`
pub(crate) const DASH_DATE: &str = r"\b\d{1,2}-\d{1,2}-\d{4}\b";
/// Anything that looks like a date: `12 Mar 2025`, `12/03/2025`, `12-03-2025`, but also
/// shapes the normalizer can't order (two-digit years, ISO dates).
pub(crate) const DATE_LIKE: &str = r"\b(?:\d{4}-\d{1,2}-\d{1,2}|\d{1,2}[/-]\d{1,2}[/-](?:\d{4}|\d{2})|\d{1,2}[ \t]+(?i:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*)\.?,?[ \t]+(?:\d{4}|\d{2}))\b";

const DAY_FIELD: &str = "day";
const MONTH_FIELD: &str = "month";
const YEAR_FIELD: &str = "year";

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// A transaction date as far as the normalizer could make sense of it.
///
/// Statement text is noisy, so a token we can't read is kept verbatim rather than
/// failing the document. Code that orders dates has to decide what to do with
/// [`StatementDate::Raw`] explicitly, see [`StatementDate::sort_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatementDate {
    Parsed(NaiveDate),
    Raw(String),
}

impl StatementDate {
    /// Tries the recognized shapes in order: `D Mon YYYY`, `D/M/YYYY`, `D-M-YYYY`.
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        DateShape::ALL
            .iter()
            .find_map(|shape| shape.parse(token))
            .map_or_else(|| Self::Raw(token.to_owned()), Self::Parsed)
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Parsed(date) => Some(*date),
            Self::Raw(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }

    /// Key used to order transactions chronologically.
    ///
    /// A raw token sorts as the oldest possible date: `None` is smaller than any
    /// `Some`, so descending order puts unreadable dates last.
    pub fn sort_key(&self) -> Option<NaiveDate> {
        self.as_date()
    }
}

impl fmt::Display for StatementDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Raw(token) => f.write_str(token),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateShape {
    MonthName,
    Slash,
    Dash,
}

impl DateShape {
    const ALL: [DateShape; 3] = [DateShape::MonthName, DateShape::Slash, DateShape::Dash];

    fn regex(self) -> &'static Regex {
        static MONTH_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(&format!(
                r"^(?P<{DAY_FIELD}>\d{{1,2}})\s+(?P<{MONTH_FIELD}>[A-Za-z]{{3,9}})\.?,?\s+(?P<{YEAR_FIELD}>\d{{4}})$"
            ))
            .expect("regex")
        });
        static SLASH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(&format!(
                r"^(?P<{DAY_FIELD}>\d{{1,2}})/(?P<{MONTH_FIELD}>\d{{1,2}})/(?P<{YEAR_FIELD}>\d{{4}})$"
            ))
            .expect("regex")
        });
        static DASH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(&format!(
                r"^(?P<{DAY_FIELD}>\d{{1,2}})-(?P<{MONTH_FIELD}>\d{{1,2}})-(?P<{YEAR_FIELD}>\d{{4}})$"
            ))
            .expect("regex")
        });

        match self {
            DateShape::MonthName => &*MONTH_NAME_REGEX,
            DateShape::Slash => &*SLASH_REGEX,
            DateShape::Dash => &*DASH_REGEX,
        }
    }

    fn parse(self, token: &str) -> Option<NaiveDate> {
        let groups = self.regex().captures(token)?;
        let day: u32 = integer_field(DAY_FIELD, &groups)?;
        let month = match self {
            DateShape::MonthName => month_from_name(&groups[MONTH_FIELD])?,
            DateShape::Slash | DateShape::Dash => integer_field(MONTH_FIELD, &groups)?,
        };
        let year: i32 = integer_field(YEAR_FIELD, &groups)?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

fn integer_field<T: FromStr>(key: &str, groups: &Captures<'_>) -> Option<T> {
    groups[key].parse().ok()
}

/// Accepts abbreviations (`Mar`, `Sept`) as well as full names, case-insensitively.
fn month_from_name(name: &str) -> Option<u32> {
    let name = name.to_ascii_lowercase();
    if name.len() < 3 {
        return None;
    }
    let name = if name == "sept" { "sep" } else { name.as_str() };
    MONTH_NAMES
        .iter()
        .position(|month| month.starts_with(name))
        .and_then(|index| u32::try_from(index + 1).ok())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn should_parse_month_name_dates() {
        assert_eq!(
            StatementDate::Parsed(date(2025, 3, 12)),
            StatementDate::parse("12 Mar 2025")
        );
        assert_eq!(
            StatementDate::Parsed(date(2024, 9, 1)),
            StatementDate::parse("1 Sept. 2024")
        );
        assert_eq!(
            StatementDate::Parsed(date(2025, 12, 31)),
            StatementDate::parse(" 31 DECEMBER 2025 ")
        );
    }

    #[test]
    fn should_read_numeric_dates_day_first() {
        assert_eq!(
            StatementDate::Parsed(date(2025, 3, 12)),
            StatementDate::parse("12/03/2025")
        );
        assert_eq!(
            StatementDate::Parsed(date(2025, 3, 2)),
            StatementDate::parse("2-3-2025")
        );
    }

    #[test]
    fn should_pass_unknown_shapes_through() {
        assert_eq!(
            StatementDate::Raw("2025-03-12".to_owned()),
            StatementDate::parse("2025-03-12")
        );
        assert_eq!(
            StatementDate::Raw("12 Foo 2025".to_owned()),
            StatementDate::parse("12 Foo 2025")
        );
        assert_eq!(StatementDate::Raw(String::new()), StatementDate::parse(""));
    }

    #[test]
    fn should_pass_impossible_calendar_dates_through() {
        let parsed = StatementDate::parse("31/02/2025");
        assert!(!parsed.is_parsed());
        assert_eq!("31/02/2025", parsed.to_string());
    }

    #[test]
    fn should_display_parsed_dates_in_iso_form() {
        assert_eq!("2025-03-12", StatementDate::parse("12 Mar 2025").to_string());
    }

    #[test]
    fn should_order_raw_tokens_before_any_real_date() {
        let raw = StatementDate::parse("N/A");
        let old = StatementDate::parse("1/1/1970");
        assert!(raw.sort_key() < old.sort_key());
    }

    #[test]
    fn should_match_date_fragments_inside_lines() {
        let date_like = Regex::new(DATE_LIKE).expect("regex");
        assert_eq!(
            Some("12 Mar 2025"),
            date_like.find("on 12 Mar 2025 at POS").map(|m| m.as_str())
        );
        assert_eq!(
            Some("1 Sept. 2024"),
            date_like.find("1 Sept. 2024 ATM").map(|m| m.as_str())
        );
        assert_eq!(
            Some("2025-03-12"),
            date_like.find("value 2025-03-12 ref").map(|m| m.as_str())
        );
        assert_eq!(
            Some("12/03/25"),
            date_like.find("12/03/25 ATM").map(|m| m.as_str())
        );
    }
}
