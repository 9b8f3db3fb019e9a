use std::sync::LazyLock;

use regex::{Captures, Match, Regex};
use tracing::{debug, trace};

use crate::amount::{parse_amount, CURRENCY_CLASS};
use crate::config::ExtractorConfig;
use crate::date::{DASH_DATE, DATE_LIKE, SLASH_DATE};
use crate::section::detect_section;
use crate::statement::{collapse_whitespace, BankTransaction};

const DATE_FIELD: &str = "date";
const DESCRIPTION_FIELD: &str = "description";
const AMOUNT_FIELD: &str = "amount";

/// Lines carrying one of these are headers, running balances or boilerplate.
const FALLBACK_SKIP_MARKERS: [&str; 2] = ["BALANCE", "STATEMENT"];

/// Date, description and amount tokens of a candidate row, as found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMatch {
    pub date: String,
    pub description: String,
    pub amount: String,
}

impl RawMatch {
    pub fn new(date: &str, description: &str, amount: &str) -> Self {
        Self {
            date: date.to_owned(),
            description: description.to_owned(),
            amount: amount.to_owned(),
        }
    }

    fn from_captures(groups: &Captures<'_>) -> Self {
        Self::new(
            &groups[DATE_FIELD],
            &groups[DESCRIPTION_FIELD],
            &groups[AMOUNT_FIELD],
        )
    }

    /// Builds the transaction, or `None` when the amount isn't a positive number or
    /// nothing is left of the description.
    pub fn into_transaction(self, config: &ExtractorConfig) -> Option<BankTransaction> {
        let Some(amount) = parse_amount(&self.amount) else {
            trace!(amount = %self.amount, "discarding candidate with unusable amount");
            return None;
        };
        let description = collapse_whitespace(&self.description);
        if description.is_empty() {
            trace!(date = %self.date, "discarding candidate without description");
            return None;
        }
        BankTransaction::new(
            &self.date,
            &description,
            amount,
            config.direction(&description),
            config.categorize(&description),
        )
    }
}

/// Ways of pulling transactions out of a page, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `<date> <description> <currency symbol><amount>`
    CurrencyTagged,
    /// `<d/m/yyyy> <description> [currency]<amount>`
    SlashDate,
    /// `<d-m-yyyy> <description> [currency]<amount>`
    DashDate,
    /// `<date-like token> <description> <decimal with thousands separators>`
    Generic,
    /// First date and last amount of each line, see [`fallback_matches`].
    LineFallback,
}

impl Strategy {
    /// Whole-text patterns, strictest first. [`Strategy::LineFallback`] only runs when
    /// all of them came up empty.
    pub const PATTERNS: [Strategy; 4] = [
        Strategy::CurrencyTagged,
        Strategy::SlashDate,
        Strategy::DashDate,
        Strategy::Generic,
    ];

    /// Every non-overlapping candidate row in `text`. Pure, nothing is carried over
    /// between calls.
    pub fn find_matches(self, text: &str) -> Vec<RawMatch> {
        match self.regex() {
            Some(regex) => regex
                .captures_iter(text)
                .map(|groups| RawMatch::from_captures(&groups))
                .collect(),
            None => fallback_matches(text, 0),
        }
    }

    fn regex(self) -> Option<&'static Regex> {
        static CURRENCY_TAGGED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(&format!(
                r"(?P<{DATE_FIELD}>{DATE_LIKE})[ \t]+(?P<{DESCRIPTION_FIELD}>[^{CURRENCY_CLASS}\n]+?)[ \t]*(?P<{AMOUNT_FIELD}>[{CURRENCY_CLASS}][ \t]?\d[\d,]*(?:\.\d+)?)"
            ))
            .expect("regex")
        });
        static SLASH_DATE_REGEX: LazyLock<Regex> =
            LazyLock::new(|| dated_amount_regex(SLASH_DATE));
        static DASH_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| dated_amount_regex(DASH_DATE));
        static GENERIC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(&format!(
                r"(?P<{DATE_FIELD}>{DATE_LIKE})[ \t]+(?P<{DESCRIPTION_FIELD}>[^\n]+?)[ \t]+(?P<{AMOUNT_FIELD}>{THOUSANDS_DECIMAL})\b"
            ))
            .expect("regex")
        });

        match self {
            Strategy::CurrencyTagged => Some(&*CURRENCY_TAGGED_REGEX),
            Strategy::SlashDate => Some(&*SLASH_DATE_REGEX),
            Strategy::DashDate => Some(&*DASH_DATE_REGEX),
            Strategy::Generic => Some(&*GENERIC_REGEX),
            Strategy::LineFallback => None,
        }
    }
}

/// `5,000`, `5,000.00`, `1,234.5` or `5000.00`
const THOUSANDS_DECIMAL: &str = r"\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+\.\d+";

fn dated_amount_regex(date: &str) -> Regex {
    Regex::new(&format!(
        r"(?P<{DATE_FIELD}>{date})[ \t]+(?P<{DESCRIPTION_FIELD}>[^\n]+?)[ \t]+(?P<{AMOUNT_FIELD}>[{CURRENCY_CLASS}][ \t]?\d[\d,]*(?:\.\d+)?|\d[\d,]*\.\d\d)\b"
    ))
    .expect("regex")
}

/// What came out of one page, and which strategy produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtraction {
    /// `None` when nothing, not even the fallback, found a transaction
    pub strategy: Option<Strategy>,
    pub transactions: Vec<BankTransaction>,
}

/// Extracts the transactions of one page.
///
/// Patterns are tried in priority order. Each one runs against the detected
/// transaction section first, then against the whole page. The first pattern
/// producing at least one transaction wins and no later pattern is tried. Only when
/// every pattern fails does the line-by-line fallback scan the page.
pub fn extract_page(page: &str, config: &ExtractorConfig) -> PageExtraction {
    let section = detect_section(page);

    for strategy in Strategy::PATTERNS {
        for scope in section.as_deref().into_iter().chain(Some(page)) {
            let transactions = build_transactions(strategy.find_matches(scope), config);
            if !transactions.is_empty() {
                debug!(
                    ?strategy,
                    transactions = transactions.len(),
                    in_section = section.as_deref() == Some(scope),
                    "page matched"
                );
                return PageExtraction {
                    strategy: Some(strategy),
                    transactions,
                };
            }
        }
    }

    let transactions = build_transactions(
        fallback_matches(page, config.min_fallback_line_len),
        config,
    );
    if transactions.is_empty() {
        debug!("no transaction found on page");
        PageExtraction {
            strategy: None,
            transactions,
        }
    } else {
        debug!(
            transactions = transactions.len(),
            "page matched by line fallback"
        );
        PageExtraction {
            strategy: Some(Strategy::LineFallback),
            transactions,
        }
    }
}

fn build_transactions(matches: Vec<RawMatch>, config: &ExtractorConfig) -> Vec<BankTransaction> {
    matches
        .into_iter()
        .filter_map(|raw| raw.into_transaction(config))
        .collect()
}

/// Line-by-line heuristic for pages the patterns can't read.
///
/// For each line at least `min_line_len` long (trimmed) and free of skip markers, the
/// first date-shaped token and the last amount-shaped token are taken. The description
/// is the text between them, or, when the amount comes first, whatever is left once
/// both are removed.
pub fn fallback_matches(text: &str, min_line_len: usize) -> Vec<RawMatch> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.chars().count() >= min_line_len)
        .filter(|line| {
            let upper = line.to_uppercase();
            !FALLBACK_SKIP_MARKERS
                .iter()
                .any(|marker| upper.contains(marker))
        })
        .filter_map(fallback_line)
        .collect()
}

fn fallback_line(line: &str) -> Option<RawMatch> {
    static DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(DATE_LIKE).expect("regex"));
    static AMOUNT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(&format!(
            r"[{CURRENCY_CLASS}][ \t]?\d[\d,]*(?:\.\d+)?|\b(?:{THOUSANDS_DECIMAL})\b"
        ))
        .expect("regex")
    });

    let date = DATE_REGEX.find(line)?;
    let amount = AMOUNT_REGEX
        .find_iter(line)
        .filter(|amount| !overlaps(amount, &date))
        .last()?;

    let description = if date.end() <= amount.start() {
        line[date.end()..amount.start()].to_owned()
    } else {
        format!(
            "{} {} {}",
            &line[..amount.start()],
            &line[amount.end()..date.start()],
            &line[date.end()..]
        )
    };

    Some(RawMatch::new(date.as_str(), &description, amount.as_str()))
}

fn overlaps(a: &Match<'_>, b: &Match<'_>) -> bool {
    a.start() < b.end() && b.start() < a.end()
}
