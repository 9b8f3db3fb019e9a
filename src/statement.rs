use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::classify::{Category, Direction};
use crate::date::{StatementDate, DATE_LIKE};
use crate::error::{Error, Result};

/// One row of the ledger. Only built through [`BankTransaction::new`], which refuses
/// non-positive amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankTransaction {
    date: String,
    description: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
    #[serde(rename = "type")]
    direction: Direction,
    category: Category,
}

impl BankTransaction {
    /// `date` is kept as captured. The description is trimmed and its whitespace runs
    /// collapsed to single spaces.
    pub fn new(
        date: &str,
        description: &str,
        amount: Decimal,
        direction: Direction,
        category: Category,
    ) -> Option<Self> {
        if amount <= Decimal::ZERO {
            return None;
        }
        Some(Self {
            date: date.trim().to_owned(),
            description: collapse_whitespace(description),
            amount,
            direction,
            category,
        })
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn normalized_date(&self) -> StatementDate {
        StatementDate::parse(&self.date)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Statement period declared in the header of the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementPeriod {
    pub start: String,
    pub end: String,
}

impl StatementPeriod {
    /// Looks for `Period: 01/03/2025 to 31/03/2025`, `From 1 Mar 2025 - 31 Mar 2025` and
    /// the like.
    pub fn find(text: &str) -> Option<Self> {
        static PERIOD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(&format!(
                r"(?im)\b(?:period|from)\b[^\n]*?(?P<start>{DATE_LIKE})[ \t]*(?:-|–|to|through)[ \t]*(?P<end>{DATE_LIKE})"
            ))
            .expect("regex")
        });

        PERIOD_REGEX.captures(text).map(|groups| Self {
            start: groups["start"].trim().to_owned(),
            end: groups["end"].trim().to_owned(),
        })
    }
}

/// The ledger extracted from one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedStatement {
    transactions: Vec<BankTransaction>,
    #[serde(with = "rust_decimal::serde::float")]
    total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    total_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
    #[serde(skip)]
    pages_scanned: usize,
}

impl ProcessedStatement {
    /// Sorted by date, most recent first.
    pub fn transactions(&self) -> &[BankTransaction] {
        &self.transactions
    }

    pub fn total_income(&self) -> Decimal {
        self.total_income
    }

    pub fn total_expense(&self) -> Decimal {
        self.total_expense
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn start_date(&self) -> Option<&str> {
        self.start_date.as_deref()
    }

    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }

    pub fn pages_scanned(&self) -> usize {
        self.pages_scanned
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Replaces the computed balance with one the caller read off the statement.
    #[must_use]
    pub fn with_statement_balance(self, balance: Decimal) -> Self {
        Self { balance, ..self }
    }

    /// Turns an empty ledger into an error, so that "nothing extracted" can't pass
    /// for a statement without activity.
    pub fn require_transactions(self) -> Result<Self> {
        if self.pages_scanned == 0 {
            Err(Error::NoPages)
        } else if self.is_empty() {
            Err(Error::NoTransactionsFound {
                pages: self.pages_scanned,
            })
        } else {
            Ok(self)
        }
    }
}

/// Collects transactions page by page and keeps the totals up to date as it goes.
#[derive(Debug, Default)]
pub struct StatementAssembler {
    transactions: Vec<BankTransaction>,
    total_income: Decimal,
    total_expense: Decimal,
    pages: usize,
    period: Option<StatementPeriod>,
}

impl StatementAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transaction: BankTransaction) {
        match transaction.direction {
            Direction::Credit => self.total_income += transaction.amount,
            Direction::Debit => self.total_expense += transaction.amount,
        }
        self.transactions.push(transaction);
    }

    /// Adds the transactions of the next page, in extraction order.
    pub fn add_page(&mut self, transactions: impl IntoIterator<Item = BankTransaction>) {
        self.pages += 1;
        for transaction in transactions {
            self.push(transaction);
        }
    }

    pub fn set_period(&mut self, period: Option<StatementPeriod>) {
        self.period = period;
    }

    pub fn total_income(&self) -> Decimal {
        self.total_income
    }

    pub fn total_expense(&self) -> Decimal {
        self.total_expense
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn finish(self) -> ProcessedStatement {
        let Self {
            transactions,
            total_income,
            total_expense,
            pages,
            period,
        } = self;

        let mut keyed: Vec<_> = transactions
            .into_iter()
            .map(|transaction| (transaction.normalized_date().sort_key(), transaction))
            .collect();
        // `sort_by` is stable, rows with the same (or no) date keep their extraction order
        keyed.sort_by(|(a, _), (b, _)| b.cmp(a));
        let transactions: Vec<_> = keyed.into_iter().map(|(_, transaction)| transaction).collect();

        let (start_date, end_date) = period.map_or((None, None), |period| {
            (Some(period.start), Some(period.end))
        });

        info!(
            pages,
            transactions = transactions.len(),
            %total_income,
            %total_expense,
            "assembled statement"
        );

        ProcessedStatement {
            transactions,
            total_income,
            total_expense,
            balance: total_income - total_expense,
            start_date,
            end_date,
            pages_scanned: pages,
        }
    }
}
