#![warn(clippy::unwrap_used)]
#![doc = include_str!("../README.md")]

pub mod amount;
pub mod classify;
pub mod config;
pub mod date;
pub mod error;
pub mod matcher;
pub mod section;
pub mod statement;

use std::thread;

use tracing::debug;

pub use amount::parse_amount;
pub use classify::{Category, CategoryRule, CategoryRules, Direction, DirectionRules};
pub use config::ExtractorConfig;
pub use date::StatementDate;
pub use error::{Error, Result};
pub use matcher::{PageExtraction, RawMatch, Strategy};
pub use statement::{BankTransaction, ProcessedStatement, StatementAssembler, StatementPeriod};

/// Turns the text of a statement, one string per page, into a [`ProcessedStatement`].
#[derive(Debug, Clone, Default)]
pub struct StatementExtractor {
    config: ExtractorConfig,
}

impl StatementExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract_page(&self, page: &str) -> PageExtraction {
        matcher::extract_page(page, &self.config)
    }

    /// Extracts every page and assembles the ledger.
    ///
    /// Never fails: unreadable rows and pages are skipped. Use
    /// [`ProcessedStatement::require_transactions`] to treat an empty ledger as an error.
    pub fn process<S: AsRef<str> + Sync>(&self, pages: &[S]) -> ProcessedStatement {
        let extractions = self.extract_pages(pages);

        let mut assembler = StatementAssembler::new();
        assembler.set_period(pages.first().and_then(|page| StatementPeriod::find(page.as_ref())));
        for (index, extraction) in extractions.into_iter().enumerate() {
            debug!(
                page = index + 1,
                strategy = ?extraction.strategy,
                transactions = extraction.transactions.len(),
                "page extracted"
            );
            assembler.add_page(extraction.transactions);
        }
        assembler.finish()
    }

    /// Results are in page order whether or not the pages ran in parallel.
    fn extract_pages<S: AsRef<str> + Sync>(&self, pages: &[S]) -> Vec<PageExtraction> {
        if !self.config.parallel_pages || pages.len() < 2 {
            return pages
                .iter()
                .map(|page| self.extract_page(page.as_ref()))
                .collect();
        }

        thread::scope(|scope| {
            let handles: Vec<_> = pages
                .iter()
                .map(|page| scope.spawn(move || self.extract_page(page.as_ref())))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
                })
                .collect()
        })
    }
}

/// [`StatementExtractor::process`] with the default configuration.
pub fn process_pages<S: AsRef<str> + Sync>(pages: &[S]) -> ProcessedStatement {
    StatementExtractor::default().process(pages)
}
