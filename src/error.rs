use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Pages were scanned but nothing looked like a transaction. Usually an
    /// unsupported statement layout rather than a genuinely empty statement.
    #[error("No transactions found in {pages} statement page(s)")]
    NoTransactionsFound { pages: usize },

    #[error("No statement pages were provided")]
    NoPages,

    #[error("Invalid category rule table: {0}")]
    RuleTable(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
