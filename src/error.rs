use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured cash account name does not resolve to any account.
    #[error("Cash account not found: {0}")]
    CashAccountNotFound(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("An account named {0} already exists")]
    DuplicateAccount(String),

    #[error("Invalid account type: {0}. Must be one of: Asset, Liability, Equity, Income, Expense")]
    InvalidAccountType(String),

    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
