//! Double-entry bookkeeping over a SQLite ledger.
//!
//! [`reports`] turns the transaction ledger into a balance sheet, an income
//! statement and a direct-method cash-flow statement. [`db`] is the ledger
//! store those reports read from.

pub mod db;
pub mod error;
pub mod fmt;
pub mod models;
pub mod reports;
pub mod settings;
