pub mod accounts;
pub mod demo;
pub mod init;
pub mod post;
pub mod report;

use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use rusqlite::Connection;

use tally::db::get_connection;
use tally::error::{Result, TallyError};
use tally::settings::db_path;

#[derive(Parser)]
#[command(name = "tally", about = "Double-entry bookkeeping with financial statements.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the ledger database.
    Init {
        /// Path for ledger data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Account the cash-flow report is built from (default: Cash)
        #[arg(long = "cash-account")]
        cash_account: Option<String>,
    },
    /// Manage the chart of accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Record a transaction debiting one account and crediting another.
    Post {
        /// Transaction date: YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Positive amount
        #[arg(long)]
        amount: f64,
        /// Name of the account to debit
        #[arg(long)]
        debit: String,
        /// Name of the account to credit
        #[arg(long)]
        credit: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Load a sample chart of accounts and postings.
    Demo,
    /// Generate financial statements.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a new account.
    Add {
        /// Unique account name, e.g. 'Accounts Receivable'
        name: String,
        /// Account type: Asset, Liability, Equity, Income, Expense
        #[arg(long = "type")]
        account_type: String,
        /// Name of the parent account
        #[arg(long)]
        parent: Option<String>,
    },
    /// List all accounts.
    List,
}

/// Reporting period flags shared by the range-based reports.
#[derive(Args, Debug, Default)]
pub struct PeriodArgs {
    /// Month: YYYY-MM
    #[arg(long)]
    pub month: Option<String>,
    #[arg(long)]
    pub year: Option<i32>,
    /// First day of the period: YYYY-MM-DD (requires --to)
    #[arg(long = "from")]
    pub from_date: Option<NaiveDate>,
    /// Last day of the period: YYYY-MM-DD (requires --from)
    #[arg(long = "to")]
    pub to_date: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Balance sheet as of a date.
    BalanceSheet {
        /// Include transactions up to and including this date (default: today)
        #[arg(long = "as-of")]
        as_of: Option<NaiveDate>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Income statement for a period.
    Income {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long)]
        json: bool,
    },
    /// Direct-method cash-flow statement for a period.
    Cashflow {
        #[command(flatten)]
        period: PeriodArgs,
        /// Cash account name (default: from settings)
        #[arg(long = "cash-account")]
        cash_account: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

pub(crate) fn open_ledger() -> Result<Connection> {
    let path = db_path();
    if !path.exists() {
        return Err(TallyError::Other(
            "No database found. Run `tally init` first.".to_string(),
        ));
    }
    get_connection(&path)
}

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

/// Turn period flags into an inclusive date range. An explicit --from/--to
/// pair wins, then --month, then --year; with nothing given the current
/// calendar year is used.
pub(crate) fn resolve_period(period: &PeriodArgs) -> Result<(NaiveDate, NaiveDate)> {
    match (period.from_date, period.to_date) {
        (Some(from), Some(to)) => return Ok((from, to)),
        (Some(_), None) => {
            return Err(TallyError::Other(
                "--from requires --to (both date boundaries must be specified)".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(TallyError::Other(
                "--to requires --from (both date boundaries must be specified)".to_string(),
            ));
        }
        (None, None) => {}
    }

    if let Some(m) = &period.month {
        let parsed = m
            .split_once('-')
            .and_then(|(y, mm)| Some((y.parse::<i32>().ok()?, mm.parse::<u32>().ok()?)))
            .and_then(|(y, mm)| month_bounds(y, mm));
        return parsed
            .ok_or_else(|| TallyError::Other(format!("Invalid month: {m} (expected YYYY-MM)")));
    }

    let year = period.year.unwrap_or_else(|| Local::now().year());
    year_bounds(year).ok_or_else(|| TallyError::Other(format!("Invalid year: {year}")))
}
