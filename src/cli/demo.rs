use chrono::{Datelike, Local, NaiveDate};
use rusqlite::Connection;

use tally::db::{account_id, add_account, post_transaction};
use tally::error::{Result, TallyError};
use tally::models::{AccountType, NewTransaction};

use super::open_ledger;

const CHART: &[(&str, AccountType)] = &[
    ("Cash", AccountType::Asset),
    ("Accounts Receivable", AccountType::Asset),
    ("Accounts Payable", AccountType::Liability),
    ("Owner's Equity", AccountType::Equity),
    ("Revenue", AccountType::Income),
    ("Rent Expense", AccountType::Expense),
];

struct DemoTxn {
    month: u32,
    day: u32,
    debit: &'static str,
    credit: &'static str,
    amount: f64,
    description: &'static str,
}

const POSTINGS: &[DemoTxn] = &[
    DemoTxn {
        month: 1,
        day: 1,
        debit: "Cash",
        credit: "Owner's Equity",
        amount: 5000.00,
        description: "Owner investment",
    },
    DemoTxn {
        month: 1,
        day: 1,
        debit: "Cash",
        credit: "Revenue",
        amount: 1000.00,
        description: "Sale income",
    },
    DemoTxn {
        month: 1,
        day: 2,
        debit: "Rent Expense",
        credit: "Cash",
        amount: 300.00,
        description: "Office rent",
    },
    DemoTxn {
        month: 1,
        day: 14,
        debit: "Accounts Receivable",
        credit: "Revenue",
        amount: 750.00,
        description: "Invoice #1001",
    },
    DemoTxn {
        month: 1,
        day: 28,
        debit: "Cash",
        credit: "Accounts Receivable",
        amount: 750.00,
        description: "Payment on invoice #1001",
    },
    DemoTxn {
        month: 2,
        day: 2,
        debit: "Rent Expense",
        credit: "Accounts Payable",
        amount: 300.00,
        description: "Office rent (on account)",
    },
    DemoTxn {
        month: 2,
        day: 20,
        debit: "Accounts Payable",
        credit: "Cash",
        amount: 300.00,
        description: "Landlord payment",
    },
];

fn seed(conn: &Connection, year: i32) -> Result<usize> {
    for (name, account_type) in CHART {
        add_account(conn, name, *account_type, None)?;
    }
    for t in POSTINGS {
        let date = NaiveDate::from_ymd_opt(year, t.month, t.day)
            .ok_or_else(|| {
                TallyError::Other(format!("Invalid demo date {year}-{}-{}", t.month, t.day))
            })?;
        post_transaction(
            conn,
            &NewTransaction {
                date,
                amount: t.amount,
                debit_account_id: account_id(conn, t.debit)?,
                credit_account_id: account_id(conn, t.credit)?,
                description: Some(t.description.to_string()),
            },
        )?;
    }
    Ok(POSTINGS.len())
}

pub fn run() -> Result<()> {
    let conn = open_ledger()?;
    let existing: i64 = conn.query_row("SELECT count(*) FROM accounts", [], |r| r.get(0))?;
    if existing > 0 {
        println!("Ledger already has accounts; demo data not loaded.");
        return Ok(());
    }

    let year = Local::now().year();
    let count = seed(&conn, year)?;
    println!(
        "Loaded {} demo accounts and {count} transactions for {year}.",
        CHART.len()
    );
    println!("Try: tally report income --year {year}");
    Ok(())
}
