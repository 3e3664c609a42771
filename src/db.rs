use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, TallyError};
use crate::models::{Account, AccountType, NewTransaction, Transaction};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    type TEXT NOT NULL CHECK (type IN ('Asset','Liability','Equity','Income','Expense')),
    parent_id INTEGER,
    FOREIGN KEY (parent_id) REFERENCES accounts(id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    amount REAL NOT NULL CHECK (amount > 0),
    debit_account_id INTEGER NOT NULL,
    credit_account_id INTEGER NOT NULL,
    description TEXT,
    FOREIGN KEY (debit_account_id) REFERENCES accounts(id),
    FOREIGN KEY (credit_account_id) REFERENCES accounts(id),
    CHECK (debit_account_id != credit_account_id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_debit ON transactions(debit_account_id);
CREATE INDEX IF NOT EXISTS idx_transactions_credit ON transactions(credit_account_id);
";

/// Dates are stored as ISO text and filtered by string comparison, which only
/// follows calendar order for four-digit years.
pub fn is_storable_date(date: NaiveDate) -> bool {
    (0..=9999).contains(&date.year())
}

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn add_account(
    conn: &Connection,
    name: &str,
    account_type: AccountType,
    parent_id: Option<i64>,
) -> Result<i64> {
    if let Some(pid) = parent_id {
        let parent_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1)",
            [pid],
            |row| row.get(0),
        )?;
        if !parent_exists {
            return Err(TallyError::UnknownAccount(format!("parent id {pid}")));
        }
    }

    if find_account_id(conn, name)?.is_some() {
        return Err(TallyError::DuplicateAccount(name.to_string()));
    }

    conn.execute(
        "INSERT INTO accounts (name, type, parent_id) VALUES (?1, ?2, ?3)",
        params![name, account_type, parent_id],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, name, %account_type, "created account");
    Ok(id)
}

/// Exact-name lookup; `None` when no account carries that name.
pub fn find_account_id(conn: &Connection, name: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row("SELECT id FROM accounts WHERE name = ?1", [name], |row| row.get(0))
        .optional()?)
}

pub fn account_id(conn: &Connection, name: &str) -> Result<i64> {
    find_account_id(conn, name)?.ok_or_else(|| TallyError::UnknownAccount(name.to_string()))
}

pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, parent_id FROM accounts ORDER BY type, name",
    )?;
    let accounts = stmt
        .query_map([], |row| {
            Ok(Account {
                id: row.get(0)?,
                name: row.get(1)?,
                account_type: row.get(2)?,
                parent_id: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(accounts)
}

pub fn post_transaction(conn: &Connection, txn: &NewTransaction) -> Result<i64> {
    if !txn.amount.is_finite() || txn.amount <= 0.0 {
        return Err(TallyError::InvalidTransaction(format!(
            "amount must be positive, got {}",
            txn.amount
        )));
    }
    if !is_storable_date(txn.date) {
        return Err(TallyError::InvalidTransaction(format!(
            "date {} is outside 0000-01-01..=9999-12-31",
            txn.date
        )));
    }
    if txn.debit_account_id == txn.credit_account_id {
        return Err(TallyError::InvalidTransaction(
            "debit and credit accounts must differ".to_string(),
        ));
    }
    for id in [txn.debit_account_id, txn.credit_account_id] {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1)",
            [id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(TallyError::UnknownAccount(format!("id {id}")));
        }
    }

    conn.execute(
        "INSERT INTO transactions (date, amount, debit_account_id, credit_account_id, description) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            txn.date,
            txn.amount,
            txn.debit_account_id,
            txn.credit_account_id,
            txn.description
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, date = %txn.date, amount = txn.amount, "posted transaction");
    Ok(id)
}

pub fn get_transaction(conn: &Connection, id: i64) -> Result<Transaction> {
    let txn = conn.query_row(
        "SELECT id, date, amount, debit_account_id, credit_account_id, description \
         FROM transactions WHERE id = ?1",
        [id],
        |row| {
            Ok(Transaction {
                id: row.get(0)?,
                date: row.get(1)?,
                amount: row.get(2)?,
                debit_account_id: row.get(3)?,
                credit_account_id: row.get(4)?,
                description: row.get(5)?,
            })
        },
    )?;
    Ok(txn)
}
