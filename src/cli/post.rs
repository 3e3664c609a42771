use chrono::NaiveDate;

use tally::db::{account_id, get_transaction, post_transaction};
use tally::error::Result;
use tally::fmt::money;
use tally::models::NewTransaction;

use super::open_ledger;

pub fn run(
    date: NaiveDate,
    amount: f64,
    debit: &str,
    credit: &str,
    description: Option<String>,
) -> Result<()> {
    let conn = open_ledger()?;
    let txn = NewTransaction {
        date,
        amount,
        debit_account_id: account_id(&conn, debit)?,
        credit_account_id: account_id(&conn, credit)?,
        description,
    };
    let id = post_transaction(&conn, &txn)?;
    let posted = get_transaction(&conn, id)?;
    println!(
        "Posted #{id} on {}: {} Dr {debit} / Cr {credit}",
        posted.date,
        money(posted.amount)
    );
    Ok(())
}
