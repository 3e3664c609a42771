use comfy_table::{Cell, Table};

use tally::db::{account_id, add_account, list_accounts};
use tally::error::Result;
use tally::models::AccountType;

use super::open_ledger;

pub fn add(name: &str, account_type: &str, parent: Option<&str>) -> Result<()> {
    let conn = open_ledger()?;
    let account_type: AccountType = account_type.parse()?;
    let parent_id = parent.map(|p| account_id(&conn, p)).transpose()?;
    add_account(&conn, name, account_type, parent_id)?;
    println!("Added {account_type} account: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = open_ledger()?;
    let accounts = list_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Type", "Parent"]);
    for a in &accounts {
        let parent = a
            .parent_id
            .and_then(|pid| accounts.iter().find(|p| p.id == pid))
            .map(|p| p.name.as_str())
            .unwrap_or("");
        table.add_row(vec![
            Cell::new(a.id),
            Cell::new(&a.name),
            Cell::new(a.account_type),
            Cell::new(parent),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
