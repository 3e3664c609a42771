use chrono::{Local, NaiveDate};
use colored::Colorize;
use comfy_table::{Cell, Table};
use serde::Serialize;

use tally::error::Result;
use tally::fmt::money;
use tally::reports::{self, BalanceRow, CashFlowLine};
use tally::settings::load_settings;

use super::{open_ledger, resolve_period, PeriodArgs};

fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn add_section(
    table: &mut Table,
    heading: String,
    rows: &[BalanceRow],
    total_label: &str,
    total: f64,
) {
    table.add_row(vec![Cell::new(heading), Cell::new("")]);
    for row in rows {
        table.add_row(vec![
            Cell::new(format!("  {}", row.account_name)),
            Cell::new(money(row.balance)),
        ]);
    }
    table.add_row(vec![Cell::new(total_label.bold()), Cell::new(money(total))]);
    table.add_row(vec![Cell::new(""), Cell::new("")]);
}

pub fn balance_sheet(as_of: Option<NaiveDate>, json: bool) -> Result<()> {
    let conn = open_ledger()?;
    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let sheet = reports::get_balance_sheet(&conn, as_of)?;

    if json {
        return print_json(&sheet);
    }

    let mut table = Table::new();
    table.set_header(vec!["Account", "Balance"]);
    add_section(
        &mut table,
        "ASSETS".green().bold().to_string(),
        &sheet.assets,
        "Total Assets",
        sheet.totals.assets,
    );
    add_section(
        &mut table,
        "LIABILITIES".red().bold().to_string(),
        &sheet.liabilities,
        "Total Liabilities",
        sheet.totals.liabilities,
    );
    add_section(
        &mut table,
        "EQUITY".blue().bold().to_string(),
        &sheet.equity,
        "Total Equity",
        sheet.totals.equity,
    );
    table.add_row(vec![
        Cell::new("Total Liabilities & Equity".bold()),
        Cell::new(money(sheet.totals.liabilities + sheet.totals.equity)),
    ]);

    println!("Balance Sheet as of {as_of}\n{table}");

    if !sheet.is_balanced() {
        eprintln!(
            "{}",
            format!(
                "Warning: assets differ from liabilities + equity by {} \
                 (income and expenses are not closed to equity)",
                money(sheet.imbalance())
            )
            .yellow()
        );
    }
    Ok(())
}

pub fn income(period: &PeriodArgs, json: bool) -> Result<()> {
    let conn = open_ledger()?;
    let (start, end) = resolve_period(period)?;
    let stmt = reports::get_income_statement(&conn, start, end)?;

    if json {
        return print_json(&stmt);
    }

    let mut table = Table::new();
    table.set_header(vec!["Account", "Amount"]);
    add_section(
        &mut table,
        "INCOME".green().bold().to_string(),
        &stmt.income,
        "Total Income",
        stmt.totals.income,
    );
    add_section(
        &mut table,
        "EXPENSES".red().bold().to_string(),
        &stmt.expenses,
        "Total Expenses",
        stmt.totals.expenses,
    );

    let net_label = if stmt.net_income >= 0.0 {
        "NET INCOME".green().bold()
    } else {
        "NET LOSS".red().bold()
    };
    table.add_row(vec![Cell::new(net_label), Cell::new(money(stmt.net_income))]);

    println!("Income Statement {start} to {end}\n{table}");
    Ok(())
}

fn flow_table(lines: &[CashFlowLine]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Counterparty", "Description", "Amount"]);
    for line in lines {
        table.add_row(vec![
            Cell::new(line.date),
            Cell::new(&line.counterparty),
            Cell::new(line.description.as_deref().unwrap_or("")),
            Cell::new(money(line.amount)),
        ]);
    }
    table
}

pub fn cashflow(period: &PeriodArgs, cash_account: Option<String>, json: bool) -> Result<()> {
    let conn = open_ledger()?;
    let (start, end) = resolve_period(period)?;
    let cash_account = cash_account.unwrap_or_else(|| load_settings().cash_account);
    let flow = reports::get_cash_flow_direct(&conn, &cash_account, start, end)?;

    if json {
        return print_json(&flow);
    }

    println!("Cash Flow ({}) {start} to {end}", flow.cash_account);
    if flow.inflows.is_empty() {
        println!("\nNo cash inflows.");
    } else {
        println!("\nInflows\n{}", flow_table(&flow.inflows));
    }
    if flow.outflows.is_empty() {
        println!("\nNo cash outflows.");
    } else {
        println!("\nOutflows\n{}", flow_table(&flow.outflows));
    }

    let mut summary = Table::new();
    summary.add_row(vec![Cell::new("Total Inflows"), Cell::new(money(flow.totals.inflows))]);
    summary.add_row(vec![Cell::new("Total Outflows"), Cell::new(money(flow.totals.outflows))]);
    let net = if flow.net_cash >= 0.0 {
        money(flow.net_cash).green().to_string()
    } else {
        money(flow.net_cash).red().to_string()
    };
    summary.add_row(vec![Cell::new("Net Cash".bold()), Cell::new(net)]);
    println!("\n{summary}");
    Ok(())
}
