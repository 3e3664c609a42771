use chrono::NaiveDate;
use rusqlite::types::ToSql;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::find_account_id;
use crate::error::{Result, TallyError};
use crate::models::AccountType;

/// Balances closer to zero than this are treated as zero and left out of reports.
pub const ZERO_EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Date window
// ---------------------------------------------------------------------------

/// Which transactions a report looks at, by date. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    Through(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

impl DateWindow {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(TallyError::InvalidDateRange { start, end });
        }
        Ok(DateWindow::Between(start, end))
    }

    /// SQL predicate on `t.date`, numbering its placeholders from `first`.
    fn clause(&self, first: usize) -> (String, Vec<NaiveDate>) {
        match *self {
            DateWindow::Through(as_of) => (format!("t.date <= ?{first}"), vec![as_of]),
            DateWindow::Between(start, end) => (
                format!("t.date BETWEEN ?{first} AND ?{}", first + 1),
                vec![start, end],
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Signed balance aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRow {
    pub account_id: i64,
    pub account_name: String,
    pub balance: f64,
}

/// Per-account balances for every account of `account_type` touched inside
/// `window`, signed so that positive means the type's natural side.
/// Accounts that net to zero are omitted. Rows come back ordered by name.
pub fn account_balances(
    conn: &Connection,
    account_type: AccountType,
    window: DateWindow,
) -> Result<Vec<BalanceRow>> {
    let (clause, dates) = window.clause(2);
    let sql = format!(
        "SELECT a.id, a.name, \
         COALESCE(SUM(CASE WHEN t.debit_account_id = a.id \
                      THEN t.amount ELSE 0.0 END), 0.0) AS debits, \
         COALESCE(SUM(CASE WHEN t.credit_account_id = a.id \
                      THEN t.amount ELSE 0.0 END), 0.0) AS credits \
         FROM accounts a \
         JOIN transactions t ON t.debit_account_id = a.id OR t.credit_account_id = a.id \
         WHERE a.type = ?1 AND {clause} \
         GROUP BY a.id, a.name ORDER BY a.name, a.id"
    );

    let mut params: Vec<&dyn ToSql> = vec![&account_type];
    params.extend(dates.iter().map(|d| d as &dyn ToSql));

    let mut stmt = conn.prepare(&sql)?;
    let sums: Vec<(i64, String, f64, f64)> = stmt
        .query_map(params.as_slice(), |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let side = account_type.normal_side();
    let fetched = sums.len();
    let rows: Vec<BalanceRow> = sums
        .into_iter()
        .map(|(account_id, account_name, debits, credits)| BalanceRow {
            account_id,
            account_name,
            balance: side.balance(debits, credits),
        })
        .filter(|row| row.balance.abs() >= ZERO_EPSILON)
        .collect();

    tracing::debug!(
        %account_type,
        ?window,
        fetched,
        zero = fetched - rows.len(),
        "aggregated account balances"
    );
    Ok(rows)
}

fn section_total(rows: &[BalanceRow]) -> f64 {
    rows.iter().map(|r| r.balance).sum()
}

// ---------------------------------------------------------------------------
// Balance sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSheetTotals {
    pub assets: f64,
    pub liabilities: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    pub as_of: NaiveDate,
    pub assets: Vec<BalanceRow>,
    pub liabilities: Vec<BalanceRow>,
    pub equity: Vec<BalanceRow>,
    pub totals: BalanceSheetTotals,
}

impl BalanceSheet {
    /// `assets - (liabilities + equity)`. Non-zero means the ledger is out of
    /// balance at `as_of`, usually because income and expenses are not closed
    /// into equity yet.
    pub fn imbalance(&self) -> f64 {
        self.totals.assets - (self.totals.liabilities + self.totals.equity)
    }

    pub fn is_balanced(&self) -> bool {
        self.imbalance().abs() < ZERO_EPSILON
    }
}

pub fn get_balance_sheet(conn: &Connection, as_of: NaiveDate) -> Result<BalanceSheet> {
    let window = DateWindow::Through(as_of);

    let assets = account_balances(conn, AccountType::Asset, window)?;
    let liabilities = account_balances(conn, AccountType::Liability, window)?;
    let equity = account_balances(conn, AccountType::Equity, window)?;

    let totals = BalanceSheetTotals {
        assets: section_total(&assets),
        liabilities: section_total(&liabilities),
        equity: section_total(&equity),
    };

    Ok(BalanceSheet {
        as_of,
        assets,
        liabilities,
        equity,
        totals,
    })
}

// ---------------------------------------------------------------------------
// Income statement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeStatementTotals {
    pub income: f64,
    /// Positive magnitude of expense balances.
    pub expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub income: Vec<BalanceRow>,
    pub expenses: Vec<BalanceRow>,
    pub totals: IncomeStatementTotals,
    pub net_income: f64,
}

pub fn get_income_statement(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<IncomeStatement> {
    let window = DateWindow::between(start, end)?;

    let income = account_balances(conn, AccountType::Income, window)?;
    let expenses = account_balances(conn, AccountType::Expense, window)?;

    let totals = IncomeStatementTotals {
        income: section_total(&income),
        expenses: section_total(&expenses),
    };
    let net_income = totals.income - totals.expenses;

    Ok(IncomeStatement {
        start,
        end,
        income,
        expenses,
        totals,
        net_income,
    })
}

// ---------------------------------------------------------------------------
// Cash flow (direct method)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowLine {
    pub transaction_id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    /// Name of the account on the other side of the posting.
    pub counterparty: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowTotals {
    pub inflows: f64,
    pub outflows: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowDirect {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub cash_account: String,
    pub inflows: Vec<CashFlowLine>,
    pub outflows: Vec<CashFlowLine>,
    pub totals: CashFlowTotals,
    pub net_cash: f64,
}

/// Cash movements through the account named `cash_account`. Debits to it are
/// inflows, credits are outflows; both lists are ordered by date.
pub fn get_cash_flow_direct(
    conn: &Connection,
    cash_account: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<CashFlowDirect> {
    let window = DateWindow::between(start, end)?;
    let cash_id = find_account_id(conn, cash_account)?
        .ok_or_else(|| TallyError::CashAccountNotFound(cash_account.to_string()))?;

    let (clause, dates) = window.clause(2);
    let sql = format!(
        "SELECT t.id, t.date, t.amount, t.description, t.debit_account_id, d.name, c.name \
         FROM transactions t \
         JOIN accounts d ON d.id = t.debit_account_id \
         JOIN accounts c ON c.id = t.credit_account_id \
         WHERE (t.debit_account_id = ?1 OR t.credit_account_id = ?1) AND {clause} \
         ORDER BY t.date, t.id"
    );
    let mut params: Vec<&dyn ToSql> = vec![&cash_id];
    params.extend(dates.iter().map(|d| d as &dyn ToSql));

    let mut stmt = conn.prepare(&sql)?;
    let raw: Vec<(i64, NaiveDate, f64, Option<String>, i64, String, String)> = stmt
        .query_map(params.as_slice(), |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
                row.get(6)?,
            ))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut inflows = Vec::new();
    let mut outflows = Vec::new();
    for (transaction_id, date, amount, description, debit_id, debit_name, credit_name) in raw {
        if debit_id == cash_id {
            inflows.push(CashFlowLine {
                transaction_id,
                date,
                amount,
                counterparty: credit_name,
                description,
            });
        } else {
            outflows.push(CashFlowLine {
                transaction_id,
                date,
                amount,
                counterparty: debit_name,
                description,
            });
        }
    }

    let totals = CashFlowTotals {
        inflows: inflows.iter().map(|l| l.amount).sum(),
        outflows: outflows.iter().map(|l| l.amount).sum(),
    };
    let net_cash = totals.inflows - totals.outflows;

    tracing::debug!(
        cash_account,
        inflows = inflows.len(),
        outflows = outflows.len(),
        "collected cash movements"
    );

    Ok(CashFlowDirect {
        start,
        end,
        cash_account: cash_account.to_string(),
        inflows,
        outflows,
        totals,
        net_cash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{add_account, get_connection, init_db, post_transaction};
    use crate::models::NewTransaction;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn post(conn: &Connection, date: &str, amount: f64, debit: i64, credit: i64) -> i64 {
        post_transaction(
            conn,
            &NewTransaction {
                date: d(date),
                amount,
                debit_account_id: debit,
                credit_account_id: credit,
                description: None,
            },
        )
        .unwrap()
    }

    struct Books {
        cash: i64,
        inventory: i64,
        payable: i64,
        retained: i64,
        cogs: i64,
    }

    /// Cash 1000/200, Inventory 500/100, Accounts Payable 0/300,
    /// Retained Earnings 0/1000 (debits/credits).
    fn seed_balance_sheet(conn: &Connection) -> Books {
        let books = Books {
            cash: add_account(conn, "Cash", AccountType::Asset, None).unwrap(),
            inventory: add_account(conn, "Inventory", AccountType::Asset, None).unwrap(),
            payable: add_account(conn, "Accounts Payable", AccountType::Liability, None).unwrap(),
            retained: add_account(conn, "Retained Earnings", AccountType::Equity, None).unwrap(),
            cogs: add_account(conn, "Cost of Goods Sold", AccountType::Expense, None).unwrap(),
        };
        post(conn, "2025-01-05", 1000.0, books.cash, books.retained);
        post(conn, "2025-02-10", 300.0, books.inventory, books.payable);
        post(conn, "2025-03-15", 200.0, books.inventory, books.cash);
        post(conn, "2025-04-20", 100.0, books.cogs, books.inventory);
        books
    }

    fn row<'a>(rows: &'a [BalanceRow], name: &str) -> &'a BalanceRow {
        rows.iter()
            .find(|r| r.account_name == name)
            .unwrap_or_else(|| panic!("no row for {name}"))
    }

    #[test]
    fn test_balance_sheet_sections_and_totals() {
        let (_dir, conn) = test_db();
        let books = seed_balance_sheet(&conn);
        let sheet = get_balance_sheet(&conn, d("2025-12-31")).unwrap();

        assert_eq!(row(&sheet.assets, "Cash").account_id, books.cash);
        assert_eq!(row(&sheet.assets, "Inventory").account_id, books.inventory);
        assert_eq!(row(&sheet.liabilities, "Accounts Payable").account_id, books.payable);
        assert_eq!(row(&sheet.equity, "Retained Earnings").account_id, books.retained);

        assert_eq!(row(&sheet.assets, "Cash").balance, 800.0);
        assert_eq!(row(&sheet.assets, "Inventory").balance, 400.0);
        assert_eq!(row(&sheet.liabilities, "Accounts Payable").balance, 300.0);
        assert_eq!(row(&sheet.equity, "Retained Earnings").balance, 1000.0);

        assert_eq!(sheet.totals.assets, 1200.0);
        assert_eq!(sheet.totals.liabilities, 300.0);
        assert_eq!(sheet.totals.equity, 1000.0);
    }

    #[test]
    fn test_balance_sheet_tolerates_imbalance() {
        let (_dir, conn) = test_db();
        seed_balance_sheet(&conn);
        let sheet = get_balance_sheet(&conn, d("2025-12-31")).unwrap();
        // The unclosed 100 of cost of goods sold shows up as a gap.
        assert_eq!(sheet.imbalance(), -100.0);
        assert!(!sheet.is_balanced());
    }

    #[test]
    fn test_balance_sheet_respects_as_of() {
        let (_dir, conn) = test_db();
        seed_balance_sheet(&conn);
        let sheet = get_balance_sheet(&conn, d("2025-02-10")).unwrap();
        assert_eq!(sheet.totals.assets, 1300.0);
        assert_eq!(sheet.totals.liabilities, 300.0);
        assert!(sheet.is_balanced());

        let empty = get_balance_sheet(&conn, d("2024-12-31")).unwrap();
        assert!(empty.assets.is_empty());
        assert_eq!(empty.totals.assets, 0.0);
    }

    #[test]
    fn test_balance_sheet_excludes_income_and_expense_accounts() {
        let (_dir, conn) = test_db();
        let books = seed_balance_sheet(&conn);
        let sheet = get_balance_sheet(&conn, d("2025-12-31")).unwrap();
        let ids: Vec<i64> = sheet
            .assets
            .iter()
            .chain(&sheet.liabilities)
            .chain(&sheet.equity)
            .map(|r| r.account_id)
            .collect();
        assert!(!ids.contains(&books.cogs));
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len(), "account listed in two sections");
    }

    #[test]
    fn test_zero_balance_accounts_are_omitted() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let clearing = add_account(&conn, "Clearing", AccountType::Asset, None).unwrap();
        let equity = add_account(&conn, "Owner's Equity", AccountType::Equity, None).unwrap();
        post(&conn, "2025-01-01", 250.0, clearing, equity);
        post(&conn, "2025-01-02", 250.0, cash, clearing);

        let sheet = get_balance_sheet(&conn, d("2025-12-31")).unwrap();
        assert_eq!(sheet.assets.len(), 1);
        assert_eq!(sheet.assets[0].account_id, cash);
        assert!(sheet.assets.iter().all(|r| r.balance.abs() >= ZERO_EPSILON));
    }

    #[test]
    fn test_near_zero_float_residue_is_omitted() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let equity = add_account(&conn, "Owner's Equity", AccountType::Equity, None).unwrap();
        post(&conn, "2025-01-01", 0.1, cash, equity);
        post(&conn, "2025-01-01", 0.2, cash, equity);
        post(&conn, "2025-01-02", 0.3, equity, cash);

        let sheet = get_balance_sheet(&conn, d("2025-12-31")).unwrap();
        assert!(sheet.assets.is_empty());
        assert!(sheet.equity.is_empty());
    }

    #[test]
    fn test_contra_balances_keep_their_sign() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let loan = add_account(&conn, "Bank Loan", AccountType::Liability, None).unwrap();
        // Overpaying a liability leaves it with a debit balance.
        post(&conn, "2025-01-01", 50.0, loan, cash);
        let sheet = get_balance_sheet(&conn, d("2025-12-31")).unwrap();
        assert_eq!(row(&sheet.assets, "Cash").balance, -50.0);
        assert_eq!(row(&sheet.liabilities, "Bank Loan").balance, -50.0);
    }

    #[test]
    fn test_income_statement_single_sale() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let sales = add_account(&conn, "Sales Revenue", AccountType::Income, None).unwrap();
        post(&conn, "2025-06-01", 500.0, cash, sales);

        let stmt = get_income_statement(&conn, d("2025-01-01"), d("2025-12-31")).unwrap();
        assert_eq!(
            stmt.income,
            vec![BalanceRow {
                account_id: sales,
                account_name: "Sales Revenue".to_string(),
                balance: 500.0,
            }]
        );
        assert!(stmt.expenses.is_empty());
        assert_eq!(stmt.totals.income, 500.0);
        assert_eq!(stmt.totals.expenses, 0.0);
        assert_eq!(stmt.net_income, 500.0);
    }

    #[test]
    fn test_income_statement_expenses_are_positive() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let revenue = add_account(&conn, "Revenue", AccountType::Income, None).unwrap();
        let rent = add_account(&conn, "Rent Expense", AccountType::Expense, None).unwrap();
        post(&conn, "2025-01-01", 1000.0, cash, revenue);
        post(&conn, "2025-01-02", 300.0, rent, cash);

        let stmt = get_income_statement(&conn, d("2025-01-01"), d("2025-01-31")).unwrap();
        assert_eq!(row(&stmt.expenses, "Rent Expense").balance, 300.0);
        assert_eq!(stmt.totals.expenses, 300.0);
        assert_eq!(stmt.net_income, 700.0);
        assert_eq!(stmt.net_income, stmt.totals.income - stmt.totals.expenses);
    }

    #[test]
    fn test_income_statement_range_is_inclusive() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let sales = add_account(&conn, "Sales Revenue", AccountType::Income, None).unwrap();
        post(&conn, "2024-12-31", 1.0, cash, sales);
        post(&conn, "2025-01-01", 10.0, cash, sales);
        post(&conn, "2025-03-31", 100.0, cash, sales);
        post(&conn, "2025-04-01", 1000.0, cash, sales);

        let stmt = get_income_statement(&conn, d("2025-01-01"), d("2025-03-31")).unwrap();
        assert_eq!(stmt.totals.income, 110.0);
    }

    #[test]
    fn test_income_statement_rejects_inverted_range() {
        let (_dir, conn) = test_db();
        let err = get_income_statement(&conn, d("2025-12-31"), d("2025-01-01")).unwrap_err();
        assert!(matches!(err, TallyError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_single_day_range() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let sales = add_account(&conn, "Sales Revenue", AccountType::Income, None).unwrap();
        post(&conn, "2025-06-01", 75.0, cash, sales);
        let stmt = get_income_statement(&conn, d("2025-06-01"), d("2025-06-01")).unwrap();
        assert_eq!(stmt.totals.income, 75.0);
    }

    #[test]
    fn test_section_totals_equal_row_sums() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let revenue = add_account(&conn, "Revenue", AccountType::Income, None).unwrap();
        let fees = add_account(&conn, "Fees", AccountType::Income, None).unwrap();
        let rent = add_account(&conn, "Rent Expense", AccountType::Expense, None).unwrap();
        let power = add_account(&conn, "Utilities", AccountType::Expense, None).unwrap();
        post(&conn, "2025-01-03", 1234.56, cash, revenue);
        post(&conn, "2025-01-04", 0.1, cash, fees);
        post(&conn, "2025-01-05", 0.2, cash, fees);
        post(&conn, "2025-01-06", 333.33, rent, cash);
        post(&conn, "2025-01-07", 45.67, power, cash);

        let stmt = get_income_statement(&conn, d("2025-01-01"), d("2025-12-31")).unwrap();
        let income: f64 = stmt.income.iter().map(|r| r.balance).sum();
        let expenses: f64 = stmt.expenses.iter().map(|r| r.balance).sum();
        assert_eq!(stmt.totals.income, income);
        assert_eq!(stmt.totals.expenses, expenses);
        assert_eq!(stmt.net_income, income - expenses);
    }

    #[test]
    fn test_cash_flow_direct_lines() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let revenue = add_account(&conn, "Revenue", AccountType::Income, None).unwrap();
        let rent = add_account(&conn, "Rent Expense", AccountType::Expense, None).unwrap();
        let receivable =
            add_account(&conn, "Accounts Receivable", AccountType::Asset, None).unwrap();
        post(&conn, "2025-01-20", 300.0, rent, cash);
        post(&conn, "2025-01-01", 1000.0, cash, revenue);
        post(&conn, "2025-01-10", 400.0, receivable, revenue);
        post(&conn, "2025-01-15", 400.0, cash, receivable);

        let flow = get_cash_flow_direct(&conn, "Cash", d("2025-01-01"), d("2025-01-31")).unwrap();
        assert_eq!(flow.cash_account, "Cash");

        let inflow_dates: Vec<NaiveDate> = flow.inflows.iter().map(|l| l.date).collect();
        assert_eq!(inflow_dates, vec![d("2025-01-01"), d("2025-01-15")]);
        assert_eq!(flow.inflows[0].counterparty, "Revenue");
        assert_eq!(flow.inflows[1].counterparty, "Accounts Receivable");

        assert_eq!(flow.outflows.len(), 1);
        assert_eq!(flow.outflows[0].counterparty, "Rent Expense");
        assert_eq!(flow.outflows[0].amount, 300.0);

        assert_eq!(flow.totals.inflows, 1400.0);
        assert_eq!(flow.totals.outflows, 300.0);
        assert_eq!(flow.net_cash, 1100.0);
    }

    #[test]
    fn test_cash_flow_lines_touch_cash_on_the_right_side() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let revenue = add_account(&conn, "Revenue", AccountType::Income, None).unwrap();
        let rent = add_account(&conn, "Rent Expense", AccountType::Expense, None).unwrap();
        post(&conn, "2025-02-01", 900.0, cash, revenue);
        post(&conn, "2025-02-02", 250.0, rent, cash);
        post(&conn, "2025-02-03", 80.0, rent, revenue);

        let flow = get_cash_flow_direct(&conn, "Cash", d("2025-02-01"), d("2025-02-28")).unwrap();
        let sides = |id: i64| -> (i64, i64) {
            conn.query_row(
                "SELECT debit_account_id, credit_account_id FROM transactions WHERE id = ?1",
                [id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap()
        };
        for line in &flow.inflows {
            assert_eq!(sides(line.transaction_id).0, cash);
        }
        for line in &flow.outflows {
            assert_eq!(sides(line.transaction_id).1, cash);
        }
        assert_eq!(flow.inflows.len() + flow.outflows.len(), 2);
        assert_eq!(flow.net_cash, flow.totals.inflows - flow.totals.outflows);
    }

    #[test]
    fn test_cash_flow_range_is_inclusive() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let revenue = add_account(&conn, "Revenue", AccountType::Income, None).unwrap();
        post(&conn, "2025-02-28", 1.0, cash, revenue);
        post(&conn, "2025-03-01", 10.0, cash, revenue);
        post(&conn, "2025-03-31", 100.0, cash, revenue);
        post(&conn, "2025-04-01", 1000.0, cash, revenue);

        let flow = get_cash_flow_direct(&conn, "Cash", d("2025-03-01"), d("2025-03-31")).unwrap();
        assert_eq!(flow.totals.inflows, 110.0);
    }

    #[test]
    fn test_cash_flow_uses_configured_name() {
        let (_dir, conn) = test_db();
        let bank = add_account(&conn, "Operating Account", AccountType::Asset, None).unwrap();
        let revenue = add_account(&conn, "Revenue", AccountType::Income, None).unwrap();
        post(&conn, "2025-05-05", 42.0, bank, revenue);

        let flow =
            get_cash_flow_direct(&conn, "Operating Account", d("2025-01-01"), d("2025-12-31"))
                .unwrap();
        assert_eq!(flow.net_cash, 42.0);
    }

    #[test]
    fn test_cash_flow_missing_cash_account() {
        let (_dir, conn) = test_db();
        add_account(&conn, "Bank", AccountType::Asset, None).unwrap();
        let err =
            get_cash_flow_direct(&conn, "Cash", d("2025-01-01"), d("2025-12-31")).unwrap_err();
        assert!(matches!(err, TallyError::CashAccountNotFound(ref n) if n == "Cash"));
        assert_eq!(err.to_string(), "Cash account not found: Cash");
    }

    #[test]
    fn test_reports_are_idempotent() {
        let (_dir, conn) = test_db();
        seed_balance_sheet(&conn);

        let a = get_balance_sheet(&conn, d("2025-12-31")).unwrap();
        let b = get_balance_sheet(&conn, d("2025-12-31")).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());

        let a = get_income_statement(&conn, d("2025-01-01"), d("2025-12-31")).unwrap();
        let b = get_income_statement(&conn, d("2025-01-01"), d("2025-12-31")).unwrap();
        assert_eq!(a, b);

        let a = get_cash_flow_direct(&conn, "Cash", d("2025-01-01"), d("2025-12-31")).unwrap();
        let b = get_cash_flow_direct(&conn, "Cash", d("2025-01-01"), d("2025-12-31")).unwrap();
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }

    #[test]
    fn test_storage_errors_propagate() {
        let (_dir, conn) = test_db();
        add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        conn.execute_batch("DROP TABLE transactions").unwrap();

        let err = get_balance_sheet(&conn, d("2025-12-31")).unwrap_err();
        assert!(matches!(err, TallyError::Db(_)));
        let err = get_income_statement(&conn, d("2025-01-01"), d("2025-12-31")).unwrap_err();
        assert!(matches!(err, TallyError::Db(_)));
        let err =
            get_cash_flow_direct(&conn, "Cash", d("2025-01-01"), d("2025-12-31")).unwrap_err();
        assert!(matches!(err, TallyError::Db(_)));
    }

    #[test]
    fn test_last_storable_date_sorts_after_earlier_years() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let equity = add_account(&conn, "Owner's Equity", AccountType::Equity, None).unwrap();
        post(&conn, "2025-06-01", 100.0, cash, equity);
        post(&conn, "9999-12-31", 7.0, cash, equity);

        let sheet = get_balance_sheet(&conn, d("2025-12-31")).unwrap();
        assert_eq!(sheet.totals.assets, 100.0);
        let sheet = get_balance_sheet(&conn, d("9999-12-31")).unwrap();
        assert_eq!(sheet.totals.assets, 107.0);
    }

    #[test]
    fn test_report_json_shape() {
        let (_dir, conn) = test_db();
        let cash = add_account(&conn, "Cash", AccountType::Asset, None).unwrap();
        let sales = add_account(&conn, "Sales Revenue", AccountType::Income, None).unwrap();
        post(&conn, "2025-06-01", 500.0, cash, sales);

        let stmt = get_income_statement(&conn, d("2025-01-01"), d("2025-12-31")).unwrap();
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["netIncome"], 500.0);
        assert_eq!(json["income"][0]["accountName"], "Sales Revenue");
        assert_eq!(json["start"], "2025-01-01");
    }
}
