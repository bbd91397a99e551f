//! Report generation over balance rows.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::{
    BalanceSheetReport, IncomeStatementReport, StatementLine, StatementSection, TrialBalanceLine,
    TrialBalanceReport,
};
use crate::balances::AccountBalanceRow;
use crate::ledger::AccountType;

/// Expense accounts whose code starts with this prefix count as cost of sales.
pub const COST_OF_SALES_PREFIX: &str = "51";

/// Builds financial statements from [`AccountBalanceRow`]s.
///
/// Header rows are skipped; their figures are already the sum of their
/// leaves. Amounts are derived from `debit − credit` so contra accounts
/// (a debit-normal revenue account such as sales returns) reduce their
/// section instead of inflating it.
pub struct ReportService;

impl ReportService {
    /// Trial balance of every leaf with a balance or activity.
    #[must_use]
    pub fn trial_balance(
        rows: &[AccountBalanceRow],
        as_of: NaiveDate,
        currency: &str,
    ) -> TrialBalanceReport {
        let lines: Vec<TrialBalanceLine> = rows
            .iter()
            .filter(|row| !row.is_header && !row.is_zero())
            .map(|row| {
                let net = row.net_debit();
                TrialBalanceLine {
                    account_id: row.account_id,
                    code: row.code.clone(),
                    name: row.name.clone(),
                    account_type: row.account_type,
                    debit: net.max(Decimal::ZERO),
                    credit: (-net).max(Decimal::ZERO),
                }
            })
            .collect();

        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();
        let difference = total_debit - total_credit;

        TrialBalanceReport {
            as_of,
            currency: currency.to_string(),
            lines,
            total_debit,
            total_credit,
            difference,
            is_balanced: difference.is_zero(),
        }
    }

    /// Income statement from rows covering the period.
    ///
    /// Uses the movement inside the window; balances carried in are ignored.
    #[must_use]
    pub fn income_statement(
        rows: &[AccountBalanceRow],
        period_start: Option<NaiveDate>,
        period_end: NaiveDate,
        currency: &str,
    ) -> IncomeStatementReport {
        let mut revenue = StatementSection::default();
        let mut expenses = StatementSection::default();
        let mut cost_of_sales = Decimal::ZERO;

        for row in rows.iter().filter(|row| !row.is_header) {
            let movement = row.total_debit - row.total_credit;
            if movement.is_zero() {
                continue;
            }
            match row.account_type {
                AccountType::Revenue => revenue.push(statement_line(row, -movement)),
                AccountType::Expense => {
                    if row.code.starts_with(COST_OF_SALES_PREFIX) {
                        cost_of_sales += movement;
                    }
                    expenses.push(statement_line(row, movement));
                }
                AccountType::Asset | AccountType::Liability | AccountType::Equity => {}
            }
        }

        let total_revenue = revenue.total;
        let total_expenses = expenses.total;
        let net_income = total_revenue - total_expenses;

        IncomeStatementReport {
            period_start,
            period_end,
            currency: currency.to_string(),
            revenue,
            expenses,
            total_revenue,
            total_expenses,
            cost_of_sales,
            gross_profit: total_revenue - cost_of_sales,
            net_income,
            is_profit: net_income >= Decimal::ZERO,
        }
    }

    /// Balance sheet from cumulative rows.
    ///
    /// Revenue and expense balances that were never closed into equity show
    /// up as current earnings.
    #[must_use]
    pub fn balance_sheet(
        rows: &[AccountBalanceRow],
        as_of: NaiveDate,
        currency: &str,
    ) -> BalanceSheetReport {
        let mut assets = StatementSection::default();
        let mut liabilities = StatementSection::default();
        let mut equity = StatementSection::default();
        let mut current_earnings = Decimal::ZERO;

        for row in rows.iter().filter(|row| !row.is_header) {
            let net = row.net_debit();
            match row.account_type {
                AccountType::Revenue | AccountType::Expense => current_earnings -= net,
                _ if net.is_zero() => {}
                AccountType::Asset => assets.push(statement_line(row, net)),
                AccountType::Liability => liabilities.push(statement_line(row, -net)),
                AccountType::Equity => equity.push(statement_line(row, -net)),
            }
        }

        let total_assets = assets.total;
        let total_liabilities = liabilities.total;
        let total_equity = equity.total + current_earnings;
        let total_liabilities_and_equity = total_liabilities + total_equity;

        BalanceSheetReport {
            as_of,
            currency: currency.to_string(),
            assets,
            liabilities,
            equity,
            current_earnings,
            total_assets,
            total_liabilities,
            total_equity,
            total_liabilities_and_equity,
            is_balanced: total_assets == total_liabilities_and_equity,
        }
    }
}

fn statement_line(row: &AccountBalanceRow, amount: Decimal) -> StatementLine {
    StatementLine {
        account_id: row.account_id,
        code: row.code.clone(),
        name: row.name.clone(),
        amount,
    }
}
