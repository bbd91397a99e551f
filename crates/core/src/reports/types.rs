//! Report data types.

use chrono::NaiveDate;
use ledgerline_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::AccountType;

/// One account on a trial balance. Exactly one column is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Debit column.
    pub debit: Decimal,
    /// Credit column.
    pub credit: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Currency label.
    pub currency: String,
    /// Leaf accounts with a balance or activity, ordered by code.
    pub lines: Vec<TrialBalanceLine>,
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// `total_debit − total_credit`.
    pub difference: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// An account amount on a statement, signed in the section's direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Amount. Contra accounts show negative.
    pub amount: Decimal,
}

/// A titled group of statement lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSection {
    /// Lines ordered by code.
    pub lines: Vec<StatementLine>,
    /// Sum of the lines.
    pub total: Decimal,
}

impl StatementSection {
    pub(crate) fn push(&mut self, line: StatementLine) {
        self.total += line.amount;
        self.lines.push(line);
    }
}

/// Income statement report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Period start, unbounded when `None`.
    pub period_start: Option<NaiveDate>,
    /// Period end.
    pub period_end: NaiveDate,
    /// Currency label.
    pub currency: String,
    /// Revenue section.
    pub revenue: StatementSection,
    /// Expense section.
    pub expenses: StatementSection,
    /// Revenue total.
    pub total_revenue: Decimal,
    /// Expense total.
    pub total_expenses: Decimal,
    /// Part of the expenses booked as cost of sales.
    pub cost_of_sales: Decimal,
    /// `total_revenue − cost_of_sales`.
    pub gross_profit: Decimal,
    /// `total_revenue − total_expenses`.
    pub net_income: Decimal,
    /// Whether net income is zero or positive.
    pub is_profit: bool,
}

/// Balance sheet report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Currency label.
    pub currency: String,
    /// Assets section.
    pub assets: StatementSection,
    /// Liabilities section.
    pub liabilities: StatementSection,
    /// Equity section, without current earnings.
    pub equity: StatementSection,
    /// Revenue minus expenses not yet closed into equity.
    pub current_earnings: Decimal,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Equity including current earnings.
    pub total_equity: Decimal,
    /// Liabilities plus equity.
    pub total_liabilities_and_equity: Decimal,
    /// Whether assets equal liabilities plus equity.
    pub is_balanced: bool,
}

/// Headline ratios. `None` where the denominator is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialRatios {
    /// Assets over liabilities.
    pub current_ratio: Option<Decimal>,
    /// Liabilities over assets.
    pub debt_ratio: Option<Decimal>,
    /// Net income over revenue, percent.
    pub net_profit_margin: Option<Decimal>,
    /// Gross profit over revenue, percent.
    pub gross_profit_margin: Option<Decimal>,
    /// Net income over equity, percent.
    pub return_on_equity: Option<Decimal>,
}

/// Direction of a metric between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Grew by more than the threshold.
    Up,
    /// Shrank by more than the threshold.
    Down,
    /// Moved by the threshold or less.
    Stable,
}

/// One metric compared across two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricComparison {
    /// Current value.
    pub current: Decimal,
    /// Previous value.
    pub previous: Decimal,
    /// `current − previous`.
    pub change: Decimal,
    /// Change relative to `previous`, percent. `None` when `previous` is zero.
    pub change_percent: Option<Decimal>,
    /// Direction.
    pub trend: Trend,
}

/// Income statement metrics compared across two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodComparison {
    /// Revenue.
    pub revenue: MetricComparison,
    /// Expenses.
    pub expenses: MetricComparison,
    /// Gross profit.
    pub gross_profit: MetricComparison,
    /// Net income.
    pub net_income: MetricComparison,
}
