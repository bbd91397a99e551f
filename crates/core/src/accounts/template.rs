//! Default chart of accounts provisioned for a new company.

use crate::ledger::{AccountType, NormalBalance};

/// One account of the default chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateAccount {
    /// Account code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Account type.
    pub account_type: AccountType,
    /// Parent code; `None` for roots.
    pub parent_code: Option<&'static str>,
    /// Aggregating node.
    pub is_header: bool,
    /// Set for contra accounts whose side differs from their type's default.
    pub normal_balance: Option<NormalBalance>,
}

const fn header(
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    parent_code: Option<&'static str>,
) -> TemplateAccount {
    TemplateAccount {
        code,
        name,
        account_type,
        parent_code,
        is_header: true,
        normal_balance: None,
    }
}

const fn leaf(
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    parent_code: &'static str,
) -> TemplateAccount {
    TemplateAccount {
        code,
        name,
        account_type,
        parent_code: Some(parent_code),
        is_header: false,
        normal_balance: None,
    }
}

use AccountType::{Asset, Equity, Expense, Liability, Revenue};

/// The default chart. Parents always precede their children.
pub const DEFAULT_CHART: &[TemplateAccount] = &[
    header("1000", "Assets", Asset, None),
    header("1100", "Current Assets", Asset, Some("1000")),
    header("1110", "Cash and Banks", Asset, Some("1100")),
    leaf("1111", "Cash", Asset, "1110"),
    leaf("1112", "Bank", Asset, "1110"),
    leaf("1120", "Accounts Receivable", Asset, "1100"),
    leaf("1130", "Inventory", Asset, "1100"),
    leaf("1140", "Input VAT", Asset, "1100"),
    header("1200", "Fixed Assets", Asset, Some("1000")),
    leaf("1210", "Equipment", Asset, "1200"),
    leaf("1220", "Furniture and Fixtures", Asset, "1200"),
    header("2000", "Liabilities", Liability, None),
    header("2100", "Current Liabilities", Liability, Some("2000")),
    leaf("2110", "Accounts Payable", Liability, "2100"),
    leaf("2120", "Output VAT", Liability, "2100"),
    leaf("2130", "Short-term Loans", Liability, "2100"),
    header("2200", "Long-term Liabilities", Liability, Some("2000")),
    leaf("2210", "Long-term Loans", Liability, "2200"),
    header("3000", "Equity", Equity, None),
    leaf("3100", "Capital", Equity, "3000"),
    leaf("3200", "Retained Earnings", Equity, "3000"),
    header("4000", "Revenue", Revenue, None),
    leaf("4100", "Sales Revenue", Revenue, "4000"),
    TemplateAccount {
        code: "4200",
        name: "Sales Returns",
        account_type: Revenue,
        parent_code: Some("4000"),
        is_header: false,
        normal_balance: Some(NormalBalance::Debit),
    },
    leaf("4300", "Other Revenue", Revenue, "4000"),
    header("5000", "Expenses", Expense, None),
    leaf("5100", "Cost of Goods Sold", Expense, "5000"),
    header("5200", "Operating Expenses", Expense, Some("5000")),
    leaf("5210", "Salaries and Wages", Expense, "5200"),
    leaf("5220", "Rent", Expense, "5200"),
    leaf("5230", "Utilities", Expense, "5200"),
    leaf("5240", "Marketing", Expense, "5200"),
    leaf("5250", "Maintenance", Expense, "5200"),
];
