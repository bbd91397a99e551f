//! Roles, modules and actions known to the permission gate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User role within a company.
///
/// Lower `level()` means more privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access. `admin` parses to this role.
    Manager,
    /// Bookkeeping, approvals and reports.
    Accountant,
    /// Day-to-day data entry.
    Employee,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manager" | "admin" => Some(Self::Manager),
            "accountant" => Some(Self::Accountant),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Accountant => "accountant",
            Self::Employee => "employee",
        }
    }

    /// Hierarchy level: manager 1, accountant 2, employee 3.
    #[must_use]
    pub fn level(&self) -> u8 {
        match self {
            Self::Manager => 1,
            Self::Accountant => 2,
            Self::Employee => 3,
        }
    }

    /// Returns true if this role is at least as privileged as `other`.
    #[must_use]
    pub fn outranks_or_equals(&self, other: Self) -> bool {
        self.level() <= other.level()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Functional area of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Landing dashboard.
    Dashboard,
    /// Sales documents.
    Sales,
    /// Purchase documents.
    Purchases,
    /// Stock.
    Inventory,
    /// Customer records.
    Customers,
    /// Supplier records.
    Suppliers,
    /// Expense claims.
    Expenses,
    /// Receipt and payment vouchers.
    Vouchers,
    /// Chart of accounts and journal entries.
    Accounting,
    /// Financial reports.
    Reports,
    /// Company settings.
    Settings,
    /// User management.
    Users,
    /// Audit trail.
    ActivityLog,
}

impl Module {
    /// Every module.
    pub const ALL: [Self; 13] = [
        Self::Dashboard,
        Self::Sales,
        Self::Purchases,
        Self::Inventory,
        Self::Customers,
        Self::Suppliers,
        Self::Expenses,
        Self::Vouchers,
        Self::Accounting,
        Self::Reports,
        Self::Settings,
        Self::Users,
        Self::ActivityLog,
    ];

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Sales => "sales",
            Self::Purchases => "purchases",
            Self::Inventory => "inventory",
            Self::Customers => "customers",
            Self::Suppliers => "suppliers",
            Self::Expenses => "expenses",
            Self::Vouchers => "vouchers",
            Self::Accounting => "accounting",
            Self::Reports => "reports",
            Self::Settings => "settings",
            Self::Users => "users",
            Self::ActivityLog => "activity_log",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operation within a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Read.
    View,
    /// Create new records.
    Create,
    /// Modify records.
    Edit,
    /// Remove records.
    Delete,
    /// Export data.
    Export,
    /// Approve or post.
    Approve,
    /// Void or reverse.
    Void,
}

impl Action {
    /// Every action.
    pub const ALL: [Self; 7] = [
        Self::View,
        Self::Create,
        Self::Edit,
        Self::Delete,
        Self::Export,
        Self::Approve,
        Self::Void,
    ];

    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Export => "export",
            Self::Approve => "approve",
            Self::Void => "void",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
