//! Ledger domain enums shared by accounts, entries and the bridge.
//!
//! Each enum round-trips through `as_str`/`parse` so both storage backends
//! persist the same lowercase labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a ledger account.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts
/// - Credits increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned by the company.
    Asset,
    /// Obligations owed to others.
    Liability,
    /// Owners' residual interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in chart order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns the string representation of the account type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses an account type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// The side on which balances of this type naturally grow.
    #[must_use]
    pub fn default_normal_balance(&self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns true for balance sheet types.
    #[must_use]
    pub fn is_balance_sheet(&self) -> bool {
        matches!(self, Self::Asset | Self::Liability | Self::Equity)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normal balance side of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Balance = debits - credits.
    Debit,
    /// Balance = credits - debits.
    Credit,
}

impl NormalBalance {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses a normal balance from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }
}

impl fmt::Display for NormalBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Journal entry status.
///
/// The valid transitions are:
/// - Draft → Posted (post)
/// - Draft → Cancelled (cancel)
/// - Posted → Reversed (reverse)
///
/// Reversed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Being prepared; editable and deletable.
    Draft,
    /// Committed to the ledger.
    Posted,
    /// Cancelled out by a reversal entry.
    Reversed,
    /// Abandoned before posting.
    Cancelled,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Reversed => "reversed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            "reversed" => Some(Self::Reversed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if the transition `self → to` is allowed.
    #[must_use]
    pub fn can_transition_to(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Draft, Self::Posted | Self::Cancelled) | (Self::Posted, Self::Reversed)
        )
    }

    /// Returns true if lines of an entry in this status count toward balances.
    ///
    /// A reversed entry stays in the ledger next to its reversal.
    #[must_use]
    pub fn affects_balances(&self) -> bool {
        matches!(self, Self::Posted | Self::Reversed)
    }

    /// Returns true if the entry may be deleted.
    #[must_use]
    pub fn is_deletable(&self) -> bool {
        matches!(self, Self::Draft | Self::Cancelled)
    }

    /// Returns true if no transition leaves this status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Reversed | Self::Cancelled)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What produced a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// Keyed in by hand.
    Manual,
    /// Point-of-sale sale.
    Sale,
    /// Direct purchase.
    Purchase,
    /// Expense claim.
    Expense,
    /// Payment voucher.
    Payment,
    /// Receipt voucher.
    Receipt,
    /// Sales invoice document.
    Invoice,
    /// Supplier bill document.
    Bill,
    /// Sales return document.
    CreditNote,
    /// Purchase return document.
    DebitNote,
    /// Generic cash voucher.
    Voucher,
    /// Reversal of another entry.
    Reversal,
}

impl ReferenceType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Sale => "sale",
            Self::Purchase => "purchase",
            Self::Expense => "expense",
            Self::Payment => "payment",
            Self::Receipt => "receipt",
            Self::Invoice => "invoice",
            Self::Bill => "bill",
            Self::CreditNote => "credit_note",
            Self::DebitNote => "debit_note",
            Self::Voucher => "voucher",
            Self::Reversal => "reversal",
        }
    }

    /// Parses a reference type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "manual" => Some(Self::Manual),
            "sale" => Some(Self::Sale),
            "purchase" => Some(Self::Purchase),
            "expense" => Some(Self::Expense),
            "payment" => Some(Self::Payment),
            "receipt" => Some(Self::Receipt),
            "invoice" => Some(Self::Invoice),
            "bill" => Some(Self::Bill),
            "credit_note" => Some(Self::CreditNote),
            "debit_note" => Some(Self::DebitNote),
            "voucher" => Some(Self::Voucher),
            "reversal" => Some(Self::Reversal),
            _ => None,
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Counterparty kind on a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
    /// Customer.
    Customer,
    /// Supplier.
    Supplier,
    /// Employee.
    Employee,
}

impl PartyType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Supplier => "supplier",
            Self::Employee => "employee",
        }
    }

    /// Parses a party type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "customer" => Some(Self::Customer),
            "supplier" => Some(Self::Supplier),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }
}
