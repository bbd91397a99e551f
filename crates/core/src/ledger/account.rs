//! Chart of accounts domain types.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::{AccountId, CompanyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{LedgerError, LedgerResult};
use super::types::{AccountType, NormalBalance};

/// A ledger account in a company's chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account ID.
    pub id: AccountId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Code, unique within the company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Classification.
    pub account_type: AccountType,
    /// Parent in the chart tree.
    pub parent_id: Option<AccountId>,
    /// Depth in the tree, roots are 1.
    pub level: i32,
    /// Header accounts aggregate their descendants and take no postings.
    pub is_header: bool,
    /// Side on which the balance grows.
    pub normal_balance: NormalBalance,
    /// Balance brought forward before the first posting.
    pub opening_balance: Decimal,
    /// Cached balance, maintained by posting and recalculation.
    pub current_balance: Decimal,
    /// Soft-delete flag.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Returns true if journal lines may reference this account.
    #[must_use]
    pub fn is_postable(&self) -> bool {
        self.is_active && !self.is_header
    }

    /// Fails unless journal lines may reference this account.
    pub fn ensure_postable(&self) -> LedgerResult<()> {
        if self.is_header {
            return Err(LedgerError::HeaderAccountNotPostable(self.id));
        }
        if !self.is_active {
            return Err(LedgerError::AccountInactive(self.id));
        }
        Ok(())
    }
}

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Code, unique within the company.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Classification.
    pub account_type: AccountType,
    /// Parent account, same company.
    pub parent_id: Option<AccountId>,
    /// Whether this is a header account.
    pub is_header: bool,
    /// Overrides the type's default normal balance.
    pub normal_balance: Option<NormalBalance>,
    /// Opening balance.
    pub opening_balance: Decimal,
}

impl NewAccount {
    /// A postable leaf account with no parent.
    #[must_use]
    pub fn leaf(
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: None,
            account_type,
            parent_id: None,
            is_header: false,
            normal_balance: None,
            opening_balance: Decimal::ZERO,
        }
    }

    /// A header account with no parent.
    #[must_use]
    pub fn header(
        code: impl Into<String>,
        name: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            is_header: true,
            ..Self::leaf(code, name, account_type)
        }
    }

    /// Places the account under `parent`.
    #[must_use]
    pub fn under(mut self, parent: AccountId) -> Self {
        self.parent_id = Some(parent);
        self
    }

    /// Sets the opening balance.
    #[must_use]
    pub fn with_opening_balance(mut self, amount: Decimal) -> Self {
        self.opening_balance = amount;
        self
    }

    /// Checks field-level rules that need no storage access.
    pub fn validate(&self) -> LedgerResult<()> {
        validate_code(&self.code)?;
        validate_name(&self.name)?;
        if self.is_header && !self.opening_balance.is_zero() {
            return Err(LedgerError::InvalidField {
                field: "opening_balance",
                message: "header accounts carry no balance of their own".to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn validate_code(code: &str) -> LedgerResult<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(LedgerError::InvalidField {
            field: "code",
            message: "must not be empty".to_string(),
        });
    }
    if code.len() > 20 {
        return Err(LedgerError::InvalidField {
            field: "code",
            message: "must be at most 20 characters".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn validate_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::InvalidField {
            field: "name",
            message: "must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Partial update of an account. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    /// New code.
    pub code: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New description (`Some(None)` clears it).
    pub description: Option<Option<String>>,
    /// New type; refused once the account has postings.
    pub account_type: Option<AccountType>,
    /// New parent (`Some(None)` makes it a root).
    pub parent_id: Option<Option<AccountId>>,
    /// Header flag; refused once the account has postings.
    pub is_header: Option<bool>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// New opening balance.
    pub opening_balance: Option<Decimal>,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountFilter {
    /// Filter by account type.
    pub account_type: Option<AccountType>,
    /// Filter by active status.
    pub is_active: Option<bool>,
    /// Filter by parent (`Some(None)` = roots only).
    pub parent_id: Option<Option<AccountId>>,
    /// Only active non-header accounts.
    pub postable_only: bool,
}

impl AccountFilter {
    /// Active postable accounts of one type.
    #[must_use]
    pub fn postable_of_type(account_type: AccountType) -> Self {
        Self {
            account_type: Some(account_type),
            is_active: Some(true),
            parent_id: None,
            postable_only: true,
        }
    }

    /// Direct children of `parent`.
    #[must_use]
    pub fn children_of(parent: AccountId) -> Self {
        Self {
            parent_id: Some(Some(parent)),
            ..Self::default()
        }
    }

    /// Returns true if `account` passes the filter.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        self.account_type.is_none_or(|t| account.account_type == t)
            && self.is_active.is_none_or(|active| account.is_active == active)
            && self.parent_id.is_none_or(|parent| account.parent_id == parent)
            && (!self.postable_only || account.is_postable())
    }
}

/// An account with its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNode {
    /// The account.
    pub account: Account,
    /// Direct children, ordered by code.
    pub children: Vec<AccountNode>,
}

impl AccountNode {
    /// Number of accounts in the subtree, including this one.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(AccountNode::size).sum::<usize>()
    }
}
