//! Balance query and result types.

use chrono::NaiveDate;
use ledgerline_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{Account, AccountType, BalanceDirection, DateRange, NormalBalance, RunningLine};

/// Window of a balance query. Both bounds inclusive.
///
/// Without `from` the result starts at the accounts' opening balances;
/// with `from` it starts at the balance of everything posted before it.
pub type BalanceQuery = DateRange;

/// Balance of one account over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalanceRow {
    /// Account.
    pub account_id: AccountId,
    /// Code.
    pub code: String,
    /// Name.
    pub name: String,
    /// Type.
    pub account_type: AccountType,
    /// Normal side.
    pub normal_balance: NormalBalance,
    /// Parent.
    pub parent_id: Option<AccountId>,
    /// Depth, roots at 1.
    pub level: i32,
    /// Aggregating node; its figures are its descendants' sums.
    pub is_header: bool,
    /// Soft-deleted accounts still report their history.
    pub is_active: bool,
    /// Balance at the start of the window, normal direction.
    pub opening_balance: Decimal,
    /// Debits inside the window.
    pub total_debit: Decimal,
    /// Credits inside the window.
    pub total_credit: Decimal,
    /// Balance at the end of the window, normal direction.
    pub balance: Decimal,
}

impl AccountBalanceRow {
    pub(crate) fn new(
        account: &Account,
        opening_net_debit: Decimal,
        total_debit: Decimal,
        total_credit: Decimal,
    ) -> Self {
        let direction = BalanceDirection::from(account.normal_balance);
        let closing_net_debit = opening_net_debit + total_debit - total_credit;
        Self {
            account_id: account.id,
            code: account.code.clone(),
            name: account.name.clone(),
            account_type: account.account_type,
            normal_balance: account.normal_balance,
            parent_id: account.parent_id,
            level: account.level,
            is_header: account.is_header,
            is_active: account.is_active,
            opening_balance: direction.from_net_debit(opening_net_debit),
            total_debit,
            total_credit,
            balance: direction.from_net_debit(closing_net_debit),
        }
    }

    /// Closing balance as `debit − credit`, independent of the normal side.
    #[must_use]
    pub fn net_debit(&self) -> Decimal {
        BalanceDirection::from(self.normal_balance).to_net_debit(self.balance)
    }

    /// Returns true if nothing moved and nothing was carried in.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.opening_balance.is_zero()
            && self.total_debit.is_zero()
            && self.total_credit.is_zero()
            && self.balance.is_zero()
    }
}

/// Posted history of one account with running balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    /// The account.
    pub account: Account,
    /// First day of the window, unbounded when `None`.
    pub from: Option<NaiveDate>,
    /// Last day of the window, unbounded when `None`.
    pub to: Option<NaiveDate>,
    /// Balance carried into the window.
    pub opening_balance: Decimal,
    /// Lines in posting order with the balance after each.
    pub lines: Vec<RunningLine>,
    /// Debits inside the window.
    pub total_debit: Decimal,
    /// Credits inside the window.
    pub total_credit: Decimal,
    /// Balance after the last line.
    pub closing_balance: Decimal,
}
