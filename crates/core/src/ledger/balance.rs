//! Account balance calculations.
//!
//! Balances are computed from a debit-positive net (`Σdebit − Σcredit`) and
//! presented in the account's normal direction:
//! - Asset/Expense: balance = opening + debit - credit (debit-normal)
//! - Liability/Equity/Revenue: balance = opening + credit - debit (credit-normal)

use std::collections::{BTreeMap, HashMap};

use ledgerline_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::Account;
use super::entry::{JournalEntryLine, PostedLine};
use super::types::NormalBalance;

/// Sign rule for an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceDirection {
    /// Debit-normal accounts (Asset, Expense).
    DebitNormal,
    /// Credit-normal accounts (Liability, Equity, Revenue).
    CreditNormal,
}

impl From<NormalBalance> for BalanceDirection {
    fn from(normal: NormalBalance) -> Self {
        match normal {
            NormalBalance::Debit => Self::DebitNormal,
            NormalBalance::Credit => Self::CreditNormal,
        }
    }
}

impl BalanceDirection {
    /// Calculates the balance change for a debit/credit pair.
    #[must_use]
    pub fn calculate_balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::DebitNormal => debit - credit,
            Self::CreditNormal => credit - debit,
        }
    }

    /// Converts a debit-positive net into this direction.
    #[must_use]
    pub fn from_net_debit(self, net_debit: Decimal) -> Decimal {
        match self {
            Self::DebitNormal => net_debit,
            Self::CreditNormal => -net_debit,
        }
    }

    /// Converts a balance in this direction into a debit-positive net.
    #[must_use]
    pub fn to_net_debit(self, balance: Decimal) -> Decimal {
        match self {
            Self::DebitNormal => balance,
            Self::CreditNormal => -balance,
        }
    }
}

/// Debit and credit activity of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountActivity {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
}

impl AccountActivity {
    /// `debit − credit`.
    #[must_use]
    pub fn net_debit(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// Per-account change caused by posting one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    /// Account affected.
    pub account_id: AccountId,
    /// Debit added.
    pub debit: Decimal,
    /// Credit added.
    pub credit: Decimal,
}

impl BalanceDelta {
    /// Change of the account's cached balance in its normal direction.
    #[must_use]
    pub fn balance_change(&self, normal: NormalBalance) -> Decimal {
        BalanceDirection::from(normal).calculate_balance_change(self.debit, self.credit)
    }
}

/// Groups an entry's lines into one delta per account, ordered by account id.
#[must_use]
pub fn compute_deltas(lines: &[JournalEntryLine]) -> Vec<BalanceDelta> {
    let mut grouped: BTreeMap<AccountId, AccountActivity> = BTreeMap::new();
    for line in lines {
        let activity = grouped.entry(line.account_id).or_default();
        activity.debit += line.debit_amount;
        activity.credit += line.credit_amount;
    }
    grouped
        .into_iter()
        .map(|(account_id, activity)| BalanceDelta {
            account_id,
            debit: activity.debit,
            credit: activity.credit,
        })
        .collect()
}

/// Adds each delta to every ancestor of its account as well, merging
/// deltas that land on the same account. `parents` maps an account to its
/// parent; chains are followed until a root or an unknown account.
#[must_use]
pub fn expand_to_ancestors(
    deltas: Vec<BalanceDelta>,
    parents: &HashMap<AccountId, Option<AccountId>>,
) -> Vec<BalanceDelta> {
    let mut merged: BTreeMap<AccountId, AccountActivity> = BTreeMap::new();
    for delta in deltas {
        let mut cursor = Some(delta.account_id);
        let mut hops = 0;
        while let Some(account_id) = cursor {
            let activity = merged.entry(account_id).or_default();
            activity.debit += delta.debit;
            activity.credit += delta.credit;
            hops += 1;
            if hops > parents.len() {
                break;
            }
            cursor = parents.get(&account_id).copied().flatten();
        }
    }
    merged
        .into_iter()
        .map(|(account_id, activity)| BalanceDelta {
            account_id,
            debit: activity.debit,
            credit: activity.credit,
        })
        .collect()
}

/// Sums posted lines per account.
#[must_use]
pub fn activity_by_account(lines: &[PostedLine]) -> HashMap<AccountId, AccountActivity> {
    let mut totals: HashMap<AccountId, AccountActivity> = HashMap::new();
    for line in lines {
        let activity = totals.entry(line.account_id).or_default();
        activity.debit += line.debit_amount;
        activity.credit += line.credit_amount;
    }
    totals
}

/// Net debit of every account including its descendants.
///
/// `own_net` holds each account's own debit-positive net (opening plus
/// activity). Header accounts normally have none of their own. Works for any
/// tree depth; children are folded into parents deepest level first.
#[must_use]
pub fn rollup_net_debits(
    accounts: &[Account],
    own_net: &HashMap<AccountId, Decimal>,
) -> HashMap<AccountId, Decimal> {
    let mut rolled: HashMap<AccountId, Decimal> = accounts
        .iter()
        .map(|a| (a.id, own_net.get(&a.id).copied().unwrap_or_default()))
        .collect();

    let mut by_depth: Vec<&Account> = accounts.iter().collect();
    by_depth.sort_by(|a, b| b.level.cmp(&a.level));

    for account in by_depth {
        let Some(parent_id) = account.parent_id else {
            continue;
        };
        let subtotal = rolled.get(&account.id).copied().unwrap_or_default();
        if let Some(parent_total) = rolled.get_mut(&parent_id) {
            *parent_total += subtotal;
        }
    }

    rolled
}

/// A posted line with the account balance after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningLine {
    /// The line.
    pub line: PostedLine,
    /// Balance after this line, in the account's normal direction.
    pub balance: Decimal,
}

/// Walks `lines` in order and accumulates from `opening`.
///
/// Property: `balance[n] = balance[n-1] + change(line[n])`, `balance[-1] = opening`.
#[must_use]
pub fn running_balance(
    direction: BalanceDirection,
    opening: Decimal,
    lines: Vec<PostedLine>,
) -> Vec<RunningLine> {
    let mut balance = opening;
    lines
        .into_iter()
        .map(|line| {
            balance += direction.calculate_balance_change(line.debit_amount, line.credit_amount);
            RunningLine { line, balance }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use ledgerline_shared::types::{CompanyId, JournalEntryId, JournalLineId};

    use crate::ledger::types::AccountType;

    fn make_account(
        parent: Option<&Account>,
        account_type: AccountType,
        is_header: bool,
    ) -> Account {
        Account {
            id: AccountId::new(),
            company_id: CompanyId::new(),
            code: "x".to_string(),
            name: "x".to_string(),
            description: None,
            account_type,
            parent_id: parent.map(|p| p.id),
            level: parent.map_or(1, |p| p.level + 1),
            is_header,
            normal_balance: account_type.default_normal_balance(),
            opening_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_posted(account_id: AccountId, debit: Decimal, credit: Decimal) -> PostedLine {
        PostedLine {
            entry_id: JournalEntryId::new(),
            entry_number: "JE-2024-00001".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            entry_description: "test".to_string(),
            account_id,
            line_number: 1,
            description: None,
            debit_amount: debit,
            credit_amount: credit,
        }
    }

    #[test]
    fn test_balance_change_by_direction() {
        assert_eq!(
            BalanceDirection::DebitNormal.calculate_balance_change(dec!(100), dec!(30)),
            dec!(70)
        );
        assert_eq!(
            BalanceDirection::CreditNormal.calculate_balance_change(dec!(100), dec!(30)),
            dec!(-70)
        );
    }

    #[test]
    fn test_compute_deltas_groups_by_account() {
        let a = AccountId::new();
        let b = AccountId::new();
        let entry = JournalEntryId::new();
        let line = |account, d, c| JournalEntryLine {
            id: JournalLineId::new(),
            journal_entry_id: entry,
            account_id: account,
            line_number: 1,
            description: None,
            debit_amount: d,
            credit_amount: c,
            party_type: None,
            party_id: None,
        };
        let deltas = compute_deltas(&[
            line(a, dec!(60), dec!(0)),
            line(a, dec!(40), dec!(0)),
            line(b, dec!(0), dec!(100)),
        ]);
        assert_eq!(deltas.len(), 2);
        let delta_a = deltas.iter().find(|d| d.account_id == a).unwrap();
        assert_eq!(delta_a.debit, dec!(100));
        assert_eq!(delta_a.balance_change(NormalBalance::Debit), dec!(100));
        let delta_b = deltas.iter().find(|d| d.account_id == b).unwrap();
        assert_eq!(delta_b.balance_change(NormalBalance::Credit), dec!(100));
    }

    #[test]
    fn test_expand_to_ancestors() {
        let root = AccountId::new();
        let mid = AccountId::new();
        let cash = AccountId::new();
        let bank = AccountId::new();
        let parents: HashMap<AccountId, Option<AccountId>> = [
            (root, None),
            (mid, Some(root)),
            (cash, Some(mid)),
            (bank, Some(mid)),
        ]
        .into_iter()
        .collect();

        let deltas = expand_to_ancestors(
            vec![
                BalanceDelta { account_id: cash, debit: dec!(100), credit: dec!(0) },
                BalanceDelta { account_id: bank, debit: dec!(0), credit: dec!(40) },
            ],
            &parents,
        );

        assert_eq!(deltas.len(), 4);
        let mid_delta = deltas.iter().find(|d| d.account_id == mid).unwrap();
        assert_eq!(mid_delta.debit, dec!(100));
        assert_eq!(mid_delta.credit, dec!(40));
        let root_delta = deltas.iter().find(|d| d.account_id == root).unwrap();
        assert_eq!(root_delta.balance_change(NormalBalance::Debit), dec!(60));
    }

    #[test]
    fn test_rollup_three_levels() {
        let assets = make_account(None, AccountType::Asset, true);
        let current = make_account(Some(&assets), AccountType::Asset, true);
        let cash = make_account(Some(&current), AccountType::Asset, false);
        let bank = make_account(Some(&current), AccountType::Asset, false);
        let building = make_account(Some(&assets), AccountType::Asset, false);
        let accounts = vec![
            assets.clone(),
            current.clone(),
            cash.clone(),
            bank.clone(),
            building.clone(),
        ];

        let own: HashMap<AccountId, Decimal> = [
            (cash.id, dec!(100)),
            (bank.id, dec!(250)),
            (building.id, dec!(1000)),
        ]
        .into_iter()
        .collect();

        let rolled = rollup_net_debits(&accounts, &own);
        assert_eq!(rolled[&current.id], dec!(350));
        assert_eq!(rolled[&assets.id], dec!(1350));
        assert_eq!(rolled[&cash.id], dec!(100));
    }

    #[test]
    fn test_running_balance_from_opening() {
        let account = AccountId::new();
        let lines = vec![
            make_posted(account, dec!(100), dec!(0)),
            make_posted(account, dec!(0), dec!(30)),
            make_posted(account, dec!(5), dec!(0)),
        ];
        let running = running_balance(BalanceDirection::DebitNormal, dec!(50), lines);
        let balances: Vec<Decimal> = running.iter().map(|r| r.balance).collect();
        assert_eq!(balances, vec![dec!(150), dec!(120), dec!(125)]);
    }

    #[test]
    fn test_activity_by_account() {
        let a = AccountId::new();
        let totals = activity_by_account(&[
            make_posted(a, dec!(10), dec!(0)),
            make_posted(a, dec!(0), dec!(4)),
        ]);
        assert_eq!(totals[&a].net_debit(), dec!(6));
    }
}
