//! Property-based tests for balance aggregation.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use ledgerline_shared::types::{AccountId, CompanyId, JournalEntryId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::account::Account;
use super::balance::{BalanceDirection, rollup_net_debits, running_balance};
use super::entry::PostedLine;
use super::types::AccountType;

fn amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn make_account(id: AccountId, parent: Option<(AccountId, i32)>, is_header: bool) -> Account {
    Account {
        id,
        company_id: CompanyId::new(),
        code: id.to_string(),
        name: "generated".to_string(),
        description: None,
        account_type: AccountType::Asset,
        parent_id: parent.map(|(p, _)| p),
        level: parent.map_or(1, |(_, level)| level + 1),
        is_header,
        normal_balance: AccountType::Asset.default_normal_balance(),
        opening_balance: Decimal::ZERO,
        current_balance: Decimal::ZERO,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A chain of headers of any depth carries the sum of the leaves hanging
    /// off it, at every level.
    #[test]
    fn prop_rollup_equals_leaf_sum(
        depth in 1usize..8,
        leaf_amounts in proptest::collection::vec(amount(), 1..6),
    ) {
        let mut accounts = Vec::new();
        let mut parent: Option<(AccountId, i32)> = None;
        let mut chain = Vec::new();
        for _ in 0..depth {
            let id = AccountId::new();
            accounts.push(make_account(id, parent, true));
            chain.push(id);
            parent = Some((id, parent.map_or(1, |(_, level)| level + 1)));
        }

        let mut own = HashMap::new();
        for leaf_amount in &leaf_amounts {
            let id = AccountId::new();
            accounts.push(make_account(id, parent, false));
            own.insert(id, *leaf_amount);
        }

        let expected: Decimal = leaf_amounts.iter().copied().sum();
        let rolled = rollup_net_debits(&accounts, &own);
        for header in chain {
            prop_assert_eq!(rolled[&header], expected);
        }
    }

    /// The last running balance is the opening plus every change.
    #[test]
    fn prop_running_balance_ends_at_total(
        opening in amount(),
        moves in proptest::collection::vec((0i64..1_000_000, any::<bool>()), 0..20),
        credit_normal in any::<bool>(),
    ) {
        let direction = if credit_normal {
            BalanceDirection::CreditNormal
        } else {
            BalanceDirection::DebitNormal
        };
        let account_id = AccountId::new();
        let lines: Vec<PostedLine> = moves
            .iter()
            .map(|(cents, is_debit)| {
                let value = Decimal::new(*cents, 2);
                PostedLine {
                    entry_id: JournalEntryId::new(),
                    entry_number: "JE".to_string(),
                    entry_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    entry_description: String::new(),
                    account_id,
                    line_number: 1,
                    description: None,
                    debit_amount: if *is_debit { value } else { Decimal::ZERO },
                    credit_amount: if *is_debit { Decimal::ZERO } else { value },
                }
            })
            .collect();

        let expected = lines.iter().fold(opening, |acc, line| {
            acc + direction.calculate_balance_change(line.debit_amount, line.credit_amount)
        });
        let running = running_balance(direction, opening, lines);
        let last = running.last().map_or(opening, |r| r.balance);
        prop_assert_eq!(last, expected);
    }
}
