//! Property-based tests for journal line validation.

use ledgerline_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::NewJournalLine;
use super::error::LedgerError;
use super::validation::{EntryTotals, validate_lines};

/// Strategy to generate a valid positive amount (> 0), in cents.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A balanced line set: random debits, credits split to match.
fn balanced_lines() -> impl Strategy<Value = Vec<NewJournalLine>> {
    (
        proptest::collection::vec(positive_amount(), 1..6),
        1usize..4,
    )
        .prop_map(|(debits, credit_parts)| {
            let total: Decimal = debits.iter().copied().sum();
            let mut lines: Vec<NewJournalLine> = debits
                .into_iter()
                .map(|amount| NewJournalLine::debit(AccountId::new(), amount))
                .collect();

            // Split the total into `credit_parts` credits whose sum is exact.
            let parts = i64::try_from(credit_parts).unwrap_or(1);
            let share = (total / Decimal::from(parts)).round_dp(2);
            let mut remaining = total;
            for index in 0..parts {
                let amount = if index == parts - 1 { remaining } else { share };
                if amount > Decimal::ZERO {
                    lines.push(NewJournalLine::credit(AccountId::new(), amount));
                }
                remaining -= amount;
            }
            lines
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any balanced set of one-sided positive lines validates and its
    /// totals are exactly equal.
    #[test]
    fn prop_balanced_sets_accepted(lines in balanced_lines()) {
        prop_assume!(lines.len() >= 2);
        let totals = validate_lines(&lines);
        prop_assert!(totals.is_ok(), "balanced lines rejected: {:?}", totals);
        let totals = totals.unwrap();
        prop_assert_eq!(totals.total_debit, totals.total_credit);
    }

    /// Nudging any balanced set by one cent makes it unbalanced.
    #[test]
    fn prop_one_cent_off_rejected(lines in balanced_lines(), bump in 1i64..100) {
        prop_assume!(lines.len() >= 2);
        let mut lines = lines;
        lines[0].debit_amount += Decimal::new(bump, 2);

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedEntry { .. })),
            "expected unbalanced, got {:?}",
            result
        );
    }

    /// The error reports exactly the totals of the input.
    #[test]
    fn prop_unbalanced_error_reports_totals(
        debit in positive_amount(),
        credit in positive_amount(),
    ) {
        prop_assume!(debit != credit);
        let lines = vec![
            NewJournalLine::debit(AccountId::new(), debit),
            NewJournalLine::credit(AccountId::new(), credit),
        ];
        let expected = EntryTotals::of(&lines);
        match validate_lines(&lines) {
            Err(LedgerError::UnbalancedEntry { debit: d, credit: c }) => {
                prop_assert_eq!(d, expected.total_debit);
                prop_assert_eq!(c, expected.total_credit);
            }
            other => prop_assert!(false, "expected unbalanced, got {:?}", other),
        }
    }
}
