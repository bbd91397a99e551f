//! Building reversal entries for posted journal entries.

use chrono::NaiveDate;

use super::entry::{JournalEntryWithLines, NewJournalEntry, NewJournalLine};
use super::types::ReferenceType;

/// Stateless builder for reversing entries.
pub struct ReversalBuilder;

impl ReversalBuilder {
    /// Builds the input for the entry that cancels `original`.
    ///
    /// For each original line, in order:
    /// - Debits become credits and credits become debits
    /// - Account, description and party are preserved
    ///
    /// The header references the original entry and its description is
    /// prefixed with "Reversal: ".
    #[must_use]
    pub fn build(original: &JournalEntryWithLines, entry_date: NaiveDate) -> NewJournalEntry {
        let lines = original
            .lines
            .iter()
            .map(|line| {
                let mut reversed = NewJournalLine::from(line);
                std::mem::swap(&mut reversed.debit_amount, &mut reversed.credit_amount);
                reversed
            })
            .collect();

        NewJournalEntry {
            entry_date,
            description: format!("Reversal: {}", original.entry.description),
            reference_type: ReferenceType::Reversal,
            reference_id: Some(original.entry.id.into_inner()),
            reference_number: Some(original.entry.entry_number.clone()),
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use ledgerline_shared::types::{AccountId, CompanyId, JournalEntryId, JournalLineId, UserId};

    use crate::ledger::entry::{JournalEntry, JournalEntryLine};
    use crate::ledger::types::EntryStatus;
    use crate::ledger::validation::validate_lines;

    fn make_line(
        entry: JournalEntryId,
        n: i32,
        account: AccountId,
        debit: Decimal,
        credit: Decimal,
    ) -> JournalEntryLine {
        JournalEntryLine {
            id: JournalLineId::new(),
            journal_entry_id: entry,
            account_id: account,
            line_number: n,
            description: Some(format!("line {n}")),
            debit_amount: debit,
            credit_amount: credit,
            party_type: None,
            party_id: None,
        }
    }

    fn make_posted(lines: &[(AccountId, Decimal, Decimal)]) -> JournalEntryWithLines {
        let id = JournalEntryId::new();
        let total: Decimal = lines.iter().map(|(_, d, _)| *d).sum();
        JournalEntryWithLines {
            entry: JournalEntry {
                id,
                company_id: CompanyId::new(),
                entry_number: "JE-2024-00001".to_string(),
                entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                description: "Cash sale".to_string(),
                reference_type: ReferenceType::Manual,
                reference_id: None,
                reference_number: None,
                total_debit: total,
                total_credit: total,
                status: EntryStatus::Posted,
                posted_at: Some(Utc::now()),
                posted_by: None,
                reversal_entry_id: None,
                reversed_entry_id: None,
                reversal_reason: None,
                is_reversal: false,
                created_by: UserId::new(),
                created_at: Utc::now(),
            },
            lines: lines
                .iter()
                .enumerate()
                .map(|(i, (account, d, c))| {
                    make_line(id, i32::try_from(i).unwrap() + 1, *account, *d, *c)
                })
                .collect(),
        }
    }

    #[test]
    fn test_lines_are_swapped_in_order() {
        let cash = AccountId::new();
        let revenue = AccountId::new();
        let original = make_posted(&[(cash, dec!(100), dec!(0)), (revenue, dec!(0), dec!(100))]);

        let reversal =
            ReversalBuilder::build(&original, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        assert_eq!(reversal.lines.len(), 2);
        assert_eq!(reversal.lines[0].account_id, cash);
        assert_eq!(reversal.lines[0].debit_amount, dec!(0));
        assert_eq!(reversal.lines[0].credit_amount, dec!(100));
        assert_eq!(reversal.lines[1].account_id, revenue);
        assert_eq!(reversal.lines[1].debit_amount, dec!(100));
        assert_eq!(reversal.lines[1].credit_amount, dec!(0));
        assert_eq!(reversal.lines[0].description.as_deref(), Some("line 1"));
    }

    #[test]
    fn test_header_references_original() {
        let original = make_posted(&[
            (AccountId::new(), dec!(60), dec!(0)),
            (AccountId::new(), dec!(40), dec!(0)),
            (AccountId::new(), dec!(0), dec!(100)),
        ]);
        let reversal =
            ReversalBuilder::build(&original, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        assert_eq!(reversal.description, "Reversal: Cash sale");
        assert_eq!(reversal.reference_type, ReferenceType::Reversal);
        assert_eq!(reversal.reference_id, Some(original.entry.id.into_inner()));
        assert!(validate_lines(&reversal.lines).is_ok());
    }
}
