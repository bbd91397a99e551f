//! Business rule validation for journal entries.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::NewJournalLine;
use super::error::{LedgerError, LedgerResult};

/// Debit and credit sums of a line set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
}

impl EntryTotals {
    /// Sums a line set without checking it.
    #[must_use]
    pub fn of(lines: &[NewJournalLine]) -> Self {
        lines.iter().fold(Self::default(), |acc, line| Self {
            total_debit: acc.total_debit + line.debit_amount,
            total_credit: acc.total_credit + line.credit_amount,
        })
    }

    /// Exact equality, no tolerance.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// Validates a single line: non-negative, exactly one non-zero side.
pub fn validate_line(line_number: usize, line: &NewJournalLine) -> LedgerResult<()> {
    if line.debit_amount < Decimal::ZERO || line.credit_amount < Decimal::ZERO {
        return Err(LedgerError::InvalidLine {
            line_number,
            reason: "amounts must not be negative",
        });
    }

    match (line.debit_amount.is_zero(), line.credit_amount.is_zero()) {
        (true, true) => Err(LedgerError::InvalidLine {
            line_number,
            reason: "either debit or credit must be non-zero",
        }),
        (false, false) => Err(LedgerError::InvalidLine {
            line_number,
            reason: "a line cannot carry both debit and credit",
        }),
        _ => Ok(()),
    }
}

/// Validates a full line set and returns its totals.
///
/// # Errors
///
/// - `InsufficientLines` with fewer than two lines
/// - `InvalidLine` for the first line breaking the per-line rules
/// - `UnbalancedEntry` when debits and credits differ
pub fn validate_lines(lines: &[NewJournalLine]) -> LedgerResult<EntryTotals> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines(lines.len()));
    }

    for (index, line) in lines.iter().enumerate() {
        validate_line(index + 1, line)?;
    }

    let totals = EntryTotals::of(lines);
    if !totals.is_balanced() {
        return Err(LedgerError::UnbalancedEntry {
            debit: totals.total_debit,
            credit: totals.total_credit,
        });
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use ledgerline_shared::types::AccountId;

    #[test]
    fn test_balanced_lines() {
        let lines = vec![
            NewJournalLine::debit(AccountId::new(), dec!(1000)),
            NewJournalLine::credit(AccountId::new(), dec!(1000)),
        ];
        let totals = validate_lines(&lines).unwrap();
        assert_eq!(totals.total_debit, dec!(1000));
        assert_eq!(totals.total_credit, dec!(1000));
    }

    #[test]
    fn test_unbalanced_lines() {
        let lines = vec![
            NewJournalLine::debit(AccountId::new(), dec!(1000)),
            NewJournalLine::credit(AccountId::new(), dec!(900)),
        ];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::UnbalancedEntry { debit, credit })
                if debit == dec!(1000) && credit == dec!(900)
        ));
    }

    #[test]
    fn test_no_tolerance() {
        let lines = vec![
            NewJournalLine::debit(AccountId::new(), dec!(100.00)),
            NewJournalLine::credit(AccountId::new(), dec!(99.99)),
        ];
        assert!(validate_lines(&lines).is_err());
    }

    #[test]
    fn test_single_line_rejected() {
        let lines = vec![NewJournalLine::debit(AccountId::new(), dec!(10))];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::InsufficientLines(1))
        ));
    }

    #[test]
    fn test_two_sided_line_rejected() {
        let mut both = NewJournalLine::debit(AccountId::new(), dec!(10));
        both.credit_amount = dec!(10);
        let lines = vec![both, NewJournalLine::credit(AccountId::new(), dec!(0))];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::InvalidLine { line_number: 1, .. })
        ));
    }

    #[test]
    fn test_zero_line_rejected() {
        let lines = vec![
            NewJournalLine::debit(AccountId::new(), dec!(10)),
            NewJournalLine::credit(AccountId::new(), dec!(10)),
            NewJournalLine::credit(AccountId::new(), dec!(0)),
        ];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::InvalidLine { line_number: 3, .. })
        ));
    }

    #[test]
    fn test_negative_line_rejected() {
        let lines = vec![
            NewJournalLine::debit(AccountId::new(), dec!(-10)),
            NewJournalLine::credit(AccountId::new(), dec!(-10)),
        ];
        assert!(matches!(
            validate_lines(&lines),
            Err(LedgerError::InvalidLine { line_number: 1, .. })
        ));
    }
}
