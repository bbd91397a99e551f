//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` throughout; ledger equality is exact,
//! so values must be rounded to currency minor units before they reach an entry.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for monetary amounts.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Rounds an amount to currency minor units, midpoint away from zero.
#[must_use]
pub fn round_minor(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true when the amount carries no precision beyond minor units.
#[must_use]
pub fn is_minor_unit_precise(amount: Decimal) -> bool {
    round_minor(amount) == amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use rstest::rstest;

    #[rstest]
    #[case(dec!(10.005), dec!(10.01))]
    #[case(dec!(10.004), dec!(10.00))]
    #[case(dec!(-10.005), dec!(-10.01))]
    #[case(dec!(7), dec!(7))]
    fn test_round_minor(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_minor(input), expected);
    }

    #[test]
    fn test_minor_unit_precision() {
        assert!(is_minor_unit_precise(dec!(100.25)));
        assert!(!is_minor_unit_precise(dec!(100.255)));
    }
}
