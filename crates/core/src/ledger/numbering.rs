//! Sequential numbering for entries, vouchers and documents.
//!
//! Numbers are `{PREFIX}-{year}-{nnnnn}`. The counter behind them is a
//! per-company, per-key atomic sequence owned by the store; this module only
//! names the sequences and formats their values.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A numbered series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberSeries {
    /// Journal entries (`JE`).
    JournalEntry,
    /// Receipt vouchers (`RV`).
    ReceiptVoucher,
    /// Payment vouchers (`PV`).
    PaymentVoucher,
    /// Sales invoices (`INV`).
    Invoice,
    /// Supplier bills (`BILL`).
    Bill,
    /// Quotations (`QT`).
    Quote,
    /// Sales orders (`SO`).
    Order,
    /// Sales returns (`CN`).
    CreditNote,
    /// Purchase returns (`DN`).
    DebitNote,
}

impl NumberSeries {
    /// Prefix printed before the year.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::JournalEntry => "JE",
            Self::ReceiptVoucher => "RV",
            Self::PaymentVoucher => "PV",
            Self::Invoice => "INV",
            Self::Bill => "BILL",
            Self::Quote => "QT",
            Self::Order => "SO",
            Self::CreditNote => "CN",
            Self::DebitNote => "DN",
        }
    }

    /// Counter key; one counter per series per year.
    #[must_use]
    pub fn sequence_key(&self, date: NaiveDate) -> String {
        format!("{}-{}", self.prefix(), date.year())
    }

    /// Formats counter value `value` for `date`.
    #[must_use]
    pub fn format(&self, date: NaiveDate, value: i64) -> String {
        format!("{}-{}-{value:05}", self.prefix(), date.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(NumberSeries::JournalEntry, 1, "JE-2024-00001")]
    #[case(NumberSeries::ReceiptVoucher, 42, "RV-2024-00042")]
    #[case(NumberSeries::PaymentVoucher, 7, "PV-2024-00007")]
    #[case(NumberSeries::Invoice, 123_456, "INV-2024-123456")]
    fn test_format(#[case] series: NumberSeries, #[case] value: i64, #[case] expected: &str) {
        assert_eq!(series.format(date(2024, 1, 15), value), expected);
    }

    #[test]
    fn test_sequence_key_is_per_year() {
        let series = NumberSeries::JournalEntry;
        assert_eq!(series.sequence_key(date(2024, 12, 31)), "JE-2024");
        assert_ne!(
            series.sequence_key(date(2024, 12, 31)),
            series.sequence_key(date(2025, 1, 1))
        );
    }
}
