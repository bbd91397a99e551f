//! Property-based tests for document postings and totals.

use ledgerline_shared::types::money::is_minor_unit_precise;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::posting::{Side, document_postings, voucher_postings};
use super::totals::{DocumentTotals, ItemTotals};
use super::types::{DocumentType, NewDocumentItem, VoucherType};
use crate::ledger::PartyType;

fn cents(max: i64) -> impl Strategy<Value = Decimal> {
    (0i64..max).prop_map(|c| Decimal::new(c, 2))
}

fn posting_document_type() -> impl Strategy<Value = DocumentType> {
    prop_oneof![
        Just(DocumentType::Invoice),
        Just(DocumentType::Bill),
        Just(DocumentType::CreditNote),
        Just(DocumentType::DebitNote),
    ]
}

fn item() -> impl Strategy<Value = NewDocumentItem> {
    (1i64..1_000, cents(1_000_000), 0u32..=25).prop_map(|(qty, price, rate)| {
        NewDocumentItem::new("generated", Decimal::from(qty), price)
            .with_tax_rate(Decimal::from(rate))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every posting document maps to balanced, non-negative postings.
    #[test]
    fn prop_document_postings_balance(
        document_type in posting_document_type(),
        net in cents(100_000_000),
        tax in cents(10_000_000),
    ) {
        let total = net + tax;
        let postings = document_postings(document_type, total, tax).unwrap();

        let debit: Decimal = postings
            .iter()
            .filter(|p| p.side == Side::Debit)
            .map(|p| p.amount)
            .sum();
        let credit: Decimal = postings
            .iter()
            .filter(|p| p.side == Side::Credit)
            .map(|p| p.amount)
            .sum();
        prop_assert_eq!(debit, total);
        prop_assert_eq!(credit, total);
        prop_assert!(postings.iter().all(|p| p.amount >= Decimal::ZERO));
    }

    /// Voucher postings are one debit and one credit of the voucher amount.
    #[test]
    fn prop_voucher_postings_balance(
        amount in cents(100_000_000),
        receipt in any::<bool>(),
        customer in any::<bool>(),
    ) {
        let voucher_type = if receipt { VoucherType::Receipt } else { VoucherType::Payment };
        let counterparty = if customer { PartyType::Customer } else { PartyType::Supplier };
        let postings = voucher_postings(voucher_type, counterparty, amount);
        prop_assert_eq!(postings.len(), 2);
        prop_assert_ne!(postings[0].side, postings[1].side);
        prop_assert!(postings.iter().all(|p| p.amount == amount));
    }

    /// Document totals stay in minor units and add up.
    #[test]
    fn prop_document_totals_add_up(items in proptest::collection::vec(item(), 1..10)) {
        let computed: Vec<ItemTotals> = items.iter().map(|i| ItemTotals::of(i).unwrap()).collect();
        let totals = DocumentTotals::compute(&computed, Decimal::ZERO).unwrap();

        prop_assert!(computed.iter().all(|t| is_minor_unit_precise(t.tax)));
        prop_assert_eq!(totals.total_amount, totals.subtotal + totals.tax_total);
        let line_sum: Decimal = computed.iter().map(|t| t.total).sum();
        prop_assert_eq!(totals.total_amount, line_sum);
    }
}
