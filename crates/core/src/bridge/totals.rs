//! Document item and header totals.

use ledgerline_shared::types::round_minor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::NewDocumentItem;
use crate::ledger::{LedgerError, LedgerResult};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Computed amounts of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTotals {
    /// `quantity × unit_price − discount_amount`, rounded to minor units.
    pub net: Decimal,
    /// `net × tax_rate / 100`, rounded to minor units.
    pub tax: Decimal,
    /// `net + tax`.
    pub total: Decimal,
}

impl ItemTotals {
    /// Computes the totals of `item`, rejecting negative inputs.
    pub fn of(item: &NewDocumentItem) -> LedgerResult<Self> {
        if item.quantity <= Decimal::ZERO {
            return Err(invalid("quantity", "must be positive"));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(invalid("unit_price", "must not be negative"));
        }
        if item.discount_amount < Decimal::ZERO {
            return Err(invalid("discount_amount", "must not be negative"));
        }
        if item.tax_rate < Decimal::ZERO || item.tax_rate > ONE_HUNDRED {
            return Err(invalid("tax_rate", "must be between 0 and 100"));
        }

        let net = round_minor(item.quantity * item.unit_price - item.discount_amount);
        if net < Decimal::ZERO {
            return Err(invalid("discount_amount", "exceeds the line amount"));
        }
        let tax = round_minor(net * item.tax_rate / ONE_HUNDRED);
        Ok(Self {
            net,
            tax,
            total: net + tax,
        })
    }
}

/// Header totals of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of item nets.
    pub subtotal: Decimal,
    /// Sum of item taxes.
    pub tax_total: Decimal,
    /// Header discount.
    pub discount_total: Decimal,
    /// `subtotal + tax_total − discount_total`.
    pub total_amount: Decimal,
}

impl DocumentTotals {
    /// Folds item totals and the header discount.
    pub fn compute(items: &[ItemTotals], discount_total: Decimal) -> LedgerResult<Self> {
        if discount_total < Decimal::ZERO {
            return Err(invalid("discount_total", "must not be negative"));
        }
        let subtotal: Decimal = items.iter().map(|i| i.net).sum();
        let tax_total: Decimal = items.iter().map(|i| i.tax).sum();
        let total_amount = subtotal + tax_total - discount_total;
        if total_amount < Decimal::ZERO {
            return Err(invalid("discount_total", "exceeds the document amount"));
        }
        Ok(Self {
            subtotal,
            tax_total,
            discount_total,
            total_amount,
        })
    }
}

fn invalid(field: &'static str, message: &str) -> LedgerError {
    LedgerError::InvalidField {
        field,
        message: message.to_string(),
    }
}
