//! Mapping of documents and vouchers onto journal lines.
//!
//! The mapping is expressed in posting roles; [`PostingProfile`] turns roles
//! into account codes of the company's chart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{DocumentType, VoucherType};
use crate::ledger::PartyType;

/// What an account is used for when posting documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingRole {
    /// Default cash account for vouchers.
    Cash,
    /// Trade receivables.
    Receivables,
    /// Trade payables.
    Payables,
    /// Sales revenue.
    SalesRevenue,
    /// Sales returns and allowances.
    SalesReturns,
    /// Purchases or inventory.
    Purchases,
    /// VAT collected on sales.
    OutputTax,
    /// VAT paid on purchases.
    InputTax,
}

impl PostingRole {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Receivables => "receivables",
            Self::Payables => "payables",
            Self::SalesRevenue => "sales_revenue",
            Self::SalesReturns => "sales_returns",
            Self::Purchases => "purchases",
            Self::OutputTax => "output_tax",
            Self::InputTax => "input_tax",
        }
    }
}

/// Account codes used for each posting role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingProfile {
    /// Cash.
    pub cash: String,
    /// Receivables.
    pub receivables: String,
    /// Payables.
    pub payables: String,
    /// Sales revenue.
    pub sales_revenue: String,
    /// Sales returns.
    pub sales_returns: String,
    /// Purchases or inventory.
    pub purchases: String,
    /// Output VAT.
    pub output_tax: String,
    /// Input VAT.
    pub input_tax: String,
}

impl Default for PostingProfile {
    fn default() -> Self {
        Self {
            cash: "1111".to_string(),
            receivables: "1120".to_string(),
            payables: "2110".to_string(),
            sales_revenue: "4100".to_string(),
            sales_returns: "4200".to_string(),
            purchases: "1130".to_string(),
            output_tax: "2120".to_string(),
            input_tax: "1140".to_string(),
        }
    }
}

impl PostingProfile {
    /// Account code for `role`.
    #[must_use]
    pub fn code_for(&self, role: PostingRole) -> &str {
        match role {
            PostingRole::Cash => &self.cash,
            PostingRole::Receivables => &self.receivables,
            PostingRole::Payables => &self.payables,
            PostingRole::SalesRevenue => &self.sales_revenue,
            PostingRole::SalesReturns => &self.sales_returns,
            PostingRole::Purchases => &self.purchases,
            PostingRole::OutputTax => &self.output_tax,
            PostingRole::InputTax => &self.input_tax,
        }
    }
}

/// Debit or credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Debit side.
    Debit,
    /// Credit side.
    Credit,
}

/// One journal line expressed in roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Account role.
    pub role: PostingRole,
    /// Side.
    pub side: Side,
    /// Amount, positive.
    pub amount: Decimal,
    /// Counterparty tag for partner lines.
    pub party: Option<PartyType>,
}

impl Posting {
    fn debit(role: PostingRole, amount: Decimal) -> Self {
        Self {
            role,
            side: Side::Debit,
            amount,
            party: None,
        }
    }

    fn credit(role: PostingRole, amount: Decimal) -> Self {
        Self {
            role,
            side: Side::Credit,
            amount,
            party: None,
        }
    }

    fn with_party(mut self, party: PartyType) -> Self {
        self.party = Some(party);
        self
    }
}

/// Postings for a document, or `None` when the type never posts.
///
/// `total` includes `tax`; the net part goes to the revenue, returns or
/// purchases role and the tax part to the VAT role. Zero tax lines are left
/// out.
#[must_use]
pub fn document_postings(
    document_type: DocumentType,
    total: Decimal,
    tax: Decimal,
) -> Option<Vec<Posting>> {
    let net = total - tax;
    let has_tax = !tax.is_zero();

    let postings = match document_type {
        DocumentType::Invoice => {
            let mut p = vec![
                Posting::debit(PostingRole::Receivables, total).with_party(PartyType::Customer),
                Posting::credit(PostingRole::SalesRevenue, net),
            ];
            if has_tax {
                p.push(Posting::credit(PostingRole::OutputTax, tax));
            }
            p
        }
        DocumentType::CreditNote => {
            let mut p = vec![Posting::debit(PostingRole::SalesReturns, net)];
            if has_tax {
                p.push(Posting::debit(PostingRole::OutputTax, tax));
            }
            p.push(
                Posting::credit(PostingRole::Receivables, total).with_party(PartyType::Customer),
            );
            p
        }
        DocumentType::Bill => {
            let mut p = vec![Posting::debit(PostingRole::Purchases, net)];
            if has_tax {
                p.push(Posting::debit(PostingRole::InputTax, tax));
            }
            p.push(Posting::credit(PostingRole::Payables, total).with_party(PartyType::Supplier));
            p
        }
        DocumentType::DebitNote => {
            let mut p = vec![
                Posting::debit(PostingRole::Payables, total).with_party(PartyType::Supplier),
                Posting::credit(PostingRole::Purchases, net),
            ];
            if has_tax {
                p.push(Posting::credit(PostingRole::InputTax, tax));
            }
            p
        }
        DocumentType::Quote | DocumentType::Order => return None,
    };

    Some(postings)
}

/// Postings for a voucher. The cash role stands for the voucher's own cash
/// account when it names one.
///
/// The partner line goes to receivables for customers and to payables for
/// anyone else, so a refund clears the same account its credit or debit
/// note opened.
#[must_use]
pub fn voucher_postings(
    voucher_type: VoucherType,
    counterparty: PartyType,
    amount: Decimal,
) -> Vec<Posting> {
    let partner_role = match counterparty {
        PartyType::Customer => PostingRole::Receivables,
        PartyType::Supplier | PartyType::Employee => PostingRole::Payables,
    };
    match voucher_type {
        VoucherType::Receipt => vec![
            Posting::debit(PostingRole::Cash, amount),
            Posting::credit(partner_role, amount).with_party(counterparty),
        ],
        VoucherType::Payment => vec![
            Posting::debit(partner_role, amount).with_party(counterparty),
            Posting::credit(PostingRole::Cash, amount),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn side_total(postings: &[Posting], side: Side) -> Decimal {
        postings.iter().filter(|p| p.side == side).map(|p| p.amount).sum()
    }

    #[test]
    fn test_invoice_mapping() {
        let postings = document_postings(DocumentType::Invoice, dec!(110), dec!(10)).unwrap();
        assert_eq!(
            postings,
            vec![
                Posting::debit(PostingRole::Receivables, dec!(110)).with_party(PartyType::Customer),
                Posting::credit(PostingRole::SalesRevenue, dec!(100)),
                Posting::credit(PostingRole::OutputTax, dec!(10)),
            ]
        );
    }

    #[test]
    fn test_zero_tax_line_is_omitted() {
        let postings = document_postings(DocumentType::Bill, dec!(500), dec!(0)).unwrap();
        assert_eq!(postings.len(), 2);
        assert!(postings.iter().all(|p| p.role != PostingRole::InputTax));
    }

    #[rstest]
    #[case(DocumentType::Invoice, PostingRole::Receivables, Side::Debit)]
    #[case(DocumentType::CreditNote, PostingRole::Receivables, Side::Credit)]
    #[case(DocumentType::Bill, PostingRole::Payables, Side::Credit)]
    #[case(DocumentType::DebitNote, PostingRole::Payables, Side::Debit)]
    fn test_partner_side(
        #[case] document_type: DocumentType,
        #[case] role: PostingRole,
        #[case] side: Side,
    ) {
        let postings = document_postings(document_type, dec!(115), dec!(15)).unwrap();
        let partner = postings.iter().find(|p| p.role == role).unwrap();
        assert_eq!(partner.side, side);
        assert_eq!(partner.amount, dec!(115));
        assert!(partner.party.is_some());
        assert_eq!(side_total(&postings, Side::Debit), side_total(&postings, Side::Credit));
    }

    #[rstest]
    #[case(DocumentType::Quote)]
    #[case(DocumentType::Order)]
    fn test_non_posting_documents(#[case] document_type: DocumentType) {
        assert!(document_postings(document_type, dec!(100), dec!(0)).is_none());
    }

    #[test]
    fn test_voucher_mapping() {
        let receipt = voucher_postings(VoucherType::Receipt, PartyType::Customer, dec!(250));
        assert_eq!(receipt[0].role, PostingRole::Cash);
        assert_eq!(receipt[0].side, Side::Debit);
        assert_eq!(receipt[1].role, PostingRole::Receivables);
        assert_eq!(receipt[1].party, Some(PartyType::Customer));

        let payment = voucher_postings(VoucherType::Payment, PartyType::Supplier, dec!(250));
        assert_eq!(payment[0].role, PostingRole::Payables);
        assert_eq!(payment[0].party, Some(PartyType::Supplier));
        assert_eq!(payment[1].role, PostingRole::Cash);
        assert_eq!(payment[1].side, Side::Credit);
    }

    #[rstest]
    #[case(VoucherType::Payment, PartyType::Customer, PostingRole::Receivables, Side::Debit)]
    #[case(VoucherType::Receipt, PartyType::Supplier, PostingRole::Payables, Side::Credit)]
    fn test_refunds_hit_the_partner_account(
        #[case] voucher_type: VoucherType,
        #[case] counterparty: PartyType,
        #[case] role: PostingRole,
        #[case] side: Side,
    ) {
        let postings = voucher_postings(voucher_type, counterparty, dec!(100));
        let partner = postings.iter().find(|p| p.party.is_some()).unwrap();
        assert_eq!(partner.role, role);
        assert_eq!(partner.side, side);
        assert_eq!(partner.party, Some(counterparty));
    }

    #[test]
    fn test_default_profile_codes() {
        let profile = PostingProfile::default();
        assert_eq!(profile.code_for(PostingRole::Receivables), "1120");
        assert_eq!(profile.code_for(PostingRole::OutputTax), "2120");
        assert_eq!(profile.code_for(PostingRole::Cash), "1111");
    }
}
