//! Business documents, vouchers and settlements.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerline_shared::types::{
    AccountId, CompanyId, DocumentId, DocumentItemId, DocumentPaymentId, JournalEntryId,
    PartnerId, PaymentMethodId, ProductId, UserId, VoucherId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::{NumberSeries, PartyType, ReferenceType};
use crate::permissions::Module;

/// Kind of business document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Sales invoice.
    Invoice,
    /// Supplier bill.
    Bill,
    /// Quotation; never posts.
    Quote,
    /// Sales order; never posts.
    Order,
    /// Sales return.
    CreditNote,
    /// Purchase return.
    DebitNote,
}

impl DocumentType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Bill => "bill",
            Self::Quote => "quote",
            Self::Order => "order",
            Self::CreditNote => "credit_note",
            Self::DebitNote => "debit_note",
        }
    }

    /// Parses a document type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "invoice" => Some(Self::Invoice),
            "bill" => Some(Self::Bill),
            "quote" => Some(Self::Quote),
            "order" => Some(Self::Order),
            "credit_note" => Some(Self::CreditNote),
            "debit_note" => Some(Self::DebitNote),
            _ => None,
        }
    }

    /// Permission module guarding the document.
    #[must_use]
    pub fn module(&self) -> Module {
        match self {
            Self::Invoice | Self::Quote | Self::Order | Self::CreditNote => Module::Sales,
            Self::Bill | Self::DebitNote => Module::Purchases,
        }
    }

    /// Number series of the document.
    #[must_use]
    pub fn series(&self) -> NumberSeries {
        match self {
            Self::Invoice => NumberSeries::Invoice,
            Self::Bill => NumberSeries::Bill,
            Self::Quote => NumberSeries::Quote,
            Self::Order => NumberSeries::Order,
            Self::CreditNote => NumberSeries::CreditNote,
            Self::DebitNote => NumberSeries::DebitNote,
        }
    }

    /// Reference type stamped on the generated entry; `None` when the document never posts.
    #[must_use]
    pub fn reference_type(&self) -> Option<ReferenceType> {
        match self {
            Self::Invoice => Some(ReferenceType::Invoice),
            Self::Bill => Some(ReferenceType::Bill),
            Self::CreditNote => Some(ReferenceType::CreditNote),
            Self::DebitNote => Some(ReferenceType::DebitNote),
            Self::Quote | Self::Order => None,
        }
    }

    /// Voucher type that settles an open balance on this document.
    ///
    /// Customers pay invoices and suppliers refund debit notes (receipts);
    /// the company pays bills and refunds credit notes (payments).
    ///
    /// The settling voucher must also name [`Self::counterparty`] so its
    /// partner line lands on the same receivable or payable account.
    #[must_use]
    pub fn settled_by(&self) -> Option<VoucherType> {
        match self {
            Self::Invoice | Self::DebitNote => Some(VoucherType::Receipt),
            Self::Bill | Self::CreditNote => Some(VoucherType::Payment),
            Self::Quote | Self::Order => None,
        }
    }

    /// Kind of partner the document is with.
    #[must_use]
    pub fn counterparty(&self) -> PartyType {
        match self {
            Self::Invoice | Self::CreditNote | Self::Quote | Self::Order => PartyType::Customer,
            Self::Bill | Self::DebitNote => PartyType::Supplier,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Document lifecycle status.
///
/// - Draft → Pending (submit)
/// - Draft | Pending → Approved (approve, posts to the ledger)
/// - Draft | Pending → Cancelled (cancel)
/// - Approved ⇄ Paid (payments)
/// - Approved → Void (void, reverses the ledger entry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Being prepared.
    Draft,
    /// Submitted for approval.
    Pending,
    /// Approved and posted.
    Approved,
    /// Fully settled.
    Paid,
    /// Voided after approval.
    Void,
    /// Abandoned before approval.
    Cancelled,
}

impl DocumentStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Paid => "paid",
            Self::Void => "void",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "paid" => Some(Self::Paid),
            "void" => Some(Self::Void),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true before approval.
    #[must_use]
    pub fn is_open_for_approval(&self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }
}

/// A business document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document ID.
    pub id: DocumentId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Kind of document.
    pub document_type: DocumentType,
    /// Sequential number (`INV-2024-00001`).
    pub document_number: String,
    /// Document date; the generated entry carries this date.
    pub date: NaiveDate,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Customer or supplier.
    pub partner_id: Option<PartnerId>,
    /// Sum of item nets.
    pub subtotal: Decimal,
    /// Sum of item taxes.
    pub tax_total: Decimal,
    /// Header-level discount.
    pub discount_total: Decimal,
    /// `subtotal + tax_total − discount_total`.
    pub total_amount: Decimal,
    /// Sum of allocated payments.
    pub paid_amount: Decimal,
    /// Lifecycle status.
    pub status: DocumentStatus,
    /// Free text.
    pub notes: Option<String>,
    /// Journal entry produced on approval.
    pub generated_entry_id: Option<JournalEntryId>,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// `total_amount − paid_amount`.
    #[must_use]
    pub fn remaining_amount(&self) -> Decimal {
        self.total_amount - self.paid_amount
    }
}

/// A document line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentItem {
    /// Item ID.
    pub id: DocumentItemId,
    /// Owning document.
    pub document_id: DocumentId,
    /// Product sold or bought.
    pub product_id: Option<ProductId>,
    /// Line text.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Line discount.
    pub discount_amount: Decimal,
    /// Tax rate in percent.
    pub tax_rate: Decimal,
    /// Computed tax.
    pub tax_amount: Decimal,
    /// Net plus tax.
    pub total: Decimal,
}

/// Input for a document line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocumentItem {
    /// Product sold or bought.
    pub product_id: Option<ProductId>,
    /// Line text.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price.
    pub unit_price: Decimal,
    /// Line discount.
    pub discount_amount: Decimal,
    /// Tax rate in percent.
    pub tax_rate: Decimal,
}

impl NewDocumentItem {
    /// An item without discount or tax.
    #[must_use]
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            product_id: None,
            description: description.into(),
            quantity,
            unit_price,
            discount_amount: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
        }
    }

    /// Sets the tax rate (percent).
    #[must_use]
    pub fn with_tax_rate(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Sets the line discount.
    #[must_use]
    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount_amount = discount;
        self
    }
}

/// Input for creating a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    /// Kind of document.
    pub document_type: DocumentType,
    /// Document date.
    pub date: NaiveDate,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Customer or supplier.
    pub partner_id: Option<PartnerId>,
    /// Header-level discount.
    pub discount_total: Decimal,
    /// Free text.
    pub notes: Option<String>,
    /// Line items.
    pub items: Vec<NewDocumentItem>,
}

/// A document with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentWithItems {
    /// Header.
    pub document: Document,
    /// Items in input order.
    pub items: Vec<DocumentItem>,
}

/// Filter options for listing documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    /// Filter by kind.
    pub document_type: Option<DocumentType>,
    /// Filter by status.
    pub status: Option<DocumentStatus>,
    /// Filter by partner.
    pub partner_id: Option<PartnerId>,
}

impl DocumentFilter {
    /// Returns true if `document` passes the filter.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.document_type.is_none_or(|t| document.document_type == t)
            && self.status.is_none_or(|s| document.status == s)
            && self.partner_id.is_none_or(|p| document.partner_id == Some(p))
    }
}

/// Direction of a cash voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherType {
    /// Money in.
    Receipt,
    /// Money out.
    Payment,
}

impl VoucherType {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receipt => "receipt",
            Self::Payment => "payment",
        }
    }

    /// Parses a voucher type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "receipt" => Some(Self::Receipt),
            "payment" => Some(Self::Payment),
            _ => None,
        }
    }

    /// Number series of the voucher.
    #[must_use]
    pub fn series(&self) -> NumberSeries {
        match self {
            Self::Receipt => NumberSeries::ReceiptVoucher,
            Self::Payment => NumberSeries::PaymentVoucher,
        }
    }

    /// Usual counterparty: customers pay receipts, suppliers get payments.
    #[must_use]
    pub fn default_counterparty(&self) -> PartyType {
        match self {
            Self::Receipt => PartyType::Customer,
            Self::Payment => PartyType::Supplier,
        }
    }

    /// Reference type stamped on the generated entry.
    #[must_use]
    pub fn reference_type(&self) -> ReferenceType {
        match self {
            Self::Receipt => ReferenceType::Receipt,
            Self::Payment => ReferenceType::Payment,
        }
    }
}

/// Voucher lifecycle status: Draft → Posted → Void.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Being prepared.
    Draft,
    /// Posted to the ledger.
    Posted,
    /// Voided; its entry is reversed.
    Void,
}

impl VoucherStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Void => "void",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            "void" => Some(Self::Void),
            _ => None,
        }
    }
}

/// A receipt or payment voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Voucher ID.
    pub id: VoucherId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Sequential number (`RV-2024-00001`).
    pub voucher_number: String,
    /// Direction.
    pub voucher_type: VoucherType,
    /// Customer or supplier.
    pub partner_id: Option<PartnerId>,
    /// Kind of partner; picks receivables or payables for the partner line.
    pub counterparty: PartyType,
    /// Amount moved.
    pub amount: Decimal,
    /// Voucher date.
    pub date: NaiveDate,
    /// How the money moved.
    pub payment_method_id: Option<PaymentMethodId>,
    /// Cash or bank account the money moved through; profile default when `None`.
    pub cash_account_id: Option<AccountId>,
    /// Narrative.
    pub description: Option<String>,
    /// Lifecycle status.
    pub status: VoucherStatus,
    /// Entry produced on posting.
    pub journal_entry_id: Option<JournalEntryId>,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVoucher {
    /// Direction.
    pub voucher_type: VoucherType,
    /// Customer or supplier.
    pub partner_id: Option<PartnerId>,
    /// Kind of partner; the voucher type's usual one when `None`.
    #[serde(default)]
    pub counterparty: Option<PartyType>,
    /// Amount moved, positive.
    pub amount: Decimal,
    /// Voucher date.
    pub date: NaiveDate,
    /// How the money moved.
    pub payment_method_id: Option<PaymentMethodId>,
    /// Cash or bank account override.
    pub cash_account_id: Option<AccountId>,
    /// Narrative.
    pub description: Option<String>,
}

/// Filter options for listing vouchers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoucherFilter {
    /// Filter by direction.
    pub voucher_type: Option<VoucherType>,
    /// Filter by status.
    pub status: Option<VoucherStatus>,
    /// Vouchers dated on or after.
    pub date_from: Option<NaiveDate>,
    /// Vouchers dated on or before.
    pub date_to: Option<NaiveDate>,
}

impl VoucherFilter {
    /// Returns true if `voucher` passes the filter.
    #[must_use]
    pub fn matches(&self, voucher: &Voucher) -> bool {
        self.voucher_type.is_none_or(|t| voucher.voucher_type == t)
            && self.status.is_none_or(|s| voucher.status == s)
            && self.date_from.is_none_or(|from| voucher.date >= from)
            && self.date_to.is_none_or(|to| voucher.date <= to)
    }
}

/// Settlement of (part of) a document by a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPayment {
    /// Settlement ID.
    pub id: DocumentPaymentId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Paying voucher.
    pub voucher_id: VoucherId,
    /// Settled document.
    pub document_id: DocumentId,
    /// Amount allocated.
    pub amount: Decimal,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Posted voucher totals over a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherStats {
    /// Sum of posted receipts.
    pub total_receipts: Decimal,
    /// Sum of posted payments.
    pub total_payments: Decimal,
    /// Number of posted receipts.
    pub receipt_count: u64,
    /// Number of posted payments.
    pub payment_count: u64,
    /// Receipts minus payments.
    pub net_cash_flow: Decimal,
}
