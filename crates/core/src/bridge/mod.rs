//! Document-to-ledger bridge.
//!
//! Invoices, bills and notes post through a fixed mapping onto the accounts
//! named by a [`PostingProfile`]. Receipt and payment vouchers post cash
//! movements and settle approved documents.

pub mod posting;
pub mod service;
pub mod totals;
pub mod types;

#[cfg(test)]
mod posting_props;

pub use posting::{Posting, PostingProfile, PostingRole, Side, document_postings, voucher_postings};
pub use service::DocumentBridge;
pub use totals::{DocumentTotals, ItemTotals};
pub use types::{
    Document, DocumentFilter, DocumentItem, DocumentPayment, DocumentStatus, DocumentType,
    DocumentWithItems, NewDocument, NewDocumentItem, NewVoucher, Voucher, VoucherFilter,
    VoucherStats, VoucherStatus, VoucherType,
};
