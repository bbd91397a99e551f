//! `SeaORM` entities for the ledger tables.
//!
//! Enumerated columns are stored as text and converted at the store
//! boundary.

pub mod accounts;
pub mod document_items;
pub mod document_payments;
pub mod documents;
pub mod journal_entries;
pub mod journal_entry_lines;
pub mod number_sequences;
pub mod vouchers;
