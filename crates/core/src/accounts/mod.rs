//! Ledger account registry.
//!
//! Accounts form a per-company tree. Header accounts aggregate their
//! descendants and take no postings; leaves carry the journal lines.

pub mod service;
pub mod template;

pub use service::AccountRegistry;
pub use template::{DEFAULT_CHART, TemplateAccount};
