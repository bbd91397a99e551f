//! Core business logic for Ledgerline.
//!
//! Multi-tenant double-entry accounting with no web or database
//! dependencies. Persistence goes through the [`store::LedgerStore`] trait;
//! `ledgerline-db` provides the PostgreSQL and offline implementations.
//!
//! # Modules
//!
//! - `ledger` - Double-entry types, validation and balance arithmetic
//! - `accounts` - Chart of accounts registry
//! - `journal` - Journal entry lifecycle (create, post, reverse)
//! - `balances` - Balance aggregation and account ledgers
//! - `bridge` - Documents and vouchers to journal entries
//! - `reports` - Trial balance, income statement, balance sheet
//! - `permissions` - Role-based permission gate

pub mod accounts;
pub mod balances;
pub mod bridge;
pub mod context;
pub mod journal;
pub mod ledger;
pub mod permissions;
pub mod reports;
pub mod store;

pub use context::TenantContext;
pub use ledger::{ErrorKind, LedgerError, LedgerResult};
