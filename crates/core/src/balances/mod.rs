//! Balance aggregation.
//!
//! Balances are recomputed from posted lines on demand. The cached
//! `current_balance` on each account is maintained incrementally by posting
//! and rebuilt in full by [`BalanceAggregator::recalculate`].

pub mod service;
pub mod types;

pub use service::BalanceAggregator;
pub use types::{AccountBalanceRow, AccountLedger, BalanceQuery};
