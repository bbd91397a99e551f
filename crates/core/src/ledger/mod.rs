//! Double-entry bookkeeping domain.
//!
//! This module holds the pure ledger logic shared by every service:
//! - Account and journal entry types
//! - Line validation (one-sided lines, exact balance)
//! - Reversal construction
//! - Balance calculations and header rollups
//! - Number series formatting
//! - Error types for ledger operations

pub mod account;
pub mod balance;
pub mod entry;
pub mod error;
pub mod numbering;
pub mod reversal;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod validation_props;

pub use account::{Account, AccountFilter, AccountNode, AccountPatch, NewAccount};
pub use balance::{AccountActivity, BalanceDelta, BalanceDirection, RunningLine};
pub use entry::{
    DateRange, EntryFilter, JournalEntry, JournalEntryLine, JournalEntryWithLines, NewJournalEntry,
    NewJournalLine, PostedLine,
};
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use numbering::NumberSeries;
pub use reversal::ReversalBuilder;
pub use types::{AccountType, EntryStatus, NormalBalance, PartyType, ReferenceType};
pub use validation::{EntryTotals, validate_lines};
