//! Journal entry engine: the double-entry core.

pub mod service;
mod sequence;

pub(crate) use sequence::with_next_number;
pub use service::{DEFAULT_NUMBER_RETRY_LIMIT, JournalEngine, ReversalOutcome};
