//! Persistence boundary.
//!
//! [`LedgerStore`] is the only way services reach storage. Every method is
//! scoped to one company and never returns another tenant's rows. Status
//! changes are conditional updates that report whether a row matched, so two
//! callers racing on the same record cannot both win.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ledgerline_shared::types::{
    AccountId, CompanyId, DocumentId, DocumentPaymentId, JournalEntryId, UserId, VoucherId,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{error, warn};

use crate::bridge::{
    Document, DocumentFilter, DocumentItem, DocumentPayment, DocumentStatus, Voucher,
    VoucherFilter, VoucherStatus,
};
use crate::ledger::{
    Account, AccountFilter, BalanceDelta, DateRange, EntryFilter, EntryStatus, JournalEntry,
    JournalEntryLine, PostedLine,
};

/// Result alias for store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a storage backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Row vanished between read and write.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Unique constraint violated; the payload names the constraint.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    /// Backend unreachable or timed out.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A guarded change of a journal entry's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryTransition {
    /// draft → posted.
    Post {
        /// Posting time.
        posted_at: DateTime<Utc>,
        /// Posting user.
        posted_by: UserId,
    },
    /// posted → reversed.
    Reverse {
        /// The entry that cancels this one.
        reversal_entry_id: JournalEntryId,
        /// Why.
        reason: String,
    },
    /// draft → cancelled.
    Cancel,
}

impl EntryTransition {
    /// Status the entry ends in.
    #[must_use]
    pub fn target(&self) -> EntryStatus {
        match self {
            Self::Post { .. } => EntryStatus::Posted,
            Self::Reverse { .. } => EntryStatus::Reversed,
            Self::Cancel => EntryStatus::Cancelled,
        }
    }

    /// Applies the transition to an in-memory entry.
    pub fn apply(&self, entry: &mut JournalEntry) {
        entry.status = self.target();
        match self {
            Self::Post { posted_at, posted_by } => {
                entry.posted_at = Some(*posted_at);
                entry.posted_by = Some(*posted_by);
            }
            Self::Reverse {
                reversal_entry_id,
                reason,
            } => {
                entry.reversal_entry_id = Some(*reversal_entry_id);
                entry.reversal_reason = Some(reason.clone());
            }
            Self::Cancel => {}
        }
    }
}

/// Failure of the header-plus-lines write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntryWriteError {
    /// Nothing was persisted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The header landed but the lines did not.
    #[error("lines for entry {entry_id} failed: {cause} (compensated: {compensated})")]
    Partial {
        /// Entry whose header was written.
        entry_id: JournalEntryId,
        /// Whether the header was removed again.
        compensated: bool,
        /// The line write failure.
        cause: StoreError,
    },
}

/// Storage operations needed by the ledger services.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // ========== Sequences ==========

    /// Atomically increments and returns the counter `key` of `company_id`.
    /// The first call for a key returns 1.
    async fn next_sequence_value(&self, company_id: CompanyId, key: &str) -> StoreResult<i64>;

    // ========== Accounts ==========

    /// Inserts an account. `Conflict` when the code exists in the company.
    async fn insert_account(&self, account: &Account) -> StoreResult<()>;

    /// Replaces an account. `Conflict` on a code clash, `NotFound` if missing.
    async fn update_account(&self, account: &Account) -> StoreResult<()>;

    /// Finds an account by id.
    async fn find_account(
        &self,
        company_id: CompanyId,
        id: AccountId,
    ) -> StoreResult<Option<Account>>;

    /// Finds an account by code.
    async fn find_account_by_code(
        &self,
        company_id: CompanyId,
        code: &str,
    ) -> StoreResult<Option<Account>>;

    /// Lists accounts passing `filter`, ordered by code.
    async fn list_accounts(
        &self,
        company_id: CompanyId,
        filter: &AccountFilter,
    ) -> StoreResult<Vec<Account>>;

    /// Number of lines of balance-affecting entries that reference the account.
    async fn count_posted_lines(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> StoreResult<u64>;

    /// Adds each delta to the cached `current_balance` in the account's
    /// normal direction.
    async fn apply_balance_deltas(
        &self,
        company_id: CompanyId,
        deltas: &[BalanceDelta],
    ) -> StoreResult<()>;

    /// Overwrites cached `current_balance` values.
    async fn set_current_balances(
        &self,
        company_id: CompanyId,
        balances: &[(AccountId, Decimal)],
    ) -> StoreResult<()>;

    // ========== Journal entries ==========

    /// Inserts an entry header. `Conflict` when the number is taken.
    async fn insert_entry(&self, entry: &JournalEntry) -> StoreResult<()>;

    /// Inserts lines of an existing entry.
    async fn insert_lines(
        &self,
        company_id: CompanyId,
        lines: &[JournalEntryLine],
    ) -> StoreResult<()>;

    /// Deletes an entry and its lines. Returns false if it did not exist.
    async fn delete_entry(&self, company_id: CompanyId, id: JournalEntryId) -> StoreResult<bool>;

    /// Finds an entry header.
    async fn find_entry(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
    ) -> StoreResult<Option<JournalEntry>>;

    /// Lines of an entry, ordered by line number.
    async fn find_lines(
        &self,
        company_id: CompanyId,
        entry_id: JournalEntryId,
    ) -> StoreResult<Vec<JournalEntryLine>>;

    /// A page of entries passing `filter`, ordered by date then number, and
    /// the total number of matches.
    async fn list_entries(
        &self,
        company_id: CompanyId,
        filter: &EntryFilter,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<JournalEntry>, u64)>;

    /// Lines of posted and reversed entries dated inside `range`, ordered by
    /// date, entry number, line number.
    async fn posted_lines(
        &self,
        company_id: CompanyId,
        range: DateRange,
        account_id: Option<AccountId>,
    ) -> StoreResult<Vec<PostedLine>>;

    /// Applies `transition` only if the entry is currently in `from`.
    /// Returns false when no row matched.
    async fn transition_entry(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
        from: EntryStatus,
        transition: &EntryTransition,
    ) -> StoreResult<bool>;

    /// Writes a header and its lines as one unit.
    ///
    /// Backends with transactions override this. The default writes the
    /// header, then the lines, and deletes the header again if the lines fail.
    async fn insert_entry_with_lines(
        &self,
        entry: &JournalEntry,
        lines: &[JournalEntryLine],
    ) -> Result<(), EntryWriteError> {
        self.insert_entry(entry).await?;

        let Err(cause) = self.insert_lines(entry.company_id, lines).await else {
            return Ok(());
        };

        warn!(
            entry_id = %entry.id,
            entry_number = %entry.entry_number,
            error = %cause,
            "line write failed, removing entry header"
        );

        let compensated = match self.delete_entry(entry.company_id, entry.id).await {
            Ok(_) => true,
            Err(delete_err) => {
                error!(
                    target: "ledgerline::reconciliation",
                    company_id = %entry.company_id,
                    entry_id = %entry.id,
                    entry_number = %entry.entry_number,
                    line_error = %cause,
                    delete_error = %delete_err,
                    "orphaned journal entry header requires reconciliation"
                );
                false
            }
        };

        Err(EntryWriteError::Partial {
            entry_id: entry.id,
            compensated,
            cause,
        })
    }

    // ========== Vouchers ==========

    /// Inserts a voucher. `Conflict` when the number is taken.
    async fn insert_voucher(&self, voucher: &Voucher) -> StoreResult<()>;

    /// Replaces a voucher.
    async fn update_voucher(&self, voucher: &Voucher) -> StoreResult<()>;

    /// Finds a voucher.
    async fn find_voucher(
        &self,
        company_id: CompanyId,
        id: VoucherId,
    ) -> StoreResult<Option<Voucher>>;

    /// Vouchers passing `filter`, ordered by date then number.
    async fn list_vouchers(
        &self,
        company_id: CompanyId,
        filter: &VoucherFilter,
    ) -> StoreResult<Vec<Voucher>>;

    /// Sets the status only if it is currently `expected`.
    async fn transition_voucher_status(
        &self,
        company_id: CompanyId,
        id: VoucherId,
        expected: VoucherStatus,
        to: VoucherStatus,
    ) -> StoreResult<bool>;

    /// Links the posted entry while the voucher is still `expected`. No other
    /// column is touched.
    async fn attach_voucher_entry(
        &self,
        company_id: CompanyId,
        id: VoucherId,
        expected: VoucherStatus,
        entry_id: JournalEntryId,
    ) -> StoreResult<bool>;

    // ========== Documents ==========

    /// Inserts a document with its items. `Conflict` when the number is taken.
    async fn insert_document(&self, document: &Document, items: &[DocumentItem])
    -> StoreResult<()>;

    /// Replaces a document header.
    async fn update_document(&self, document: &Document) -> StoreResult<()>;

    /// Finds a document header.
    async fn find_document(
        &self,
        company_id: CompanyId,
        id: DocumentId,
    ) -> StoreResult<Option<Document>>;

    /// Items of a document in input order.
    async fn find_document_items(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> StoreResult<Vec<DocumentItem>>;

    /// Documents passing `filter`, ordered by date then number.
    async fn list_documents(
        &self,
        company_id: CompanyId,
        filter: &DocumentFilter,
    ) -> StoreResult<Vec<Document>>;

    /// Sets the status only if it is currently `expected`.
    async fn transition_document_status(
        &self,
        company_id: CompanyId,
        id: DocumentId,
        expected: DocumentStatus,
        to: DocumentStatus,
    ) -> StoreResult<bool>;

    /// Links the generated entry while the document is still `expected`.
    /// Payment progress and status are left alone.
    async fn attach_document_entry(
        &self,
        company_id: CompanyId,
        id: DocumentId,
        expected: DocumentStatus,
        entry_id: JournalEntryId,
    ) -> StoreResult<bool>;

    // ========== Document payments ==========

    /// Inserts a settlement.
    async fn insert_payment(&self, payment: &DocumentPayment) -> StoreResult<()>;

    /// Deletes a settlement. Returns false if it did not exist.
    async fn delete_payment(
        &self,
        company_id: CompanyId,
        id: DocumentPaymentId,
    ) -> StoreResult<bool>;

    /// Finds a settlement.
    async fn find_payment(
        &self,
        company_id: CompanyId,
        id: DocumentPaymentId,
    ) -> StoreResult<Option<DocumentPayment>>;

    /// Settlements of a document.
    async fn payments_for_document(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> StoreResult<Vec<DocumentPayment>>;

    /// Settlements made by a voucher.
    async fn payments_for_voucher(
        &self,
        company_id: CompanyId,
        voucher_id: VoucherId,
    ) -> StoreResult<Vec<DocumentPayment>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ledger::ReferenceType;

    fn draft_entry() -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new(),
            company_id: CompanyId::new(),
            entry_number: "JE-2024-00001".to_string(),
            entry_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            description: "test".to_string(),
            reference_type: ReferenceType::Manual,
            reference_id: None,
            reference_number: None,
            total_debit: Decimal::ONE_HUNDRED,
            total_credit: Decimal::ONE_HUNDRED,
            status: EntryStatus::Draft,
            posted_at: None,
            posted_by: None,
            reversal_entry_id: None,
            reversed_entry_id: None,
            reversal_reason: None,
            is_reversal: false,
            created_by: UserId::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_post_transition_stamps_poster() {
        let mut entry = draft_entry();
        let user = UserId::new();
        let at = Utc::now();
        EntryTransition::Post {
            posted_at: at,
            posted_by: user,
        }
        .apply(&mut entry);

        assert_eq!(entry.status, EntryStatus::Posted);
        assert_eq!(entry.posted_at, Some(at));
        assert_eq!(entry.posted_by, Some(user));
    }

    #[test]
    fn test_reverse_transition_links_reversal() {
        let mut entry = draft_entry();
        let reversal = JournalEntryId::new();
        EntryTransition::Reverse {
            reversal_entry_id: reversal,
            reason: "duplicate".to_string(),
        }
        .apply(&mut entry);

        assert_eq!(entry.status, EntryStatus::Reversed);
        assert_eq!(entry.reversal_entry_id, Some(reversal));
        assert_eq!(entry.reversal_reason.as_deref(), Some("duplicate"));
    }

    #[test]
    fn test_targets() {
        assert_eq!(EntryTransition::Cancel.target(), EntryStatus::Cancelled);
        assert!(EntryStatus::Draft.can_transition_to(EntryTransition::Cancel.target()));
    }
}
