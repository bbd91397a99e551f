//! Ledger error types.
//!
//! Every service in the crate returns `LedgerResult<T>`. Errors carry the
//! violated invariant in their message and classify into an [`ErrorKind`] so
//! callers can tell "not found" from "validation failed" from "storage down".

use ledgerline_shared::AppError;
use ledgerline_shared::types::{AccountId, DocumentId, DocumentPaymentId, JournalEntryId, VoucherId};
use rust_decimal::Decimal;
use thiserror::Error;

use super::types::EntryStatus;
use crate::permissions::{Action, Module, Role};
use crate::store::{EntryWriteError, StoreError};

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller data violates a domain invariant; nothing was persisted.
    Validation,
    /// Uniqueness clash reported by storage.
    Conflict,
    /// Operation not legal in the current state.
    State,
    /// A multi-step write failed part-way.
    PersistencePartialFailure,
    /// Referenced entity does not exist in the tenant.
    NotFound,
    /// Role lacks the permission.
    PermissionDenied,
    /// Backend unavailable or failing.
    Storage,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Debits and credits differ.
    #[error("entry is not balanced: debit {debit} ≠ credit {credit}")]
    UnbalancedEntry {
        /// Sum of debit amounts.
        debit: Decimal,
        /// Sum of credit amounts.
        credit: Decimal,
    },

    /// Entry has fewer than two lines.
    #[error("entry must have at least 2 lines, got {0}")]
    InsufficientLines(usize),

    /// A line breaks the one-sided, non-negative amount rule.
    #[error("line {line_number} is invalid: {reason}")]
    InvalidLine {
        /// 1-based line number.
        line_number: usize,
        /// What is wrong with the line.
        reason: &'static str,
    },

    /// No tenant on the call.
    #[error("company context is missing")]
    MissingCompanyContext,

    /// Generic field validation failure.
    #[error("{field}: {message}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What is wrong.
        message: String,
    },

    /// Header accounts aggregate their children and take no postings.
    #[error("account {0} is a header account and cannot be posted to")]
    HeaderAccountNotPostable(AccountId),

    /// Account is soft-deleted.
    #[error("account {0} is inactive")]
    AccountInactive(AccountId),

    /// Parent chain would loop.
    #[error("account {0} cannot be moved under itself or a descendant")]
    CyclicHierarchy(AccountId),

    /// Only header accounts may have children.
    #[error("account {0} is postable and cannot have child accounts")]
    ParentNotHeader(AccountId),

    /// Quotes and orders never reach the ledger.
    #[error("document {0} of this type does not post to the ledger")]
    NonPostingDocument(DocumentId),

    /// Posting profile has no account for a role.
    #[error("no account with code {code} for posting role {role}")]
    PostingAccountMissing {
        /// Posting role name.
        role: &'static str,
        /// Account code looked up.
        code: String,
    },

    /// Payment would overpay the document or overdraw the voucher.
    #[error("payment of {amount} exceeds the open amount {open}")]
    Overpayment {
        /// Requested amount.
        amount: Decimal,
        /// Amount still open.
        open: Decimal,
    },

    // ========== Conflict Errors ==========
    /// Account code already exists in the company.
    #[error("account code '{0}' already exists")]
    DuplicateCode(String),

    /// Entry/voucher/document number collided after every retry.
    #[error("number '{0}' is already taken")]
    DuplicateNumber(String),

    // ========== State Errors ==========
    /// Journal entry status does not allow the transition.
    #[error("journal entry {id} cannot go from {from} to {to}")]
    InvalidStatusTransition {
        /// Entry id.
        id: JournalEntryId,
        /// Current status.
        from: EntryStatus,
        /// Requested status.
        to: EntryStatus,
    },

    /// Document or voucher status does not allow the operation.
    #[error("{entity} is {status}; cannot {operation}")]
    InvalidDocumentState {
        /// "document" or "voucher".
        entity: &'static str,
        /// Current status label.
        status: &'static str,
        /// Attempted operation.
        operation: &'static str,
    },

    /// Account has posted journal lines.
    #[error("account {0} has posted journal lines")]
    AccountHasPostings(AccountId),

    /// Account has active children.
    #[error("account {0} has active child accounts")]
    AccountHasChildren(AccountId),

    /// Document has settlements against it.
    #[error("document {0} has payments allocated")]
    DocumentHasPayments(DocumentId),

    // ========== Not Found ==========
    /// Account missing in the tenant.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account code missing in the tenant.
    #[error("account code not found: {0}")]
    AccountCodeNotFound(String),

    /// Journal entry missing in the tenant.
    #[error("journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// Voucher missing in the tenant.
    #[error("voucher not found: {0}")]
    VoucherNotFound(VoucherId),

    /// Document missing in the tenant.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Settlement missing in the tenant.
    #[error("document payment not found: {0}")]
    PaymentNotFound(DocumentPaymentId),

    // ========== Permission ==========
    /// Role lacks the permission.
    #[error("role {role} may not {action} in {module}")]
    PermissionDenied {
        /// Caller's role.
        role: Role,
        /// Module checked.
        module: Module,
        /// Action checked.
        action: Action,
    },

    // ========== Persistence ==========
    /// Multi-step write failed after the first step landed.
    #[error("partial write for entry {entry_id}: {cause} (compensated: {compensated})")]
    PersistencePartialFailure {
        /// Entry whose header was written.
        entry_id: JournalEntryId,
        /// Whether the compensating delete succeeded.
        compensated: bool,
        /// Underlying failure.
        cause: String,
    },

    /// Storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl LedgerError {
    /// Classifies the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnbalancedEntry { .. }
            | Self::InsufficientLines(_)
            | Self::InvalidLine { .. }
            | Self::MissingCompanyContext
            | Self::InvalidField { .. }
            | Self::HeaderAccountNotPostable(_)
            | Self::AccountInactive(_)
            | Self::CyclicHierarchy(_)
            | Self::ParentNotHeader(_)
            | Self::NonPostingDocument(_)
            | Self::PostingAccountMissing { .. }
            | Self::Overpayment { .. } => ErrorKind::Validation,
            Self::DuplicateCode(_) | Self::DuplicateNumber(_) => ErrorKind::Conflict,
            Self::InvalidStatusTransition { .. }
            | Self::InvalidDocumentState { .. }
            | Self::AccountHasPostings(_)
            | Self::AccountHasChildren(_)
            | Self::DocumentHasPayments(_) => ErrorKind::State,
            Self::AccountNotFound(_)
            | Self::AccountCodeNotFound(_)
            | Self::EntryNotFound(_)
            | Self::VoucherNotFound(_)
            | Self::DocumentNotFound(_)
            | Self::PaymentNotFound(_) => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::PersistencePartialFailure { .. } => ErrorKind::PersistencePartialFailure,
            Self::Storage(StoreError::NotFound(_)) => ErrorKind::NotFound,
            Self::Storage(StoreError::Conflict(_)) => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::InsufficientLines(_) => "INSUFFICIENT_LINES",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::MissingCompanyContext => "MISSING_COMPANY_CONTEXT",
            Self::InvalidField { .. } => "INVALID_FIELD",
            Self::HeaderAccountNotPostable(_) => "HEADER_ACCOUNT_NOT_POSTABLE",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::CyclicHierarchy(_) => "CYCLIC_HIERARCHY",
            Self::ParentNotHeader(_) => "PARENT_NOT_HEADER",
            Self::NonPostingDocument(_) => "NON_POSTING_DOCUMENT",
            Self::PostingAccountMissing { .. } => "POSTING_ACCOUNT_MISSING",
            Self::Overpayment { .. } => "OVERPAYMENT",
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::DuplicateNumber(_) => "DUPLICATE_NUMBER",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::InvalidDocumentState { .. } => "INVALID_DOCUMENT_STATE",
            Self::AccountHasPostings(_) => "ACCOUNT_HAS_POSTINGS",
            Self::AccountHasChildren(_) => "ACCOUNT_HAS_CHILDREN",
            Self::DocumentHasPayments(_) => "DOCUMENT_HAS_PAYMENTS",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountCodeNotFound(_) => "ACCOUNT_CODE_NOT_FOUND",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::PaymentNotFound(_) => "PAYMENT_NOT_FOUND",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::PersistencePartialFailure { .. } => "PERSISTENCE_PARTIAL_FAILURE",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::PermissionDenied => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::State => 422,
            ErrorKind::PersistencePartialFailure => 500,
            ErrorKind::Storage => 503,
        }
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateNumber(_)
                | Self::Storage(StoreError::Conflict(_) | StoreError::Unavailable(_))
        )
    }
}

impl From<EntryWriteError> for LedgerError {
    fn from(err: EntryWriteError) -> Self {
        match err {
            EntryWriteError::Store(e) => Self::Storage(e),
            EntryWriteError::Partial {
                entry_id,
                compensated,
                cause,
            } => Self::PersistencePartialFailure {
                entry_id,
                compensated,
                cause: cause.to_string(),
            },
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::State => Self::PreconditionFailed(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::PermissionDenied => Self::Forbidden(message),
            ErrorKind::Storage => Self::Storage(message),
            ErrorKind::PersistencePartialFailure => Self::Internal(message),
        }
    }
}
