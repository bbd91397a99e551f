//! Journal entries and their lines.

use chrono::{DateTime, NaiveDate, Utc};
use ledgerline_shared::types::{
    AccountId, CompanyId, JournalEntryId, JournalLineId, PartnerId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{EntryStatus, PartyType, ReferenceType};

/// Journal entry header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Entry ID.
    pub id: JournalEntryId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Sequential number, unique within the company (`JE-2024-00001`).
    pub entry_number: String,
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Narrative.
    pub description: String,
    /// What produced the entry.
    pub reference_type: ReferenceType,
    /// Id of the producing record (document, voucher, reversed entry).
    pub reference_id: Option<Uuid>,
    /// Human-facing number of the producing record.
    pub reference_number: Option<String>,
    /// Sum of line debits.
    pub total_debit: Decimal,
    /// Sum of line credits.
    pub total_credit: Decimal,
    /// Lifecycle status.
    pub status: EntryStatus,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// Who posted the entry.
    pub posted_by: Option<UserId>,
    /// On a reversed entry: the entry that reversed it.
    pub reversal_entry_id: Option<JournalEntryId>,
    /// On a reversal entry: the entry it reverses.
    pub reversed_entry_id: Option<JournalEntryId>,
    /// Why the entry was reversed.
    pub reversal_reason: Option<String>,
    /// True for entries created by `reverse`.
    pub is_reversal: bool,
    /// Author.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }
}

/// A persisted journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    /// Line ID.
    pub id: JournalLineId,
    /// Owning entry.
    pub journal_entry_id: JournalEntryId,
    /// Account posted to.
    pub account_id: AccountId,
    /// 1-based position within the entry.
    pub line_number: i32,
    /// Line narrative.
    pub description: Option<String>,
    /// Debit amount (zero on credit lines).
    pub debit_amount: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit_amount: Decimal,
    /// Counterparty kind.
    pub party_type: Option<PartyType>,
    /// Counterparty.
    pub party_id: Option<PartnerId>,
}

/// Input for one journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJournalLine {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit_amount: Decimal,
    /// Credit amount.
    pub credit_amount: Decimal,
    /// Line narrative.
    pub description: Option<String>,
    /// Counterparty kind.
    pub party_type: Option<PartyType>,
    /// Counterparty.
    pub party_id: Option<PartnerId>,
}

impl NewJournalLine {
    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit_amount: amount,
            credit_amount: Decimal::ZERO,
            description: None,
            party_type: None,
            party_id: None,
        }
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit_amount: Decimal::ZERO,
            credit_amount: amount,
            description: None,
            party_type: None,
            party_id: None,
        }
    }

    /// Sets the line narrative.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Tags the line with a counterparty.
    #[must_use]
    pub fn with_party(mut self, party_type: PartyType, party_id: Option<PartnerId>) -> Self {
        self.party_type = Some(party_type);
        self.party_id = party_id;
        self
    }
}

impl From<&JournalEntryLine> for NewJournalLine {
    fn from(line: &JournalEntryLine) -> Self {
        Self {
            account_id: line.account_id,
            debit_amount: line.debit_amount,
            credit_amount: line.credit_amount,
            description: line.description.clone(),
            party_type: line.party_type,
            party_id: line.party_id,
        }
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    /// Accounting date.
    pub entry_date: NaiveDate,
    /// Narrative.
    pub description: String,
    /// What produced the entry.
    pub reference_type: ReferenceType,
    /// Id of the producing record.
    pub reference_id: Option<Uuid>,
    /// Human-facing number of the producing record.
    pub reference_number: Option<String>,
    /// Lines in posting order.
    pub lines: Vec<NewJournalLine>,
}

impl NewJournalEntry {
    /// A manual entry.
    #[must_use]
    pub fn manual(
        entry_date: NaiveDate,
        description: impl Into<String>,
        lines: Vec<NewJournalLine>,
    ) -> Self {
        Self {
            entry_date,
            description: description.into(),
            reference_type: ReferenceType::Manual,
            reference_id: None,
            reference_number: None,
            lines,
        }
    }

    /// Sets the producing record.
    #[must_use]
    pub fn with_reference(
        mut self,
        reference_type: ReferenceType,
        reference_id: Uuid,
        reference_number: Option<String>,
    ) -> Self {
        self.reference_type = reference_type;
        self.reference_id = Some(reference_id);
        self.reference_number = reference_number;
        self
    }
}

/// An entry together with its lines, ordered by line number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryWithLines {
    /// Header.
    pub entry: JournalEntry,
    /// Lines.
    pub lines: Vec<JournalEntryLine>,
}

/// Filter options for listing entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    /// Filter by status.
    pub status: Option<EntryStatus>,
    /// Entries dated on or after.
    pub date_from: Option<NaiveDate>,
    /// Entries dated on or before.
    pub date_to: Option<NaiveDate>,
    /// Filter by producer kind.
    pub reference_type: Option<ReferenceType>,
    /// Filter by producer id.
    pub reference_id: Option<Uuid>,
}

impl EntryFilter {
    /// Returns true if `entry` passes the filter.
    #[must_use]
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        self.status.is_none_or(|s| entry.status == s)
            && self.date_from.is_none_or(|from| entry.entry_date >= from)
            && self.date_to.is_none_or(|to| entry.entry_date <= to)
            && self.reference_type.is_none_or(|t| entry.reference_type == t)
            && self.reference_id.is_none_or(|id| entry.reference_id == Some(id))
    }
}

/// A line of a balance-affecting entry, flattened with its header fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostedLine {
    /// Owning entry.
    pub entry_id: JournalEntryId,
    /// Entry number.
    pub entry_number: String,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry narrative.
    pub entry_description: String,
    /// Account posted to.
    pub account_id: AccountId,
    /// Position within the entry.
    pub line_number: i32,
    /// Line narrative.
    pub description: Option<String>,
    /// Debit amount.
    pub debit_amount: Decimal,
    /// Credit amount.
    pub credit_amount: Decimal,
}

/// Date window for posted-line queries. Both bounds inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day, unbounded when `None`.
    pub from: Option<NaiveDate>,
    /// Last day, unbounded when `None`.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Everything up to and including `as_of`.
    #[must_use]
    pub fn as_of(as_of: NaiveDate) -> Self {
        Self { from: None, to: Some(as_of) }
    }

    /// Inclusive window.
    #[must_use]
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from: Some(from), to: Some(to) }
    }

    /// Returns true if `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}
