//! Journal entry engine.
//!
//! Entries move `draft → posted → reversed` or `draft → cancelled`. Every
//! status change is a conditional update in the store, so of two callers
//! racing on the same entry exactly one succeeds and the other gets
//! `InvalidStatusTransition`.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ledgerline_shared::config::LedgerConfig;
use ledgerline_shared::types::{
    AccountId, CompanyId, JournalEntryId, JournalLineId, PageRequest, PageResponse, UserId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::sequence::with_next_number;
use crate::context::TenantContext;
use crate::ledger::balance::{compute_deltas, expand_to_ancestors};
use crate::ledger::{
    AccountFilter, EntryFilter, EntryStatus, JournalEntry, JournalEntryLine,
    JournalEntryWithLines, LedgerError, LedgerResult, NewJournalEntry, NumberSeries,
    ReversalBuilder, validate_lines,
};
use crate::permissions::{Action, Module};
use crate::store::{EntryTransition, LedgerStore};

/// Default number of fresh entry numbers drawn after a conflict.
pub const DEFAULT_NUMBER_RETRY_LIMIT: u32 = 3;

/// Result of reversing an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReversalOutcome {
    /// The original entry, now reversed.
    pub original: JournalEntry,
    /// The posted entry that cancels it.
    pub reversal: JournalEntryWithLines,
}

/// How strictly line accounts are checked on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccountCheck {
    /// Active, non-header accounts only.
    Postable,
    /// Deactivated accounts allowed; used for reversals.
    AllowInactive,
}

/// Creates, posts, reverses and deletes journal entries.
pub struct JournalEngine<S: ?Sized> {
    store: Arc<S>,
    number_retry_limit: u32,
}

impl<S: ?Sized> Clone for JournalEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            number_retry_limit: self.number_retry_limit,
        }
    }
}

impl<S: LedgerStore + ?Sized> JournalEngine<S> {
    /// Creates an engine over `store`.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            number_retry_limit: DEFAULT_NUMBER_RETRY_LIMIT,
        }
    }

    /// Creates an engine using the ledger settings.
    #[must_use]
    pub fn with_config(store: Arc<S>, config: &LedgerConfig) -> Self {
        Self::new(store).with_number_retry_limit(config.number_retry_limit)
    }

    /// Sets how many fresh numbers are drawn after a numbering conflict.
    #[must_use]
    pub fn with_number_retry_limit(mut self, limit: u32) -> Self {
        self.number_retry_limit = limit;
        self
    }

    /// Validates and stores a draft entry.
    ///
    /// Nothing is persisted when validation fails. Lines keep their input
    /// order and are numbered from 1.
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: NewJournalEntry,
    ) -> LedgerResult<JournalEntryWithLines> {
        let company_id = ctx.require(Module::Accounting, Action::Create)?;
        self.create_draft(company_id, ctx.user_id, input, None).await
    }

    /// Posts a draft entry and applies it to cached account balances.
    ///
    /// Posting an entry that is not a draft fails with
    /// `InvalidStatusTransition` and leaves it untouched.
    pub async fn post(
        &self,
        ctx: &TenantContext,
        id: JournalEntryId,
    ) -> LedgerResult<JournalEntry> {
        let company_id = ctx.require(Module::Accounting, Action::Approve)?;
        self.post_draft(company_id, ctx.user_id, id).await
    }

    /// Reverses a posted entry with a new, posted entry dated today.
    ///
    /// Succeeds once both entries are in their final status even if the
    /// cached balances could not be updated; `BalanceAggregator::recalculate`
    /// repairs them.
    pub async fn reverse(
        &self,
        ctx: &TenantContext,
        id: JournalEntryId,
        reason: &str,
    ) -> LedgerResult<ReversalOutcome> {
        let company_id = ctx.require(Module::Accounting, Action::Void)?;
        self.reverse_posted(company_id, ctx.user_id, id, reason, Utc::now().date_naive())
            .await
    }

    /// Cancels a draft entry.
    pub async fn cancel(
        &self,
        ctx: &TenantContext,
        id: JournalEntryId,
    ) -> LedgerResult<JournalEntry> {
        let company_id = ctx.require(Module::Accounting, Action::Edit)?;
        if !self
            .store
            .transition_entry(company_id, id, EntryStatus::Draft, &EntryTransition::Cancel)
            .await?
        {
            return Err(self.transition_failure(company_id, id, EntryStatus::Cancelled).await);
        }
        info!(company_id = %company_id, entry_id = %id, "journal entry cancelled");
        self.fetch(company_id, id).await
    }

    /// Deletes a draft or cancelled entry with its lines.
    ///
    /// A draft is moved to cancelled first so a concurrent `post` cannot
    /// slip in between the check and the delete.
    pub async fn delete(&self, ctx: &TenantContext, id: JournalEntryId) -> LedgerResult<()> {
        let company_id = ctx.require(Module::Accounting, Action::Delete)?;
        let entry = self.fetch(company_id, id).await?;

        match entry.status {
            EntryStatus::Draft => {
                if !self
                    .store
                    .transition_entry(company_id, id, EntryStatus::Draft, &EntryTransition::Cancel)
                    .await?
                {
                    return Err(self
                        .transition_failure(company_id, id, EntryStatus::Cancelled)
                        .await);
                }
            }
            EntryStatus::Cancelled => {}
            status => {
                return Err(LedgerError::InvalidStatusTransition {
                    id,
                    from: status,
                    to: EntryStatus::Cancelled,
                });
            }
        }

        if !self.store.delete_entry(company_id, id).await? {
            return Err(LedgerError::EntryNotFound(id));
        }
        info!(
            company_id = %company_id,
            entry_id = %id,
            number = %entry.entry_number,
            "journal entry deleted"
        );
        Ok(())
    }

    /// Gets an entry with its lines.
    pub async fn get(
        &self,
        ctx: &TenantContext,
        id: JournalEntryId,
    ) -> LedgerResult<JournalEntryWithLines> {
        let company_id = ctx.require(Module::Accounting, Action::View)?;
        self.fetch_with_lines(company_id, id).await
    }

    /// Lists entries, ordered by date then number.
    pub async fn list(
        &self,
        ctx: &TenantContext,
        filter: EntryFilter,
        page: PageRequest,
    ) -> LedgerResult<PageResponse<JournalEntry>> {
        let company_id = ctx.require(Module::Accounting, Action::View)?;
        let (entries, total) = self
            .store
            .list_entries(company_id, &filter, page.offset(), page.limit())
            .await?;
        debug!(company_id = %company_id, total, "listed journal entries");
        Ok(PageResponse::new(entries, page, total))
    }

    // ========== Ungated operations for the document bridge ==========

    pub(crate) async fn create_draft(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        input: NewJournalEntry,
        reversal_of: Option<JournalEntryId>,
    ) -> LedgerResult<JournalEntryWithLines> {
        let totals = validate_lines(&input.lines)?;
        if input.description.trim().is_empty() {
            return Err(LedgerError::InvalidField {
                field: "description",
                message: "must not be empty".to_string(),
            });
        }
        let check = if reversal_of.is_some() {
            AccountCheck::AllowInactive
        } else {
            AccountCheck::Postable
        };
        self.check_accounts(company_id, input.lines.iter().map(|l| l.account_id), check)
            .await?;

        let id = JournalEntryId::new();
        let lines: Vec<JournalEntryLine> = input
            .lines
            .into_iter()
            .zip(1..)
            .map(|(line, line_number)| JournalEntryLine {
                id: JournalLineId::new(),
                journal_entry_id: id,
                account_id: line.account_id,
                line_number,
                description: line.description,
                debit_amount: line.debit_amount,
                credit_amount: line.credit_amount,
                party_type: line.party_type,
                party_id: line.party_id,
            })
            .collect();

        let template = JournalEntry {
            id,
            company_id,
            entry_number: String::new(),
            entry_date: input.entry_date,
            description: input.description,
            reference_type: input.reference_type,
            reference_id: input.reference_id,
            reference_number: input.reference_number,
            total_debit: totals.total_debit,
            total_credit: totals.total_credit,
            status: EntryStatus::Draft,
            posted_at: None,
            posted_by: None,
            reversal_entry_id: None,
            reversed_entry_id: reversal_of,
            reversal_reason: None,
            is_reversal: reversal_of.is_some(),
            created_by: user_id,
            created_at: Utc::now(),
        };

        let store: &S = &self.store;
        let line_slice = lines.as_slice();
        let entry = with_next_number(
            store,
            company_id,
            NumberSeries::JournalEntry,
            template.entry_date,
            self.number_retry_limit,
            |number| {
                let mut entry = template.clone();
                entry.entry_number = number;
                async move {
                    store
                        .insert_entry_with_lines(&entry, line_slice)
                        .await
                        .map_err(LedgerError::from)?;
                    Ok::<_, LedgerError>(entry)
                }
            },
        )
        .await?;

        info!(
            company_id = %company_id,
            entry_id = %entry.id,
            number = %entry.entry_number,
            total = %entry.total_debit,
            lines = lines.len(),
            "journal entry created"
        );
        Ok(JournalEntryWithLines { entry, lines })
    }

    pub(crate) async fn post_draft(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        id: JournalEntryId,
    ) -> LedgerResult<JournalEntry> {
        let transition = EntryTransition::Post {
            posted_at: Utc::now(),
            posted_by: user_id,
        };
        if !self
            .store
            .transition_entry(company_id, id, EntryStatus::Draft, &transition)
            .await?
        {
            return Err(self.transition_failure(company_id, id, EntryStatus::Posted).await);
        }

        if let Err(e) = self.apply_to_cached_balances(company_id, id).await {
            error!(
                target: "ledgerline::reconciliation",
                company_id = %company_id,
                entry_id = %id,
                error = %e,
                "entry posted but cached balances not updated; run balance recalculation"
            );
            return Err(LedgerError::PersistencePartialFailure {
                entry_id: id,
                compensated: false,
                cause: e.to_string(),
            });
        }

        let entry = self.fetch(company_id, id).await?;
        info!(
            company_id = %company_id,
            entry_id = %id,
            number = %entry.entry_number,
            "journal entry posted"
        );
        Ok(entry)
    }

    pub(crate) async fn reverse_posted(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        id: JournalEntryId,
        reason: &str,
        reversal_date: NaiveDate,
    ) -> LedgerResult<ReversalOutcome> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LedgerError::InvalidField {
                field: "reason",
                message: "must not be empty".to_string(),
            });
        }

        let original = self.fetch_with_lines(company_id, id).await?;
        if original.entry.status != EntryStatus::Posted {
            return Err(LedgerError::InvalidStatusTransition {
                id,
                from: original.entry.status,
                to: EntryStatus::Reversed,
            });
        }

        let input = ReversalBuilder::build(&original, reversal_date);
        let draft = self.create_draft(company_id, user_id, input, Some(id)).await?;

        let transition = EntryTransition::Reverse {
            reversal_entry_id: draft.entry.id,
            reason: reason.to_string(),
        };
        if !self
            .store
            .transition_entry(company_id, id, EntryStatus::Posted, &transition)
            .await?
        {
            warn!(
                company_id = %company_id,
                entry_id = %id,
                reversal_id = %draft.entry.id,
                "entry reversed concurrently, discarding reversal draft"
            );
            if let Err(e) = self.store.delete_entry(company_id, draft.entry.id).await {
                error!(
                    target: "ledgerline::reconciliation",
                    company_id = %company_id,
                    entry_id = %draft.entry.id,
                    error = %e,
                    "orphaned reversal draft requires reconciliation"
                );
            }
            return Err(self.transition_failure(company_id, id, EntryStatus::Reversed).await);
        }

        let posted = match self.post_draft(company_id, user_id, draft.entry.id).await {
            Ok(entry) => entry,
            // Posted; only the balance cache missed the update and that is already logged.
            Err(LedgerError::PersistencePartialFailure { entry_id, .. })
                if entry_id == draft.entry.id =>
            {
                self.fetch(company_id, entry_id).await?
            }
            Err(e) => {
                error!(
                    target: "ledgerline::reconciliation",
                    company_id = %company_id,
                    entry_id = %id,
                    reversal_id = %draft.entry.id,
                    error = %e,
                    "entry marked reversed but its reversal was not posted"
                );
                return Err(e);
            }
        };
        let original = self.fetch(company_id, id).await?;

        info!(
            company_id = %company_id,
            entry_id = %id,
            reversal_id = %posted.id,
            reversal_number = %posted.entry_number,
            "journal entry reversed"
        );
        Ok(ReversalOutcome {
            original,
            reversal: JournalEntryWithLines {
                entry: posted,
                lines: draft.lines,
            },
        })
    }

    /// Adds the entry's lines to the cached balances of their accounts and
    /// every header above them.
    async fn apply_to_cached_balances(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
    ) -> LedgerResult<()> {
        let lines = self.store.find_lines(company_id, id).await?;
        let parents: HashMap<AccountId, Option<AccountId>> = self
            .store
            .list_accounts(company_id, &AccountFilter::default())
            .await?
            .into_iter()
            .map(|a| (a.id, a.parent_id))
            .collect();
        let deltas = expand_to_ancestors(compute_deltas(&lines), &parents);
        self.store.apply_balance_deltas(company_id, &deltas).await?;
        Ok(())
    }

    pub(crate) async fn fetch(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
    ) -> LedgerResult<JournalEntry> {
        self.store
            .find_entry(company_id, id)
            .await?
            .ok_or(LedgerError::EntryNotFound(id))
    }

    async fn fetch_with_lines(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
    ) -> LedgerResult<JournalEntryWithLines> {
        let entry = self.fetch(company_id, id).await?;
        let lines = self.store.find_lines(company_id, id).await?;
        Ok(JournalEntryWithLines { entry, lines })
    }

    async fn check_accounts(
        &self,
        company_id: CompanyId,
        account_ids: impl Iterator<Item = AccountId>,
        check: AccountCheck,
    ) -> LedgerResult<()> {
        let unique: BTreeSet<AccountId> = account_ids.collect();
        for account_id in unique {
            let account = self
                .store
                .find_account(company_id, account_id)
                .await?
                .ok_or(LedgerError::AccountNotFound(account_id))?;
            match check {
                AccountCheck::Postable => account.ensure_postable()?,
                AccountCheck::AllowInactive if account.is_header => {
                    return Err(LedgerError::HeaderAccountNotPostable(account_id));
                }
                AccountCheck::AllowInactive => {}
            }
        }
        Ok(())
    }

    /// Explains why a conditional transition matched no row.
    async fn transition_failure(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
        to: EntryStatus,
    ) -> LedgerError {
        match self.store.find_entry(company_id, id).await {
            Ok(Some(entry)) => LedgerError::InvalidStatusTransition {
                id,
                from: entry.status,
                to,
            },
            Ok(None) => LedgerError::EntryNotFound(id),
            Err(e) => LedgerError::Storage(e),
        }
    }
}
