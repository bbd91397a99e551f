//! Document-to-ledger bridge.
//!
//! Approving a document or posting a voucher claims its status with a
//! conditional update, creates and posts the mapped journal entry, and stores
//! the entry id back on the record. A failure after the claim hands the
//! status back so the operation can be retried.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ledgerline_shared::config::LedgerConfig;
use ledgerline_shared::types::{
    AccountId, CompanyId, DocumentId, DocumentItemId, DocumentPaymentId, JournalEntryId,
    PartnerId, UserId, VoucherId,
};
use rust_decimal::Decimal;
use tracing::{debug, error, info};

use super::posting::{
    Posting, PostingProfile, PostingRole, Side, document_postings, voucher_postings,
};
use super::totals::{DocumentTotals, ItemTotals};
use super::types::{
    Document, DocumentFilter, DocumentItem, DocumentPayment, DocumentStatus, DocumentWithItems,
    NewDocument, NewVoucher, Voucher, VoucherFilter, VoucherStats, VoucherStatus, VoucherType,
};
use crate::context::TenantContext;
use crate::journal::{JournalEngine, with_next_number};
use crate::ledger::{
    LedgerError, LedgerResult, NewJournalEntry, NewJournalLine, PartyType, ReferenceType,
};
use crate::permissions::{Action, Module, has_permission};
use crate::store::LedgerStore;

/// Turns documents and vouchers into posted journal entries.
pub struct DocumentBridge<S: ?Sized> {
    store: Arc<S>,
    journal: JournalEngine<S>,
    profile: PostingProfile,
    number_retry_limit: u32,
}

impl<S: ?Sized> Clone for DocumentBridge<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            journal: self.journal.clone(),
            profile: self.profile.clone(),
            number_retry_limit: self.number_retry_limit,
        }
    }
}

/// What a generated entry is made from.
struct EntrySource {
    date: NaiveDate,
    description: String,
    reference_type: ReferenceType,
    reference_id: uuid::Uuid,
    reference_number: String,
    postings: Vec<Posting>,
    cash_account: Option<AccountId>,
    partner_id: Option<PartnerId>,
}

impl<S: LedgerStore + ?Sized> DocumentBridge<S> {
    /// Creates a bridge over `store` with the default posting profile.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            journal: JournalEngine::new(Arc::clone(&store)),
            store,
            profile: PostingProfile::default(),
            number_retry_limit: crate::journal::DEFAULT_NUMBER_RETRY_LIMIT,
        }
    }

    /// Creates a bridge using the ledger settings.
    #[must_use]
    pub fn with_config(store: Arc<S>, config: &LedgerConfig) -> Self {
        let mut bridge = Self::new(store);
        bridge.journal = bridge.journal.with_number_retry_limit(config.number_retry_limit);
        bridge.number_retry_limit = config.number_retry_limit;
        bridge
    }

    /// Replaces the posting profile.
    #[must_use]
    pub fn with_profile(mut self, profile: PostingProfile) -> Self {
        self.profile = profile;
        self
    }

    /// The posting profile in use.
    #[must_use]
    pub fn profile(&self) -> &PostingProfile {
        &self.profile
    }

    // ========== Documents ==========

    /// Creates a draft document, computing item and header totals.
    pub async fn create_document(
        &self,
        ctx: &TenantContext,
        input: NewDocument,
    ) -> LedgerResult<DocumentWithItems> {
        let company_id = ctx.require(input.document_type.module(), Action::Create)?;
        if input.items.is_empty() {
            return Err(LedgerError::InvalidField {
                field: "items",
                message: "a document needs at least one item".to_string(),
            });
        }

        let item_totals = input
            .items
            .iter()
            .map(ItemTotals::of)
            .collect::<LedgerResult<Vec<_>>>()?;
        let totals = DocumentTotals::compute(&item_totals, input.discount_total)?;

        let document_id = DocumentId::new();
        let items: Vec<DocumentItem> = input
            .items
            .into_iter()
            .zip(&item_totals)
            .map(|(item, computed)| DocumentItem {
                id: DocumentItemId::new(),
                document_id,
                product_id: item.product_id,
                description: item.description,
                quantity: item.quantity,
                unit_price: item.unit_price,
                discount_amount: item.discount_amount,
                tax_rate: item.tax_rate,
                tax_amount: computed.tax,
                total: computed.total,
            })
            .collect();

        let now = Utc::now();
        let template = Document {
            id: document_id,
            company_id,
            document_type: input.document_type,
            document_number: String::new(),
            date: input.date,
            due_date: input.due_date,
            partner_id: input.partner_id,
            subtotal: totals.subtotal,
            tax_total: totals.tax_total,
            discount_total: totals.discount_total,
            total_amount: totals.total_amount,
            paid_amount: Decimal::ZERO,
            status: DocumentStatus::Draft,
            notes: input.notes,
            generated_entry_id: None,
            created_by: ctx.user_id,
            created_at: now,
            updated_at: now,
        };

        let store: &S = &self.store;
        let item_slice = items.as_slice();
        let document = with_next_number(
            store,
            company_id,
            template.document_type.series(),
            template.date,
            self.number_retry_limit,
            |number| {
                let mut document = template.clone();
                document.document_number = number;
                async move {
                    store.insert_document(&document, item_slice).await?;
                    Ok::<_, LedgerError>(document)
                }
            },
        )
        .await?;

        info!(
            company_id = %company_id,
            document_id = %document.id,
            number = %document.document_number,
            document_type = %document.document_type,
            total = %document.total_amount,
            "document created"
        );
        Ok(DocumentWithItems { document, items })
    }

    /// Moves a draft document to pending.
    pub async fn submit_document(
        &self,
        ctx: &TenantContext,
        id: DocumentId,
    ) -> LedgerResult<Document> {
        let (company_id, document) = self.gated_document(ctx, id, Action::Create).await?;
        self.move_document(
            company_id,
            &document,
            DocumentStatus::Draft,
            DocumentStatus::Pending,
            "submit",
        )
        .await
    }

    /// Cancels a draft or pending document.
    pub async fn cancel_document(
        &self,
        ctx: &TenantContext,
        id: DocumentId,
    ) -> LedgerResult<Document> {
        let (company_id, document) = self.gated_document(ctx, id, Action::Edit).await?;
        if !document.status.is_open_for_approval() {
            return Err(document_state(document.status, "cancel"));
        }
        self.move_document(
            company_id,
            &document,
            document.status,
            DocumentStatus::Cancelled,
            "cancel",
        )
        .await
    }

    /// Approves a document and posts its journal entry.
    ///
    /// A document with a zero total is approved without an entry.
    pub async fn approve_document(
        &self,
        ctx: &TenantContext,
        id: DocumentId,
    ) -> LedgerResult<Document> {
        let (company_id, mut document) = self.gated_document(ctx, id, Action::Approve).await?;

        let Some(postings) = document_postings(
            document.document_type,
            document.total_amount,
            document.tax_total,
        ) else {
            return Err(LedgerError::NonPostingDocument(id));
        };
        if !document.status.is_open_for_approval() {
            return Err(document_state(document.status, "approve"));
        }

        let previous = document.status;
        self.claim_document(company_id, id, previous, DocumentStatus::Approved, "approve")
            .await?;

        if !document.total_amount.is_zero() {
            let source = EntrySource {
                date: document.date,
                description: format!("{} {}", document.document_type, document.document_number),
                reference_type: document
                    .document_type
                    .reference_type()
                    .unwrap_or(ReferenceType::Manual),
                reference_id: id.into_inner(),
                reference_number: document.document_number.clone(),
                postings,
                cash_account: None,
                partner_id: document.partner_id,
            };
            match self.post_entry(company_id, ctx.user_id, source).await {
                Ok(entry_id) => document.generated_entry_id = Some(entry_id),
                Err(e) => {
                    self.release_document(company_id, id, DocumentStatus::Approved, previous)
                        .await;
                    return Err(e);
                }
            }
        }

        if let Some(entry_id) = document.generated_entry_id {
            self.attach_document_entry(company_id, ctx.user_id, id, entry_id).await?;
        }
        let document = self.fetch_document(company_id, id).await?;

        info!(
            company_id = %company_id,
            document_id = %id,
            number = %document.document_number,
            entry_id = ?document.generated_entry_id,
            "document approved"
        );
        Ok(document)
    }

    /// Voids an approved document and reverses its journal entry.
    pub async fn void_document(
        &self,
        ctx: &TenantContext,
        id: DocumentId,
        reason: &str,
    ) -> LedgerResult<Document> {
        let (company_id, document) = self.gated_document(ctx, id, Action::Void).await?;
        if document.paid_amount > Decimal::ZERO || document.status == DocumentStatus::Paid {
            return Err(LedgerError::DocumentHasPayments(id));
        }
        if document.status != DocumentStatus::Approved {
            return Err(document_state(document.status, "void"));
        }

        self.claim_document(company_id, id, DocumentStatus::Approved, DocumentStatus::Void, "void")
            .await?;

        if let Some(entry_id) = document.generated_entry_id {
            let reversed = self
                .journal
                .reverse_posted(company_id, ctx.user_id, entry_id, reason, Utc::now().date_naive())
                .await;
            if let Err(e) = reversed {
                self.release_document(
                    company_id,
                    id,
                    DocumentStatus::Void,
                    DocumentStatus::Approved,
                )
                .await;
                return Err(e);
            }
        }

        info!(
            company_id = %company_id,
            document_id = %id,
            number = %document.document_number,
            "document voided"
        );
        self.fetch_document(company_id, id).await
    }

    /// Gets a document with its items.
    pub async fn get_document(
        &self,
        ctx: &TenantContext,
        id: DocumentId,
    ) -> LedgerResult<DocumentWithItems> {
        let (company_id, document) = self.gated_document(ctx, id, Action::View).await?;
        let items = self.store.find_document_items(company_id, id).await?;
        Ok(DocumentWithItems { document, items })
    }

    /// Documents passing `filter` that the caller's role may view.
    pub async fn list_documents(
        &self,
        ctx: &TenantContext,
        filter: DocumentFilter,
    ) -> LedgerResult<Vec<Document>> {
        let company_id = match filter.document_type {
            Some(document_type) => ctx.require(document_type.module(), Action::View)?,
            None => self.require_document_action(ctx, Action::View)?,
        };
        let mut documents = self.store.list_documents(company_id, &filter).await?;
        documents.retain(|d| has_permission(ctx.role, d.document_type.module(), Action::View));
        debug!(company_id = %company_id, count = documents.len(), "listed documents");
        Ok(documents)
    }

    // ========== Vouchers ==========

    /// Creates a draft voucher.
    pub async fn create_voucher(
        &self,
        ctx: &TenantContext,
        input: NewVoucher,
    ) -> LedgerResult<Voucher> {
        let company_id = ctx.require(Module::Vouchers, Action::Create)?;
        if input.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidField {
                field: "amount",
                message: "must be positive".to_string(),
            });
        }
        if let Some(account_id) = input.cash_account_id {
            self.store
                .find_account(company_id, account_id)
                .await?
                .ok_or(LedgerError::AccountNotFound(account_id))?
                .ensure_postable()?;
        }
        let counterparty = input
            .counterparty
            .unwrap_or_else(|| input.voucher_type.default_counterparty());
        if counterparty == PartyType::Employee {
            return Err(LedgerError::InvalidField {
                field: "counterparty",
                message: "vouchers settle customer or supplier documents".to_string(),
            });
        }

        let template = Voucher {
            id: VoucherId::new(),
            company_id,
            voucher_number: String::new(),
            voucher_type: input.voucher_type,
            partner_id: input.partner_id,
            counterparty,
            amount: input.amount,
            date: input.date,
            payment_method_id: input.payment_method_id,
            cash_account_id: input.cash_account_id,
            description: input.description,
            status: VoucherStatus::Draft,
            journal_entry_id: None,
            created_by: ctx.user_id,
            created_at: Utc::now(),
        };

        let store: &S = &self.store;
        let voucher = with_next_number(
            store,
            company_id,
            template.voucher_type.series(),
            template.date,
            self.number_retry_limit,
            |number| {
                let mut voucher = template.clone();
                voucher.voucher_number = number;
                async move {
                    store.insert_voucher(&voucher).await?;
                    Ok::<_, LedgerError>(voucher)
                }
            },
        )
        .await?;

        info!(
            company_id = %company_id,
            voucher_id = %voucher.id,
            number = %voucher.voucher_number,
            amount = %voucher.amount,
            "voucher created"
        );
        Ok(voucher)
    }

    /// Posts a draft voucher and its journal entry.
    pub async fn post_voucher(&self, ctx: &TenantContext, id: VoucherId) -> LedgerResult<Voucher> {
        let company_id = ctx.require(Module::Vouchers, Action::Approve)?;
        let mut voucher = self.fetch_voucher(company_id, id).await?;
        if voucher.status != VoucherStatus::Draft {
            return Err(voucher_state(voucher.status, "post"));
        }
        self.claim_voucher(company_id, id, VoucherStatus::Draft, VoucherStatus::Posted, "post")
            .await?;

        let source = EntrySource {
            date: voucher.date,
            description: voucher.description.clone().unwrap_or_else(|| {
                format!("{} voucher {}", voucher.voucher_type.as_str(), voucher.voucher_number)
            }),
            reference_type: voucher.voucher_type.reference_type(),
            reference_id: id.into_inner(),
            reference_number: voucher.voucher_number.clone(),
            postings: voucher_postings(voucher.voucher_type, voucher.counterparty, voucher.amount),
            cash_account: voucher.cash_account_id,
            partner_id: voucher.partner_id,
        };
        let entry_id = match self.post_entry(company_id, ctx.user_id, source).await {
            Ok(entry_id) => entry_id,
            Err(e) => {
                self.release_voucher(company_id, id, VoucherStatus::Posted, VoucherStatus::Draft)
                    .await;
                return Err(e);
            }
        };

        let attached = self
            .store
            .attach_voucher_entry(company_id, id, VoucherStatus::Posted, entry_id)
            .await?;
        if !attached {
            self.withdraw_entry(company_id, ctx.user_id, entry_id, "voucher voided while posting")
                .await;
            return Err(voucher_state(VoucherStatus::Void, "post"));
        }
        voucher.status = VoucherStatus::Posted;
        voucher.journal_entry_id = Some(entry_id);

        info!(
            company_id = %company_id,
            voucher_id = %id,
            number = %voucher.voucher_number,
            entry_id = %entry_id,
            "voucher posted"
        );
        Ok(voucher)
    }

    /// Voids a posted voucher, reverses its entry and drops its settlements.
    pub async fn void_voucher(
        &self,
        ctx: &TenantContext,
        id: VoucherId,
        reason: &str,
    ) -> LedgerResult<Voucher> {
        let company_id = ctx.require(Module::Vouchers, Action::Void)?;
        let voucher = self.fetch_voucher(company_id, id).await?;
        if voucher.status != VoucherStatus::Posted {
            return Err(voucher_state(voucher.status, "void"));
        }
        self.claim_voucher(company_id, id, VoucherStatus::Posted, VoucherStatus::Void, "void")
            .await?;

        if let Some(entry_id) = voucher.journal_entry_id {
            let reversed = self
                .journal
                .reverse_posted(company_id, ctx.user_id, entry_id, reason, Utc::now().date_naive())
                .await;
            if let Err(e) = reversed {
                self.release_voucher(company_id, id, VoucherStatus::Void, VoucherStatus::Posted)
                    .await;
                return Err(e);
            }
        }

        for payment in self.store.payments_for_voucher(company_id, id).await? {
            self.store.delete_payment(company_id, payment.id).await?;
            self.recompute_document(company_id, payment.document_id).await?;
        }

        info!(
            company_id = %company_id,
            voucher_id = %id,
            number = %voucher.voucher_number,
            "voucher voided"
        );
        self.fetch_voucher(company_id, id).await
    }

    /// Gets a voucher.
    pub async fn get_voucher(&self, ctx: &TenantContext, id: VoucherId) -> LedgerResult<Voucher> {
        let company_id = ctx.require(Module::Vouchers, Action::View)?;
        self.fetch_voucher(company_id, id).await
    }

    /// Vouchers passing `filter`, ordered by date then number.
    pub async fn list_vouchers(
        &self,
        ctx: &TenantContext,
        filter: VoucherFilter,
    ) -> LedgerResult<Vec<Voucher>> {
        let company_id = ctx.require(Module::Vouchers, Action::View)?;
        Ok(self.store.list_vouchers(company_id, &filter).await?)
    }

    /// Totals of posted vouchers dated inside the window.
    pub async fn voucher_stats(
        &self,
        ctx: &TenantContext,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> LedgerResult<VoucherStats> {
        let company_id = ctx.require(Module::Vouchers, Action::View)?;
        let filter = VoucherFilter {
            voucher_type: None,
            status: Some(VoucherStatus::Posted),
            date_from: from,
            date_to: to,
        };
        let vouchers = self.store.list_vouchers(company_id, &filter).await?;

        let mut stats = VoucherStats::default();
        for voucher in &vouchers {
            match voucher.voucher_type {
                VoucherType::Receipt => {
                    stats.total_receipts += voucher.amount;
                    stats.receipt_count += 1;
                }
                VoucherType::Payment => {
                    stats.total_payments += voucher.amount;
                    stats.payment_count += 1;
                }
            }
        }
        stats.net_cash_flow = stats.total_receipts - stats.total_payments;
        Ok(stats)
    }

    // ========== Settlements ==========

    /// Allocates part of a posted voucher to an approved document.
    pub async fn link_payment(
        &self,
        ctx: &TenantContext,
        voucher_id: VoucherId,
        document_id: DocumentId,
        amount: Decimal,
    ) -> LedgerResult<DocumentPayment> {
        let company_id = ctx.require(Module::Vouchers, Action::Edit)?;
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidField {
                field: "amount",
                message: "must be positive".to_string(),
            });
        }

        let voucher = self.fetch_voucher(company_id, voucher_id).await?;
        if voucher.status != VoucherStatus::Posted {
            return Err(voucher_state(voucher.status, "allocate"));
        }
        let document = self.fetch_document(company_id, document_id).await?;
        if !matches!(document.status, DocumentStatus::Approved | DocumentStatus::Paid) {
            return Err(document_state(document.status, "settle"));
        }
        if document.document_type.settled_by() != Some(voucher.voucher_type) {
            return Err(LedgerError::InvalidField {
                field: "voucher_type",
                message: format!(
                    "a {} voucher cannot settle a {}",
                    voucher.voucher_type.as_str(),
                    document.document_type
                ),
            });
        }
        if document.document_type.counterparty() != voucher.counterparty {
            return Err(LedgerError::InvalidField {
                field: "counterparty",
                message: format!(
                    "a voucher for a {} cannot settle a {}",
                    voucher.counterparty.as_str(),
                    document.document_type
                ),
            });
        }
        if let (Some(a), Some(b)) = (voucher.partner_id, document.partner_id)
            && a != b
        {
            return Err(LedgerError::InvalidField {
                field: "partner_id",
                message: "voucher and document belong to different partners".to_string(),
            });
        }

        let remaining = document.remaining_amount();
        if amount > remaining {
            return Err(LedgerError::Overpayment { amount, open: remaining });
        }
        let allocated: Decimal = self
            .store
            .payments_for_voucher(company_id, voucher_id)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();
        let unallocated = voucher.amount - allocated;
        if amount > unallocated {
            return Err(LedgerError::Overpayment { amount, open: unallocated });
        }

        let payment = DocumentPayment {
            id: DocumentPaymentId::new(),
            company_id,
            voucher_id,
            document_id,
            amount,
            created_at: Utc::now(),
        };
        self.store.insert_payment(&payment).await?;
        let document = self.recompute_document(company_id, document_id).await?;

        info!(
            company_id = %company_id,
            payment_id = %payment.id,
            voucher = %voucher.voucher_number,
            document = %document.document_number,
            amount = %amount,
            status = document.status.as_str(),
            "payment linked"
        );
        Ok(payment)
    }

    /// Removes a settlement and returns the document as it stands after.
    pub async fn unlink_payment(
        &self,
        ctx: &TenantContext,
        id: DocumentPaymentId,
    ) -> LedgerResult<Document> {
        let company_id = ctx.require(Module::Vouchers, Action::Edit)?;
        let payment = self
            .store
            .find_payment(company_id, id)
            .await?
            .ok_or(LedgerError::PaymentNotFound(id))?;
        if !self.store.delete_payment(company_id, id).await? {
            return Err(LedgerError::PaymentNotFound(id));
        }
        let document = self.recompute_document(company_id, payment.document_id).await?;
        info!(
            company_id = %company_id,
            payment_id = %id,
            document = %document.document_number,
            "payment unlinked"
        );
        Ok(document)
    }

    /// Settlements of a document.
    pub async fn document_payments(
        &self,
        ctx: &TenantContext,
        document_id: DocumentId,
    ) -> LedgerResult<Vec<DocumentPayment>> {
        let company_id = ctx.require(Module::Vouchers, Action::View)?;
        Ok(self.store.payments_for_document(company_id, document_id).await?)
    }

    // ========== Internals ==========

    /// Creates and posts the entry for `source`. A draft left behind by a
    /// failed post is discarded.
    async fn post_entry(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        source: EntrySource,
    ) -> LedgerResult<JournalEntryId> {
        let lines = self.resolve_lines(company_id, &source).await?;
        let input = NewJournalEntry::manual(source.date, source.description, lines).with_reference(
            source.reference_type,
            source.reference_id,
            Some(source.reference_number),
        );
        let draft = self.journal.create_draft(company_id, user_id, input, None).await?;

        match self.journal.post_draft(company_id, user_id, draft.entry.id).await {
            Ok(entry) => Ok(entry.id),
            Err(LedgerError::PersistencePartialFailure { entry_id, .. })
                if entry_id == draft.entry.id =>
            {
                // Posted; only the balance cache missed the update.
                Ok(entry_id)
            }
            Err(e) => {
                if let Err(discard) = self.store.delete_entry(company_id, draft.entry.id).await {
                    error!(
                        target: "ledgerline::reconciliation",
                        company_id = %company_id,
                        entry_id = %draft.entry.id,
                        error = %discard,
                        "unposted draft entry left behind"
                    );
                }
                Err(e)
            }
        }
    }

    async fn resolve_lines(
        &self,
        company_id: CompanyId,
        source: &EntrySource,
    ) -> LedgerResult<Vec<NewJournalLine>> {
        let mut accounts: HashMap<PostingRole, AccountId> = HashMap::new();
        let mut lines = Vec::with_capacity(source.postings.len());

        for posting in source.postings.iter().filter(|p| !p.amount.is_zero()) {
            let account_id = match (posting.role, source.cash_account) {
                (PostingRole::Cash, Some(cash)) => cash,
                (role, _) => {
                    if let Some(id) = accounts.get(&role) {
                        *id
                    } else {
                        let code = self.profile.code_for(role);
                        let account = self
                            .store
                            .find_account_by_code(company_id, code)
                            .await?
                            .ok_or_else(|| LedgerError::PostingAccountMissing {
                                role: role.as_str(),
                                code: code.to_string(),
                            })?;
                        accounts.insert(role, account.id);
                        account.id
                    }
                }
            };

            let line = match posting.side {
                Side::Debit => NewJournalLine::debit(account_id, posting.amount),
                Side::Credit => NewJournalLine::credit(account_id, posting.amount),
            };
            lines.push(match posting.party {
                Some(party) => line.with_party(party, source.partner_id),
                None => line,
            });
        }
        Ok(lines)
    }

    async fn recompute_document(
        &self,
        company_id: CompanyId,
        id: DocumentId,
    ) -> LedgerResult<Document> {
        let paid: Decimal = self
            .store
            .payments_for_document(company_id, id)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();
        let mut document = self.fetch_document(company_id, id).await?;
        document.paid_amount = paid;
        if matches!(document.status, DocumentStatus::Approved | DocumentStatus::Paid) {
            document.status = if paid >= document.total_amount && !document.total_amount.is_zero() {
                DocumentStatus::Paid
            } else {
                DocumentStatus::Approved
            };
        }
        document.updated_at = Utc::now();
        self.store.update_document(&document).await?;
        Ok(document)
    }

    /// Fails fast when the role holds `action` on neither document module.
    fn require_document_action(
        &self,
        ctx: &TenantContext,
        action: Action,
    ) -> LedgerResult<CompanyId> {
        if has_permission(ctx.role, Module::Purchases, action) {
            ctx.require(Module::Purchases, action)
        } else {
            ctx.require(Module::Sales, action)
        }
    }

    /// Loads a document and checks `action` on its module.
    async fn gated_document(
        &self,
        ctx: &TenantContext,
        id: DocumentId,
        action: Action,
    ) -> LedgerResult<(CompanyId, Document)> {
        let company_id = self.require_document_action(ctx, action)?;
        let document = self.fetch_document(company_id, id).await?;
        ctx.require(document.document_type.module(), action)?;
        Ok((company_id, document))
    }

    async fn fetch_document(
        &self,
        company_id: CompanyId,
        id: DocumentId,
    ) -> LedgerResult<Document> {
        self.store
            .find_document(company_id, id)
            .await?
            .ok_or(LedgerError::DocumentNotFound(id))
    }

    async fn fetch_voucher(&self, company_id: CompanyId, id: VoucherId) -> LedgerResult<Voucher> {
        self.store
            .find_voucher(company_id, id)
            .await?
            .ok_or(LedgerError::VoucherNotFound(id))
    }

    async fn move_document(
        &self,
        company_id: CompanyId,
        document: &Document,
        from: DocumentStatus,
        to: DocumentStatus,
        operation: &'static str,
    ) -> LedgerResult<Document> {
        if document.status != from {
            return Err(document_state(document.status, operation));
        }
        self.claim_document(company_id, document.id, from, to, operation).await?;
        info!(
            company_id = %company_id,
            document_id = %document.id,
            from = from.as_str(),
            to = to.as_str(),
            "document status changed"
        );
        self.fetch_document(company_id, document.id).await
    }

    async fn claim_document(
        &self,
        company_id: CompanyId,
        id: DocumentId,
        from: DocumentStatus,
        to: DocumentStatus,
        operation: &'static str,
    ) -> LedgerResult<()> {
        if self.store.transition_document_status(company_id, id, from, to).await? {
            return Ok(());
        }
        let current = self.fetch_document(company_id, id).await?;
        Err(document_state(current.status, operation))
    }

    async fn claim_voucher(
        &self,
        company_id: CompanyId,
        id: VoucherId,
        from: VoucherStatus,
        to: VoucherStatus,
        operation: &'static str,
    ) -> LedgerResult<()> {
        if self.store.transition_voucher_status(company_id, id, from, to).await? {
            return Ok(());
        }
        let current = self.fetch_voucher(company_id, id).await?;
        Err(voucher_state(current.status, operation))
    }

    /// Links `entry_id` to the document without overwriting payment progress.
    ///
    /// A settlement may move the status on between the claim and this call,
    /// so the guard follows it. A document voided in that window never saw
    /// the entry; the entry is reversed here instead.
    async fn attach_document_entry(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        id: DocumentId,
        entry_id: JournalEntryId,
    ) -> LedgerResult<()> {
        let mut expected = DocumentStatus::Approved;
        loop {
            if self
                .store
                .attach_document_entry(company_id, id, expected, entry_id)
                .await?
            {
                return Ok(());
            }
            let current = self.fetch_document(company_id, id).await?;
            match current.status {
                DocumentStatus::Approved | DocumentStatus::Paid => {
                    expected = current.status;
                }
                status => {
                    self.withdraw_entry(
                        company_id,
                        user_id,
                        entry_id,
                        "document voided while approving",
                    )
                    .await;
                    return Err(document_state(status, "approve"));
                }
            }
        }
    }

    /// Reverses an entry whose source record was voided before it was linked.
    async fn withdraw_entry(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        entry_id: JournalEntryId,
        reason: &str,
    ) {
        let reversed = self
            .journal
            .reverse_posted(company_id, user_id, entry_id, reason, Utc::now().date_naive())
            .await;
        if let Err(e) = reversed {
            error!(
                target: "ledgerline::reconciliation",
                company_id = %company_id,
                entry_id = %entry_id,
                error = %e,
                "orphaned entry could not be reversed"
            );
        }
    }

    async fn release_document(
        &self,
        company_id: CompanyId,
        id: DocumentId,
        from: DocumentStatus,
        to: DocumentStatus,
    ) {
        match self.store.transition_document_status(company_id, id, from, to).await {
            Ok(true) => {}
            Ok(false) => error!(
                target: "ledgerline::reconciliation",
                company_id = %company_id,
                document_id = %id,
                "document status changed while its entry failed; left as is"
            ),
            Err(e) => error!(
                target: "ledgerline::reconciliation",
                company_id = %company_id,
                document_id = %id,
                error = %e,
                "could not restore document status"
            ),
        }
    }

    async fn release_voucher(
        &self,
        company_id: CompanyId,
        id: VoucherId,
        from: VoucherStatus,
        to: VoucherStatus,
    ) {
        match self.store.transition_voucher_status(company_id, id, from, to).await {
            Ok(true) => {}
            Ok(false) => error!(
                target: "ledgerline::reconciliation",
                company_id = %company_id,
                voucher_id = %id,
                "voucher status changed while its entry failed; left as is"
            ),
            Err(e) => error!(
                target: "ledgerline::reconciliation",
                company_id = %company_id,
                voucher_id = %id,
                error = %e,
                "could not restore voucher status"
            ),
        }
    }
}

fn document_state(status: DocumentStatus, operation: &'static str) -> LedgerError {
    LedgerError::InvalidDocumentState {
        entity: "document",
        status: status.as_str(),
        operation,
    }
}

fn voucher_state(status: VoucherStatus, operation: &'static str) -> LedgerError {
    LedgerError::InvalidDocumentState {
        entity: "voucher",
        status: status.as_str(),
        operation,
    }
}
