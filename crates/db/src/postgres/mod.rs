//! PostgreSQL store.
//!
//! Header-plus-lines writes, balance updates and document inserts each run in
//! one database transaction. Numbering uses an upsert on
//! `number_sequences`, and status changes are `UPDATE … WHERE status = $from`
//! whose affected-row count decides the winner.

mod convert;

use async_trait::async_trait;
use chrono::Utc;
use ledgerline_core::bridge::{
    Document, DocumentFilter, DocumentItem, DocumentPayment, DocumentStatus, Voucher,
    VoucherFilter, VoucherStatus,
};
use ledgerline_core::ledger::{
    Account, AccountFilter, BalanceDelta, DateRange, EntryFilter, EntryStatus, JournalEntry,
    JournalEntryLine, PostedLine,
};
use ledgerline_core::store::{
    EntryTransition, EntryWriteError, LedgerStore, StoreError, StoreResult,
};
use ledgerline_shared::types::{
    AccountId, CompanyId, DocumentId, DocumentPaymentId, JournalEntryId, VoucherId,
};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
};
use tracing::debug;

use self::convert::{
    account_active, account_from_model, document_active, document_from_model, entry_active,
    entry_from_model, item_active, item_from_model, line_active, line_from_model, payment_active,
    payment_from_model, posted_line, voucher_active, voucher_from_model,
};
use crate::entities::{
    accounts, document_items, document_payments, documents, journal_entries, journal_entry_lines,
    vouchers,
};
use crate::error::store_error;

const NEXT_SEQUENCE_SQL: &str = r"
INSERT INTO number_sequences (company_id, sequence_key, last_value)
VALUES ($1, $2, 1)
ON CONFLICT (company_id, sequence_key)
DO UPDATE SET last_value = number_sequences.last_value + 1, updated_at = now()
RETURNING last_value
";

const APPLY_DELTA_SQL: &str = r"
UPDATE accounts
SET current_balance = current_balance
        + CASE WHEN normal_balance = 'debit' THEN $1 - $2 ELSE $2 - $1 END,
    updated_at = now()
WHERE company_id = $3 AND id = $4
";

/// Statuses whose lines count toward balances.
const BALANCE_AFFECTING: [&str; 2] = ["posted", "reversed"];

/// [`LedgerStore`] backed by PostgreSQL through `SeaORM`.
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    db: DatabaseConnection,
}

impl PgLedgerStore {
    /// Creates a store over an open connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

fn not_found(what: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::NotFound(format!("{what} {id}"))
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    // ========== Sequences ==========

    async fn next_sequence_value(&self, company_id: CompanyId, key: &str) -> StoreResult<i64> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            NEXT_SEQUENCE_SQL,
            [company_id.into_inner().into(), key.into()],
        );
        let row = self
            .db
            .query_one(stmt)
            .await
            .map_err(store_error)?
            .ok_or_else(|| StoreError::Backend("sequence upsert returned no row".to_string()))?;
        row.try_get::<i64>("", "last_value").map_err(store_error)
    }

    // ========== Accounts ==========

    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        accounts::Entity::insert(account_active(account))
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> StoreResult<()> {
        let result = accounts::Entity::update_many()
            .set(account_active(account))
            .filter(accounts::Column::Id.eq(account.id.into_inner()))
            .filter(accounts::Column::CompanyId.eq(account.company_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        if result.rows_affected == 0 {
            return Err(not_found("account", account.id));
        }
        Ok(())
    }

    async fn find_account(
        &self,
        company_id: CompanyId,
        id: AccountId,
    ) -> StoreResult<Option<Account>> {
        accounts::Entity::find_by_id(id.into_inner())
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(account_from_model)
            .transpose()
    }

    async fn find_account_by_code(
        &self,
        company_id: CompanyId,
        code: &str,
    ) -> StoreResult<Option<Account>> {
        accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(account_from_model)
            .transpose()
    }

    async fn list_accounts(
        &self,
        company_id: CompanyId,
        filter: &AccountFilter,
    ) -> StoreResult<Vec<Account>> {
        let mut query = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(company_id.into_inner()));
        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(account_type.as_str()));
        }
        if let Some(active) = filter.is_active {
            query = query.filter(accounts::Column::IsActive.eq(active));
        }
        match filter.parent_id {
            Some(Some(parent)) => {
                query = query.filter(accounts::Column::ParentId.eq(parent.into_inner()));
            }
            Some(None) => query = query.filter(accounts::Column::ParentId.is_null()),
            None => {}
        }
        if filter.postable_only {
            query = query
                .filter(accounts::Column::IsHeader.eq(false))
                .filter(accounts::Column::IsActive.eq(true));
        }

        query
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(account_from_model)
            .collect()
    }

    async fn count_posted_lines(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> StoreResult<u64> {
        journal_entry_lines::Entity::find()
            .inner_join(journal_entries::Entity)
            .filter(journal_entry_lines::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journal_entry_lines::Column::AccountId.eq(account_id.into_inner()))
            .filter(journal_entries::Column::Status.is_in(BALANCE_AFFECTING))
            .count(&self.db)
            .await
            .map_err(store_error)
    }

    async fn apply_balance_deltas(
        &self,
        company_id: CompanyId,
        deltas: &[BalanceDelta],
    ) -> StoreResult<()> {
        let txn = self.db.begin().await.map_err(store_error)?;
        for delta in deltas {
            let stmt = Statement::from_sql_and_values(
                DbBackend::Postgres,
                APPLY_DELTA_SQL,
                [
                    delta.debit.into(),
                    delta.credit.into(),
                    company_id.into_inner().into(),
                    delta.account_id.into_inner().into(),
                ],
            );
            let result = txn.execute(stmt).await.map_err(store_error)?;
            if result.rows_affected() == 0 {
                return Err(not_found("account", delta.account_id));
            }
        }
        txn.commit().await.map_err(store_error)?;
        debug!(company_id = %company_id, accounts = deltas.len(), "cached balances updated");
        Ok(())
    }

    async fn set_current_balances(
        &self,
        company_id: CompanyId,
        balances: &[(AccountId, Decimal)],
    ) -> StoreResult<()> {
        let txn = self.db.begin().await.map_err(store_error)?;
        for (account_id, balance) in balances {
            accounts::Entity::update_many()
                .col_expr(accounts::Column::CurrentBalance, Expr::value(*balance))
                .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(accounts::Column::Id.eq(account_id.into_inner()))
                .filter(accounts::Column::CompanyId.eq(company_id.into_inner()))
                .exec(&txn)
                .await
                .map_err(store_error)?;
        }
        txn.commit().await.map_err(store_error)
    }

    // ========== Journal entries ==========

    async fn insert_entry(&self, entry: &JournalEntry) -> StoreResult<()> {
        journal_entries::Entity::insert(entry_active(entry))
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn insert_lines(
        &self,
        company_id: CompanyId,
        lines: &[JournalEntryLine],
    ) -> StoreResult<()> {
        if lines.is_empty() {
            return Ok(());
        }
        journal_entry_lines::Entity::insert_many(lines.iter().map(|l| line_active(company_id, l)))
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn insert_entry_with_lines(
        &self,
        entry: &JournalEntry,
        lines: &[JournalEntryLine],
    ) -> Result<(), EntryWriteError> {
        let txn = self.db.begin().await.map_err(store_error)?;
        journal_entries::Entity::insert(entry_active(entry))
            .exec_without_returning(&txn)
            .await
            .map_err(store_error)?;
        if !lines.is_empty() {
            let models = lines.iter().map(|l| line_active(entry.company_id, l));
            journal_entry_lines::Entity::insert_many(models)
                .exec_without_returning(&txn)
                .await
                .map_err(store_error)?;
        }
        txn.commit().await.map_err(store_error)?;
        Ok(())
    }

    async fn delete_entry(&self, company_id: CompanyId, id: JournalEntryId) -> StoreResult<bool> {
        let txn = self.db.begin().await.map_err(store_error)?;
        journal_entry_lines::Entity::delete_many()
            .filter(journal_entry_lines::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journal_entry_lines::Column::JournalEntryId.eq(id.into_inner()))
            .exec(&txn)
            .await
            .map_err(store_error)?;
        let result = journal_entries::Entity::delete_many()
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journal_entries::Column::Id.eq(id.into_inner()))
            .exec(&txn)
            .await
            .map_err(store_error)?;
        txn.commit().await.map_err(store_error)?;
        Ok(result.rows_affected > 0)
    }

    async fn find_entry(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
    ) -> StoreResult<Option<JournalEntry>> {
        journal_entries::Entity::find_by_id(id.into_inner())
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(entry_from_model)
            .transpose()
    }

    async fn find_lines(
        &self,
        company_id: CompanyId,
        entry_id: JournalEntryId,
    ) -> StoreResult<Vec<JournalEntryLine>> {
        journal_entry_lines::Entity::find()
            .filter(journal_entry_lines::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journal_entry_lines::Column::JournalEntryId.eq(entry_id.into_inner()))
            .order_by_asc(journal_entry_lines::Column::LineNumber)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(line_from_model)
            .collect()
    }

    async fn list_entries(
        &self,
        company_id: CompanyId,
        filter: &EntryFilter,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<JournalEntry>, u64)> {
        let mut query = journal_entries::Entity::find()
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()));
        if let Some(status) = filter.status {
            query = query.filter(journal_entries::Column::Status.eq(status.as_str()));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }
        if let Some(reference_type) = filter.reference_type {
            query =
                query.filter(journal_entries::Column::ReferenceType.eq(reference_type.as_str()));
        }
        if let Some(reference_id) = filter.reference_id {
            query = query.filter(journal_entries::Column::ReferenceId.eq(reference_id));
        }

        let total = query.clone().count(&self.db).await.map_err(store_error)?;
        let entries = query
            .order_by_asc(journal_entries::Column::EntryDate)
            .order_by_asc(journal_entries::Column::EntryNumber)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(entry_from_model)
            .collect::<StoreResult<Vec<_>>>()?;
        Ok((entries, total))
    }

    async fn posted_lines(
        &self,
        company_id: CompanyId,
        range: DateRange,
        account_id: Option<AccountId>,
    ) -> StoreResult<Vec<PostedLine>> {
        let mut query = journal_entry_lines::Entity::find()
            .find_also_related(journal_entries::Entity)
            .filter(journal_entry_lines::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journal_entries::Column::Status.is_in(BALANCE_AFFECTING));
        if let Some(from) = range.from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = range.to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }
        if let Some(account_id) = account_id {
            query =
                query.filter(journal_entry_lines::Column::AccountId.eq(account_id.into_inner()));
        }

        query
            .order_by_asc(journal_entries::Column::EntryDate)
            .order_by_asc(journal_entries::Column::EntryNumber)
            .order_by_asc(journal_entry_lines::Column::LineNumber)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|(line, entry)| {
                entry
                    .map(|entry| posted_line(line, entry))
                    .ok_or_else(|| StoreError::Backend("journal line without entry".to_string()))
            })
            .collect()
    }

    async fn transition_entry(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
        from: EntryStatus,
        transition: &EntryTransition,
    ) -> StoreResult<bool> {
        let mut update = journal_entries::Entity::update_many()
            .col_expr(journal_entries::Column::Status, Expr::value(transition.target().as_str()));
        match transition {
            EntryTransition::Post { posted_at, posted_by } => {
                update = update
                    .col_expr(journal_entries::Column::PostedAt, Expr::value(*posted_at))
                    .col_expr(
                        journal_entries::Column::PostedBy,
                        Expr::value(posted_by.into_inner()),
                    );
            }
            EntryTransition::Reverse {
                reversal_entry_id,
                reason,
            } => {
                update = update
                    .col_expr(
                        journal_entries::Column::ReversalEntryId,
                        Expr::value(reversal_entry_id.into_inner()),
                    )
                    .col_expr(journal_entries::Column::ReversalReason, Expr::value(reason.clone()));
            }
            EntryTransition::Cancel => {}
        }

        let result = update
            .filter(journal_entries::Column::Id.eq(id.into_inner()))
            .filter(journal_entries::Column::CompanyId.eq(company_id.into_inner()))
            .filter(journal_entries::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected == 1)
    }

    // ========== Vouchers ==========

    async fn insert_voucher(&self, voucher: &Voucher) -> StoreResult<()> {
        vouchers::Entity::insert(voucher_active(voucher))
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_voucher(&self, voucher: &Voucher) -> StoreResult<()> {
        let result = vouchers::Entity::update_many()
            .set(voucher_active(voucher))
            .filter(vouchers::Column::Id.eq(voucher.id.into_inner()))
            .filter(vouchers::Column::CompanyId.eq(voucher.company_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        if result.rows_affected == 0 {
            return Err(not_found("voucher", voucher.id));
        }
        Ok(())
    }

    async fn find_voucher(
        &self,
        company_id: CompanyId,
        id: VoucherId,
    ) -> StoreResult<Option<Voucher>> {
        vouchers::Entity::find_by_id(id.into_inner())
            .filter(vouchers::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(voucher_from_model)
            .transpose()
    }

    async fn list_vouchers(
        &self,
        company_id: CompanyId,
        filter: &VoucherFilter,
    ) -> StoreResult<Vec<Voucher>> {
        let mut query = vouchers::Entity::find()
            .filter(vouchers::Column::CompanyId.eq(company_id.into_inner()));
        if let Some(voucher_type) = filter.voucher_type {
            query = query.filter(vouchers::Column::VoucherType.eq(voucher_type.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(vouchers::Column::Status.eq(status.as_str()));
        }
        if let Some(from) = filter.date_from {
            query = query.filter(vouchers::Column::VoucherDate.gte(from));
        }
        if let Some(to) = filter.date_to {
            query = query.filter(vouchers::Column::VoucherDate.lte(to));
        }

        query
            .order_by_asc(vouchers::Column::VoucherDate)
            .order_by_asc(vouchers::Column::VoucherNumber)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(voucher_from_model)
            .collect()
    }

    async fn transition_voucher_status(
        &self,
        company_id: CompanyId,
        id: VoucherId,
        expected: VoucherStatus,
        to: VoucherStatus,
    ) -> StoreResult<bool> {
        let result = vouchers::Entity::update_many()
            .col_expr(vouchers::Column::Status, Expr::value(to.as_str()))
            .filter(vouchers::Column::Id.eq(id.into_inner()))
            .filter(vouchers::Column::CompanyId.eq(company_id.into_inner()))
            .filter(vouchers::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected == 1)
    }

    async fn attach_voucher_entry(
        &self,
        company_id: CompanyId,
        id: VoucherId,
        expected: VoucherStatus,
        entry_id: JournalEntryId,
    ) -> StoreResult<bool> {
        let result = vouchers::Entity::update_many()
            .col_expr(vouchers::Column::JournalEntryId, Expr::value(entry_id.into_inner()))
            .filter(vouchers::Column::Id.eq(id.into_inner()))
            .filter(vouchers::Column::CompanyId.eq(company_id.into_inner()))
            .filter(vouchers::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected == 1)
    }

    // ========== Documents ==========

    async fn insert_document(
        &self,
        document: &Document,
        items: &[DocumentItem],
    ) -> StoreResult<()> {
        let txn = self.db.begin().await.map_err(store_error)?;
        documents::Entity::insert(document_active(document))
            .exec_without_returning(&txn)
            .await
            .map_err(store_error)?;
        if !items.is_empty() {
            let models = (1_i32..)
                .zip(items)
                .map(|(position, item)| item_active(document.company_id, position, item));
            document_items::Entity::insert_many(models)
                .exec_without_returning(&txn)
                .await
                .map_err(store_error)?;
        }
        txn.commit().await.map_err(store_error)
    }

    async fn update_document(&self, document: &Document) -> StoreResult<()> {
        let result = documents::Entity::update_many()
            .set(document_active(document))
            .filter(documents::Column::Id.eq(document.id.into_inner()))
            .filter(documents::Column::CompanyId.eq(document.company_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        if result.rows_affected == 0 {
            return Err(not_found("document", document.id));
        }
        Ok(())
    }

    async fn find_document(
        &self,
        company_id: CompanyId,
        id: DocumentId,
    ) -> StoreResult<Option<Document>> {
        documents::Entity::find_by_id(id.into_inner())
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(document_from_model)
            .transpose()
    }

    async fn find_document_items(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> StoreResult<Vec<DocumentItem>> {
        Ok(document_items::Entity::find()
            .filter(document_items::Column::CompanyId.eq(company_id.into_inner()))
            .filter(document_items::Column::DocumentId.eq(document_id.into_inner()))
            .order_by_asc(document_items::Column::Position)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(item_from_model)
            .collect())
    }

    async fn list_documents(
        &self,
        company_id: CompanyId,
        filter: &DocumentFilter,
    ) -> StoreResult<Vec<Document>> {
        let mut query = documents::Entity::find()
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()));
        if let Some(document_type) = filter.document_type {
            query = query.filter(documents::Column::DocumentType.eq(document_type.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(documents::Column::Status.eq(status.as_str()));
        }
        if let Some(partner_id) = filter.partner_id {
            query = query.filter(documents::Column::PartnerId.eq(partner_id.into_inner()));
        }

        query
            .order_by_asc(documents::Column::DocumentDate)
            .order_by_asc(documents::Column::DocumentNumber)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(document_from_model)
            .collect()
    }

    async fn transition_document_status(
        &self,
        company_id: CompanyId,
        id: DocumentId,
        expected: DocumentStatus,
        to: DocumentStatus,
    ) -> StoreResult<bool> {
        let result = documents::Entity::update_many()
            .col_expr(documents::Column::Status, Expr::value(to.as_str()))
            .col_expr(documents::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(documents::Column::Id.eq(id.into_inner()))
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .filter(documents::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected == 1)
    }

    async fn attach_document_entry(
        &self,
        company_id: CompanyId,
        id: DocumentId,
        expected: DocumentStatus,
        entry_id: JournalEntryId,
    ) -> StoreResult<bool> {
        let result = documents::Entity::update_many()
            .col_expr(documents::Column::GeneratedEntryId, Expr::value(entry_id.into_inner()))
            .col_expr(documents::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(documents::Column::Id.eq(id.into_inner()))
            .filter(documents::Column::CompanyId.eq(company_id.into_inner()))
            .filter(documents::Column::Status.eq(expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected == 1)
    }

    // ========== Document payments ==========

    async fn insert_payment(&self, payment: &DocumentPayment) -> StoreResult<()> {
        document_payments::Entity::insert(payment_active(payment))
            .exec_without_returning(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn delete_payment(
        &self,
        company_id: CompanyId,
        id: DocumentPaymentId,
    ) -> StoreResult<bool> {
        let result = document_payments::Entity::delete_many()
            .filter(document_payments::Column::Id.eq(id.into_inner()))
            .filter(document_payments::Column::CompanyId.eq(company_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected > 0)
    }

    async fn find_payment(
        &self,
        company_id: CompanyId,
        id: DocumentPaymentId,
    ) -> StoreResult<Option<DocumentPayment>> {
        Ok(document_payments::Entity::find_by_id(id.into_inner())
            .filter(document_payments::Column::CompanyId.eq(company_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(payment_from_model))
    }

    async fn payments_for_document(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> StoreResult<Vec<DocumentPayment>> {
        Ok(document_payments::Entity::find()
            .filter(document_payments::Column::CompanyId.eq(company_id.into_inner()))
            .filter(document_payments::Column::DocumentId.eq(document_id.into_inner()))
            .order_by_asc(document_payments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(payment_from_model)
            .collect())
    }

    async fn payments_for_voucher(
        &self,
        company_id: CompanyId,
        voucher_id: VoucherId,
    ) -> StoreResult<Vec<DocumentPayment>> {
        Ok(document_payments::Entity::find()
            .filter(document_payments::Column::CompanyId.eq(company_id.into_inner()))
            .filter(document_payments::Column::VoucherId.eq(voucher_id.into_inner()))
            .order_by_asc(document_payments::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(payment_from_model)
            .collect())
    }
}
