//! In-process store with an optional JSON snapshot.
//!
//! Tables are `DashMap`s keyed by id, and unique keys (account codes,
//! document numbers) live in side indexes claimed through the map's entry
//! lock. There are no multi-table transactions: the header-plus-lines write
//! uses the compensating default of [`LedgerStore::insert_entry_with_lines`].
//!
//! No method holds a reference into one map while touching another.

mod snapshot;

use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use ledgerline_core::bridge::{
    Document, DocumentFilter, DocumentItem, DocumentPayment, DocumentStatus, Voucher,
    VoucherFilter, VoucherStatus,
};
use ledgerline_core::ledger::{
    Account, AccountFilter, BalanceDelta, DateRange, EntryFilter, EntryStatus, JournalEntry,
    JournalEntryLine, PostedLine,
};
use ledgerline_core::store::{EntryTransition, LedgerStore, StoreError, StoreResult};
use ledgerline_shared::types::{
    AccountId, CompanyId, DocumentId, DocumentPaymentId, JournalEntryId, VoucherId,
};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info};

use self::snapshot::{SequenceRow, Snapshot};

const ACCOUNT_CODE_KEY: &str = "uq_accounts_company_code";
const ENTRY_NUMBER_KEY: &str = "uq_journal_entries_company_number";
const VOUCHER_NUMBER_KEY: &str = "uq_vouchers_company_number";
const DOCUMENT_NUMBER_KEY: &str = "uq_documents_company_number";

type UniqueIndex<K> = DashMap<(CompanyId, String), K>;

/// Failures armed by tests. Each fires once.
#[derive(Debug, Default)]
struct Faults {
    line_insert: AtomicBool,
    entry_delete: AtomicBool,
    balance_update: AtomicBool,
}

impl Faults {
    fn take(flag: &AtomicBool, what: &str) -> StoreResult<()> {
        if flag.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("injected {what} failure")));
        }
        Ok(())
    }
}

/// [`LedgerStore`] kept in memory, optionally mirrored to a JSON file.
#[derive(Debug, Default)]
pub struct OfflineStore {
    sequences: DashMap<(CompanyId, String), i64>,
    accounts: DashMap<AccountId, Account>,
    account_codes: UniqueIndex<AccountId>,
    entries: DashMap<JournalEntryId, JournalEntry>,
    entry_numbers: UniqueIndex<JournalEntryId>,
    lines: DashMap<JournalEntryId, Vec<JournalEntryLine>>,
    vouchers: DashMap<VoucherId, Voucher>,
    voucher_numbers: UniqueIndex<VoucherId>,
    documents: DashMap<DocumentId, Document>,
    document_numbers: UniqueIndex<DocumentId>,
    items: DashMap<DocumentId, Vec<DocumentItem>>,
    payments: DashMap<DocumentPaymentId, DocumentPayment>,
    snapshot_path: Option<PathBuf>,
    save_lock: Mutex<()>,
    faults: Faults,
}

impl OfflineStore {
    /// Creates an empty store that lives only in memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store mirrored to `path`, loading it if the file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a snapshot.
    pub async fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let snapshot = Snapshot::read(&path).await?;
        let mut store = Self::from_snapshot(snapshot)?;
        info!(
            path = %path.display(),
            accounts = store.accounts.len(),
            entries = store.entries.len(),
            "offline store opened"
        );
        store.snapshot_path = Some(path);
        Ok(store)
    }

    /// Snapshot file, if any.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Writes the snapshot file. A no-op for in-memory stores.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let _guard = self.save_lock.lock().await;
        self.snapshot().write(path).await?;
        debug!(path = %path.display(), "offline snapshot written");
        Ok(())
    }

    /// Makes the next `insert_lines` call fail.
    pub fn fail_next_line_insert(&self) {
        self.faults.line_insert.store(true, Ordering::SeqCst);
    }

    /// Makes the next `delete_entry` call fail.
    pub fn fail_next_entry_delete(&self) {
        self.faults.entry_delete.store(true, Ordering::SeqCst);
    }

    /// Makes the next `apply_balance_deltas` call fail.
    pub fn fail_next_balance_update(&self) {
        self.faults.balance_update.store(true, Ordering::SeqCst);
    }

    fn from_snapshot(snapshot: Snapshot) -> StoreResult<Self> {
        let store = Self::default();
        for row in snapshot.sequences {
            store.sequences.insert((row.company_id, row.key), row.last_value);
        }
        for account in snapshot.accounts {
            reserve(
                &store.account_codes,
                account.company_id,
                &account.code,
                account.id,
                ACCOUNT_CODE_KEY,
            )?;
            store.accounts.insert(account.id, account);
        }
        for entry in snapshot.entries {
            reserve(
                &store.entry_numbers,
                entry.company_id,
                &entry.entry_number,
                entry.id,
                ENTRY_NUMBER_KEY,
            )?;
            store.entries.insert(entry.id, entry);
        }
        for line in snapshot.lines {
            store.lines.entry(line.journal_entry_id).or_default().push(line);
        }
        for voucher in snapshot.vouchers {
            reserve(
                &store.voucher_numbers,
                voucher.company_id,
                &voucher.voucher_number,
                voucher.id,
                VOUCHER_NUMBER_KEY,
            )?;
            store.vouchers.insert(voucher.id, voucher);
        }
        for document in snapshot.documents {
            reserve(
                &store.document_numbers,
                document.company_id,
                &document.document_number,
                document.id,
                DOCUMENT_NUMBER_KEY,
            )?;
            store.documents.insert(document.id, document);
        }
        for item in snapshot.items {
            store.items.entry(item.document_id).or_default().push(item);
        }
        for payment in snapshot.payments {
            store.payments.insert(payment.id, payment);
        }
        Ok(store)
    }

    fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            sequences: self
                .sequences
                .iter()
                .map(|e| SequenceRow {
                    company_id: e.key().0,
                    key: e.key().1.clone(),
                    last_value: *e.value(),
                })
                .collect(),
            accounts: values(&self.accounts),
            entries: values(&self.entries),
            lines: self.lines.iter().flat_map(|e| e.value().clone()).collect(),
            vouchers: values(&self.vouchers),
            documents: values(&self.documents),
            items: self.items.iter().flat_map(|e| e.value().clone()).collect(),
            payments: values(&self.payments),
        };
        snapshot.sequences.sort_by(|a, b| (a.company_id, &a.key).cmp(&(b.company_id, &b.key)));
        snapshot.accounts.sort_by(|a, b| (a.company_id, &a.code).cmp(&(b.company_id, &b.code)));
        snapshot.entries.sort_by_key(|e| e.id);
        snapshot.lines.sort_by_key(|l| (l.journal_entry_id, l.line_number));
        snapshot.vouchers.sort_by_key(|v| v.id);
        snapshot.documents.sort_by_key(|d| d.id);
        snapshot.payments.sort_by_key(|p| p.id);
        snapshot
    }

    fn owned_entry(&self, company_id: CompanyId, id: JournalEntryId) -> Option<JournalEntry> {
        self.entries
            .get(&id)
            .filter(|e| e.company_id == company_id)
            .map(|e| e.value().clone())
    }

    fn owned_document(&self, company_id: CompanyId, id: DocumentId) -> Option<Document> {
        self.documents
            .get(&id)
            .filter(|d| d.company_id == company_id)
            .map(|d| d.value().clone())
    }
}

fn values<K: Eq + Hash, V: Clone>(map: &DashMap<K, V>) -> Vec<V> {
    map.iter().map(|e| e.value().clone()).collect()
}

/// Claims `key` for `owner`. Re-claiming one's own key succeeds.
fn reserve<K: Copy + Eq>(
    index: &UniqueIndex<K>,
    company_id: CompanyId,
    key: &str,
    owner: K,
    constraint: &str,
) -> StoreResult<()> {
    match index.entry((company_id, key.to_string())) {
        Entry::Occupied(slot) if *slot.get() != owner => {
            Err(StoreError::Conflict(constraint.to_string()))
        }
        Entry::Occupied(_) => Ok(()),
        Entry::Vacant(slot) => {
            slot.insert(owner);
            Ok(())
        }
    }
}

fn release<K: Copy + Eq>(index: &UniqueIndex<K>, company_id: CompanyId, key: &str, owner: K) {
    index.remove_if(&(company_id, key.to_string()), |_, held| *held == owner);
}

fn in_range(range: DateRange, date: chrono::NaiveDate) -> bool {
    range.from.is_none_or(|from| date >= from) && range.to.is_none_or(|to| date <= to)
}

#[async_trait]
impl LedgerStore for OfflineStore {
    // ========== Sequences ==========

    async fn next_sequence_value(&self, company_id: CompanyId, key: &str) -> StoreResult<i64> {
        let value = {
            let mut counter = self.sequences.entry((company_id, key.to_string())).or_insert(0);
            *counter += 1;
            *counter
        };
        self.save().await?;
        Ok(value)
    }

    // ========== Accounts ==========

    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        reserve(
            &self.account_codes,
            account.company_id,
            &account.code,
            account.id,
            ACCOUNT_CODE_KEY,
        )?;
        self.accounts.insert(account.id, account.clone());
        self.save().await
    }

    async fn update_account(&self, account: &Account) -> StoreResult<()> {
        let previous_code = self
            .accounts
            .get(&account.id)
            .filter(|a| a.company_id == account.company_id)
            .map(|a| a.code.clone())
            .ok_or_else(|| StoreError::NotFound(format!("account {}", account.id)))?;

        if previous_code != account.code {
            reserve(
            &self.account_codes,
            account.company_id,
            &account.code,
            account.id,
            ACCOUNT_CODE_KEY,
        )?;
            release(&self.account_codes, account.company_id, &previous_code, account.id);
        }
        self.accounts.insert(account.id, account.clone());
        self.save().await
    }

    async fn find_account(
        &self,
        company_id: CompanyId,
        id: AccountId,
    ) -> StoreResult<Option<Account>> {
        Ok(self
            .accounts
            .get(&id)
            .filter(|a| a.company_id == company_id)
            .map(|a| a.value().clone()))
    }

    async fn find_account_by_code(
        &self,
        company_id: CompanyId,
        code: &str,
    ) -> StoreResult<Option<Account>> {
        let id = self.account_codes.get(&(company_id, code.to_string())).map(|id| *id);
        match id {
            Some(id) => self.find_account(company_id, id).await,
            None => Ok(None),
        }
    }

    async fn list_accounts(
        &self,
        company_id: CompanyId,
        filter: &AccountFilter,
    ) -> StoreResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|a| a.company_id == company_id && filter.matches(a))
            .map(|a| a.value().clone())
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn count_posted_lines(
        &self,
        company_id: CompanyId,
        account_id: AccountId,
    ) -> StoreResult<u64> {
        let entry_ids: Vec<JournalEntryId> = self
            .entries
            .iter()
            .filter(|e| e.company_id == company_id && e.status.affects_balances())
            .map(|e| e.id)
            .collect();

        let count = entry_ids
            .iter()
            .filter_map(|id| self.lines.get(id))
            .map(|lines| lines.iter().filter(|l| l.account_id == account_id).count())
            .sum::<usize>();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn apply_balance_deltas(
        &self,
        company_id: CompanyId,
        deltas: &[BalanceDelta],
    ) -> StoreResult<()> {
        Faults::take(&self.faults.balance_update, "balance update")?;
        for delta in deltas {
            let mut account = self
                .accounts
                .get_mut(&delta.account_id)
                .filter(|a| a.company_id == company_id)
                .ok_or_else(|| StoreError::NotFound(format!("account {}", delta.account_id)))?;
            let change = delta.balance_change(account.normal_balance);
            account.current_balance += change;
            account.updated_at = Utc::now();
        }
        self.save().await
    }

    async fn set_current_balances(
        &self,
        company_id: CompanyId,
        balances: &[(AccountId, Decimal)],
    ) -> StoreResult<()> {
        for (account_id, balance) in balances {
            if let Some(mut account) = self
                .accounts
                .get_mut(account_id)
                .filter(|a| a.company_id == company_id)
            {
                account.current_balance = *balance;
                account.updated_at = Utc::now();
            }
        }
        self.save().await
    }

    // ========== Journal entries ==========

    async fn insert_entry(&self, entry: &JournalEntry) -> StoreResult<()> {
        reserve(
            &self.entry_numbers,
            entry.company_id,
            &entry.entry_number,
            entry.id,
            ENTRY_NUMBER_KEY,
        )?;
        self.entries.insert(entry.id, entry.clone());
        self.save().await
    }

    async fn insert_lines(
        &self,
        company_id: CompanyId,
        lines: &[JournalEntryLine],
    ) -> StoreResult<()> {
        Faults::take(&self.faults.line_insert, "line insert")?;
        for line in lines {
            if self.owned_entry(company_id, line.journal_entry_id).is_none() {
                return Err(StoreError::NotFound(format!(
                    "journal entry {}",
                    line.journal_entry_id
                )));
            }
        }
        for line in lines {
            self.lines.entry(line.journal_entry_id).or_default().push(line.clone());
        }
        self.save().await
    }

    async fn delete_entry(&self, company_id: CompanyId, id: JournalEntryId) -> StoreResult<bool> {
        Faults::take(&self.faults.entry_delete, "entry delete")?;
        let Some((_, entry)) = self.entries.remove_if(&id, |_, e| e.company_id == company_id) else {
            return Ok(false);
        };
        self.lines.remove(&id);
        release(&self.entry_numbers, company_id, &entry.entry_number, id);
        self.save().await?;
        Ok(true)
    }

    async fn find_entry(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
    ) -> StoreResult<Option<JournalEntry>> {
        Ok(self.owned_entry(company_id, id))
    }

    async fn find_lines(
        &self,
        company_id: CompanyId,
        entry_id: JournalEntryId,
    ) -> StoreResult<Vec<JournalEntryLine>> {
        if self.owned_entry(company_id, entry_id).is_none() {
            return Ok(Vec::new());
        }
        let mut lines = self.lines.get(&entry_id).map(|l| l.value().clone()).unwrap_or_default();
        lines.sort_by_key(|l| l.line_number);
        Ok(lines)
    }

    async fn list_entries(
        &self,
        company_id: CompanyId,
        filter: &EntryFilter,
        offset: u64,
        limit: u64,
    ) -> StoreResult<(Vec<JournalEntry>, u64)> {
        let mut entries: Vec<JournalEntry> = self
            .entries
            .iter()
            .filter(|e| e.company_id == company_id && filter.matches(e))
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| {
            (a.entry_date, &a.entry_number).cmp(&(b.entry_date, &b.entry_number))
        });

        let total = u64::try_from(entries.len()).unwrap_or(u64::MAX);
        let page = entries
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn posted_lines(
        &self,
        company_id: CompanyId,
        range: DateRange,
        account_id: Option<AccountId>,
    ) -> StoreResult<Vec<PostedLine>> {
        let headers: Vec<JournalEntry> = self
            .entries
            .iter()
            .filter(|e| {
                e.company_id == company_id
                    && e.status.affects_balances()
                    && in_range(range, e.entry_date)
            })
            .map(|e| e.value().clone())
            .collect();

        let mut posted = Vec::new();
        for entry in headers {
            let Some(lines) = self.lines.get(&entry.id).map(|l| l.value().clone()) else {
                continue;
            };
            posted.extend(
                lines
                    .into_iter()
                    .filter(|l| account_id.is_none_or(|id| l.account_id == id))
                    .map(|l| PostedLine {
                        entry_id: entry.id,
                        entry_number: entry.entry_number.clone(),
                        entry_date: entry.entry_date,
                        entry_description: entry.description.clone(),
                        account_id: l.account_id,
                        line_number: l.line_number,
                        description: l.description,
                        debit_amount: l.debit_amount,
                        credit_amount: l.credit_amount,
                    }),
            );
        }
        posted.sort_by(|a, b| {
            (a.entry_date, &a.entry_number, a.line_number).cmp(&(
                b.entry_date,
                &b.entry_number,
                b.line_number,
            ))
        });
        Ok(posted)
    }

    async fn transition_entry(
        &self,
        company_id: CompanyId,
        id: JournalEntryId,
        from: EntryStatus,
        transition: &EntryTransition,
    ) -> StoreResult<bool> {
        let applied = match self.entries.get_mut(&id) {
            Some(mut entry) if entry.company_id == company_id && entry.status == from => {
                transition.apply(&mut entry);
                true
            }
            _ => false,
        };
        if applied {
            self.save().await?;
        }
        Ok(applied)
    }

    // ========== Vouchers ==========

    async fn insert_voucher(&self, voucher: &Voucher) -> StoreResult<()> {
        reserve(
            &self.voucher_numbers,
            voucher.company_id,
            &voucher.voucher_number,
            voucher.id,
            VOUCHER_NUMBER_KEY,
        )?;
        self.vouchers.insert(voucher.id, voucher.clone());
        self.save().await
    }

    async fn update_voucher(&self, voucher: &Voucher) -> StoreResult<()> {
        {
            let mut current = self
                .vouchers
                .get_mut(&voucher.id)
                .filter(|v| v.company_id == voucher.company_id)
                .ok_or_else(|| StoreError::NotFound(format!("voucher {}", voucher.id)))?;
            *current = voucher.clone();
        }
        self.save().await
    }

    async fn find_voucher(
        &self,
        company_id: CompanyId,
        id: VoucherId,
    ) -> StoreResult<Option<Voucher>> {
        Ok(self
            .vouchers
            .get(&id)
            .filter(|v| v.company_id == company_id)
            .map(|v| v.value().clone()))
    }

    async fn list_vouchers(
        &self,
        company_id: CompanyId,
        filter: &VoucherFilter,
    ) -> StoreResult<Vec<Voucher>> {
        let mut vouchers: Vec<Voucher> = self
            .vouchers
            .iter()
            .filter(|v| v.company_id == company_id && filter.matches(v))
            .map(|v| v.value().clone())
            .collect();
        vouchers.sort_by(|a, b| (a.date, &a.voucher_number).cmp(&(b.date, &b.voucher_number)));
        Ok(vouchers)
    }

    async fn transition_voucher_status(
        &self,
        company_id: CompanyId,
        id: VoucherId,
        expected: VoucherStatus,
        to: VoucherStatus,
    ) -> StoreResult<bool> {
        let applied = match self.vouchers.get_mut(&id) {
            Some(mut voucher) if voucher.company_id == company_id && voucher.status == expected => {
                voucher.status = to;
                true
            }
            _ => false,
        };
        if applied {
            self.save().await?;
        }
        Ok(applied)
    }

    async fn attach_voucher_entry(
        &self,
        company_id: CompanyId,
        id: VoucherId,
        expected: VoucherStatus,
        entry_id: JournalEntryId,
    ) -> StoreResult<bool> {
        let applied = match self.vouchers.get_mut(&id) {
            Some(mut voucher) if voucher.company_id == company_id && voucher.status == expected => {
                voucher.journal_entry_id = Some(entry_id);
                true
            }
            _ => false,
        };
        if applied {
            self.save().await?;
        }
        Ok(applied)
    }

    // ========== Documents ==========

    async fn insert_document(
        &self,
        document: &Document,
        items: &[DocumentItem],
    ) -> StoreResult<()> {
        reserve(
            &self.document_numbers,
            document.company_id,
            &document.document_number,
            document.id,
            DOCUMENT_NUMBER_KEY,
        )?;
        self.items.insert(document.id, items.to_vec());
        self.documents.insert(document.id, document.clone());
        self.save().await
    }

    async fn update_document(&self, document: &Document) -> StoreResult<()> {
        {
            let mut current = self
                .documents
                .get_mut(&document.id)
                .filter(|d| d.company_id == document.company_id)
                .ok_or_else(|| StoreError::NotFound(format!("document {}", document.id)))?;
            *current = document.clone();
        }
        self.save().await
    }

    async fn find_document(
        &self,
        company_id: CompanyId,
        id: DocumentId,
    ) -> StoreResult<Option<Document>> {
        Ok(self.owned_document(company_id, id))
    }

    async fn find_document_items(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> StoreResult<Vec<DocumentItem>> {
        if self.owned_document(company_id, document_id).is_none() {
            return Ok(Vec::new());
        }
        Ok(self.items.get(&document_id).map(|i| i.value().clone()).unwrap_or_default())
    }

    async fn list_documents(
        &self,
        company_id: CompanyId,
        filter: &DocumentFilter,
    ) -> StoreResult<Vec<Document>> {
        let mut documents: Vec<Document> = self
            .documents
            .iter()
            .filter(|d| d.company_id == company_id && filter.matches(d))
            .map(|d| d.value().clone())
            .collect();
        documents.sort_by(|a, b| (a.date, &a.document_number).cmp(&(b.date, &b.document_number)));
        Ok(documents)
    }

    async fn transition_document_status(
        &self,
        company_id: CompanyId,
        id: DocumentId,
        expected: DocumentStatus,
        to: DocumentStatus,
    ) -> StoreResult<bool> {
        let applied = match self.documents.get_mut(&id) {
            Some(mut document)
                if document.company_id == company_id && document.status == expected =>
            {
                document.status = to;
                document.updated_at = Utc::now();
                true
            }
            _ => false,
        };
        if applied {
            self.save().await?;
        }
        Ok(applied)
    }

    async fn attach_document_entry(
        &self,
        company_id: CompanyId,
        id: DocumentId,
        expected: DocumentStatus,
        entry_id: JournalEntryId,
    ) -> StoreResult<bool> {
        let applied = match self.documents.get_mut(&id) {
            Some(mut document)
                if document.company_id == company_id && document.status == expected =>
            {
                document.generated_entry_id = Some(entry_id);
                document.updated_at = Utc::now();
                true
            }
            _ => false,
        };
        if applied {
            self.save().await?;
        }
        Ok(applied)
    }

    // ========== Document payments ==========

    async fn insert_payment(&self, payment: &DocumentPayment) -> StoreResult<()> {
        self.payments.insert(payment.id, payment.clone());
        self.save().await
    }

    async fn delete_payment(
        &self,
        company_id: CompanyId,
        id: DocumentPaymentId,
    ) -> StoreResult<bool> {
        let removed = self.payments.remove_if(&id, |_, p| p.company_id == company_id).is_some();
        if removed {
            self.save().await?;
        }
        Ok(removed)
    }

    async fn find_payment(
        &self,
        company_id: CompanyId,
        id: DocumentPaymentId,
    ) -> StoreResult<Option<DocumentPayment>> {
        Ok(self
            .payments
            .get(&id)
            .filter(|p| p.company_id == company_id)
            .map(|p| p.value().clone()))
    }

    async fn payments_for_document(
        &self,
        company_id: CompanyId,
        document_id: DocumentId,
    ) -> StoreResult<Vec<DocumentPayment>> {
        let mut payments: Vec<DocumentPayment> = self
            .payments
            .iter()
            .filter(|p| p.company_id == company_id && p.document_id == document_id)
            .map(|p| p.value().clone())
            .collect();
        payments.sort_by_key(|p| (p.created_at, p.id));
        Ok(payments)
    }

    async fn payments_for_voucher(
        &self,
        company_id: CompanyId,
        voucher_id: VoucherId,
    ) -> StoreResult<Vec<DocumentPayment>> {
        let mut payments: Vec<DocumentPayment> = self
            .payments
            .iter()
            .filter(|p| p.company_id == company_id && p.voucher_id == voucher_id)
            .map(|p| p.value().clone())
            .collect();
        payments.sort_by_key(|p| (p.created_at, p.id));
        Ok(payments)
    }
}
