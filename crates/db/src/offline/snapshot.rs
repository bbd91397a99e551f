//! JSON snapshot of the offline tables.

use std::path::Path;

use ledgerline_core::bridge::{Document, DocumentItem, DocumentPayment, Voucher};
use ledgerline_core::ledger::{Account, JournalEntry, JournalEntryLine};
use ledgerline_core::store::{StoreError, StoreResult};
use ledgerline_shared::types::CompanyId;
use serde::{Deserialize, Serialize};

/// One numbering counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct SequenceRow {
    pub company_id: CompanyId,
    pub key: String,
    pub last_value: i64,
}

/// Everything the offline store holds, flattened to lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Snapshot {
    pub sequences: Vec<SequenceRow>,
    pub accounts: Vec<Account>,
    pub entries: Vec<JournalEntry>,
    pub lines: Vec<JournalEntryLine>,
    pub vouchers: Vec<Voucher>,
    pub documents: Vec<Document>,
    pub items: Vec<DocumentItem>,
    pub payments: Vec<DocumentPayment>,
}

impl Snapshot {
    /// Reads a snapshot; a missing file is an empty store.
    pub(crate) async fn read(path: &Path) -> StoreResult<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(io_error(path, &err)),
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Backend(format!("corrupt snapshot {}: {e}", path.display())))
    }

    /// Writes the snapshot next to `path` and renames it into place.
    pub(crate) async fn write(&self, path: &Path) -> StoreResult<()> {
        let bytes = serde_json::to_vec_pretty(self)
            .map_err(|e| StoreError::Backend(format!("snapshot encoding failed: {e}")))?;
        let staging = path.with_extension("json.tmp");
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error(dir, &e))?;
        }
        tokio::fs::write(&staging, bytes)
            .await
            .map_err(|e| io_error(&staging, &e))?;
        tokio::fs::rename(&staging, path)
            .await
            .map_err(|e| io_error(path, &e))
    }
}

fn io_error(path: &Path, err: &std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {err}", path.display()))
}
