//! Storage backends for the ledger.
//!
//! This crate provides:
//! - `SeaORM` entity definitions and the schema migration
//! - [`PgLedgerStore`], the PostgreSQL implementation of [`LedgerStore`]
//! - [`OfflineStore`], an in-process implementation with a JSON snapshot
//! - [`open_store`], which picks one from configuration

pub mod entities;
pub mod migration;
pub mod offline;
pub mod postgres;

mod error;

use std::sync::Arc;

pub use offline::OfflineStore;
pub use postgres::PgLedgerStore;

use ledgerline_core::store::{LedgerStore, StoreError};
use ledgerline_shared::config::{AppConfig, DatabaseConfig, StorageBackend};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Opens the backend selected by `storage.backend`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the offline snapshot
/// cannot be read.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn LedgerStore>, StoreError> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let db = connect(&config.database).await.map_err(error::store_error)?;
            info!(backend = "postgres", "ledger store ready");
            Ok(Arc::new(PgLedgerStore::new(db)))
        }
        StorageBackend::Offline => {
            let store = match &config.storage.offline_path {
                Some(path) => OfflineStore::open(path.clone()).await?,
                None => OfflineStore::new(),
            };
            info!(backend = "offline", "ledger store ready");
            Ok(Arc::new(store))
        }
    }
}
