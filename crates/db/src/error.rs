//! Mapping of database errors onto store errors.

use ledgerline_core::store::StoreError;
use sea_orm::{DbErr, SqlErr};

/// Classifies a `SeaORM` error.
///
/// Unique violations become `Conflict` so the services can retry numbering;
/// connection failures become `Unavailable`.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(constraint)) = err.sql_err() {
        return StoreError::Conflict(constraint);
    }
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => StoreError::Unavailable(err.to_string()),
        DbErr::RecordNotFound(what) => StoreError::NotFound(what),
        other => StoreError::Backend(other.to_string()),
    }
}

/// A column held a value the domain does not know.
pub(crate) fn corrupt(column: &str, value: &str) -> StoreError {
    StoreError::Backend(format!("unexpected {column} value '{value}'"))
}
