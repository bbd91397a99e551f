//! Application-wide error types.
//!
//! Domain errors from the ledger crates are mapped into `AppError` at the edge,
//! so callers embedding the engine deal with one small taxonomy.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Access denied by the permission gate.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied data violates a domain invariant.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation is not legal in the entity's current state.
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Conflict (e.g., duplicate account code or entry number).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage backend error or unavailability.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error, including unreconciled partial writes.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP-equivalent status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::PreconditionFailed(_) => 422,
            Self::Conflict(_) => 409,
            Self::Storage(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PreconditionFailed(_) => "PRECONDITION_FAILED",
            Self::Conflict(_) => "CONFLICT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Forbidden(String::new()).status_code(), 403);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(AppError::PreconditionFailed(String::new()).status_code(), 422);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::Storage(String::new()).status_code(), 503);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::Forbidden(String::new()).error_code(), "FORBIDDEN");
        assert_eq!(
            AppError::PreconditionFailed(String::new()).error_code(),
            "PRECONDITION_FAILED"
        );
        assert_eq!(AppError::Storage(String::new()).error_code(), "STORAGE_ERROR");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::PreconditionFailed("msg".into()).to_string(),
            "Precondition failed: msg"
        );
        assert_eq!(AppError::Conflict("msg".into()).to_string(), "Conflict: msg");
    }
}
