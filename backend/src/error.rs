//! Error taxonomy for the rent ledger core.
//!
//! Every fallible operation in the domain layer returns a `LedgerError`.
//! Validation and not-found errors are user-visible rejections; persistence
//! errors abort the whole operation and surface as a generic failure at the
//! REST boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A caller-supplied field failed validation (empty name, non-positive
    /// rent, month outside 1-12, ...).
    #[error("{0}")]
    Validation(String),

    /// The supplied meter reading is behind the tenant's cursor. The bill
    /// generation that raised this performed no writes.
    #[error("end reading {end_reading} cannot be less than last reading {last_reading}")]
    InvalidReading { last_reading: i64, end_reading: i64 },

    #[error("tenant {0} not found")]
    TenantNotFound(i64),

    #[error("bill {0} not found")]
    BillNotFound(i64),

    /// Storage unavailable or a write failed mid-operation.
    #[error("storage failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reading_message_names_both_values() {
        let err = LedgerError::InvalidReading {
            last_reading: 150,
            end_reading: 140,
        };
        let msg = err.to_string();
        assert!(msg.contains("140"));
        assert!(msg.contains("150"));
    }

    #[test]
    fn test_sqlx_error_converts_to_persistence() {
        let err: LedgerError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, LedgerError::Persistence(_)));
    }
}
