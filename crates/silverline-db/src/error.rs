//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)         bad TEXT in a decimal column       │
//! │       │                                      │                          │
//! │       ▼                                      ▼                          │
//! │  DbError (this module) ◄──────────── DbError::CorruptValue             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in back-office) ← Serialized for the caller                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use sqlx::error::ErrorKind;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row for the given key, or an update matched nothing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write (duplicate order number, line id).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// An order for an unknown reseller, or a line for an unknown order.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other statement failure, including the `order_items` trigger
    /// rejecting an UPDATE.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A TEXT column that should hold a decimal does not.
    #[error("Corrupt value in {column}: '{value}'")]
    CorruptValue { column: String, value: String },

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn corrupt(column: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::CorruptValue {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Maps sqlx errors by the driver's constraint classification.
///
/// ```text
/// RowNotFound                     → NotFound
/// Database(kind UniqueViolation)  → UniqueViolation { field: "table.column" }
/// Database(kind ForeignKey...)    → ForeignKeyViolation
/// Database(anything else)         → QueryFailed (trigger aborts land here)
/// PoolTimedOut                    → PoolExhausted
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        field: message
                            .rsplit(": ")
                            .next()
                            .unwrap_or("unknown")
                            .to_string(),
                        value: "unknown".to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation { message },
                    _ => DbError::QueryFailed(message),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::Migrate(e) => DbError::MigrationFailed(e.to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Column Helpers
// =============================================================================

/// Reads a TEXT column holding a decimal.
pub(crate) fn decimal_col(row: &SqliteRow, column: &str) -> DbResult<Decimal> {
    let text: String = row.try_get(column)?;
    Decimal::from_str(&text).map_err(|_| DbError::corrupt(column, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("Order", "o-1").to_string(),
            "Order not found: o-1"
        );
        assert_eq!(
            DbError::corrupt("rate_per_gram", "abc").to_string(),
            "Corrupt value in rate_per_gram: 'abc'"
        );
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
