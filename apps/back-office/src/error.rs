//! # API Error Type
//!
//! Unified error type for back office commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Silverline                             │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error? ─── DbError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Business Error? ─── CoreError::EmptyOrder ─────── ApiError ───►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  CLI prints the error as JSON on stderr:                                │
//! │  { "code": "NOT_FOUND", "message": "Product not found: payal-925" }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Missing settings, terms or rate samples are not errors. They resolve to
//! defaults further down and never reach this type.

use serde::Serialize;
use silverline_core::CoreError;
use silverline_db::DbError;

use crate::config::ConfigError;

/// What a failed command hands back to its caller.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Reseller not found: pune-chandi" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Safe to show an admin; storage details are logged, not returned.
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown product, reseller or order id
    NotFound,
    /// Bad rate, percent, weight, state code or setting key; overflowing amounts
    ValidationError,
    DatabaseError,
    /// Empty checkout, illegal status change
    BusinessLogic,
    /// Configuration could not be loaded
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("{entity} not found: {id}"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    fn storage(public: &str, detail: impl std::fmt::Display) -> Self {
        tracing::error!(detail = %detail, "{public}");
        Self::new(ErrorCode::DatabaseError, public)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => Self::not_found(&entity, &id),
            DbError::UniqueViolation { field, .. } => {
                Self::validation(format!("{field} is already taken"))
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!(detail = %message, "Rejected dangling reference");
                Self::validation("Referenced record does not exist")
            }
            DbError::CorruptValue { column, value } => {
                Self::storage("Stored data is corrupt", format!("{column}={value}"))
            }
            DbError::ConnectionFailed(e) => Self::storage("Database connection failed", e),
            DbError::MigrationFailed(e) => Self::storage("Database migration failed", e),
            DbError::PoolExhausted => Self::storage("Database pool exhausted", "pool timeout"),
            DbError::QueryFailed(e) | DbError::TransactionFailed(e) | DbError::Internal(e) => {
                Self::storage("Database operation failed", e)
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => Self::not_found("Product", &id),
            CoreError::ResellerNotFound(id) => Self::not_found("Reseller", &id),
            CoreError::OrderNotFound(id) => Self::not_found("Order", &id),
            CoreError::Validation(e) => Self::validation(e.to_string()),
            e @ CoreError::AmountOutOfRange { .. } => Self::validation(e.to_string()),
            e @ (CoreError::EmptyOrder | CoreError::InvalidStatusTransition { .. }) => {
                Self::new(ErrorCode::BusinessLogic, e.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
