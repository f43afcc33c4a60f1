//! # Error Types
//!
//! Domain-specific error types for silverline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  silverline-core errors (this file)                                    │
//! │  ├── CoreError        - Lookup and order-level failures                │
//! │  └── ValidationError  - Admin input rejected before it is stored       │
//! │                                                                         │
//! │  silverline-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  back-office errors (in app)                                           │
//! │  └── ApiError         - What the caller sees (serialized)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! A missing settings key, a missing reseller terms row, or an empty rate
//! history never fails a price. Those resolve to zero / `None` defaults.
//! Negative or unparsable weights are clamped to zero, not rejected.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    ///
    /// ## When This Occurs
    /// - Quote or checkout references an unknown product id
    /// - Product was deactivated from the catalog
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Reseller account does not exist.
    ///
    /// Only raised at checkout. Price previews fall back to zero terms.
    #[error("Reseller not found: {0}")]
    ResellerNotFound(String),

    /// Order cannot be found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Checkout was attempted with no lines.
    #[error("Order must contain at least one line")]
    EmptyOrder,

    /// Order status transition is not allowed.
    #[error("Order {order_id} is {from}, cannot move to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: String,
        to: String,
    },

    /// A pricing step left the representable decimal range.
    ///
    /// Only reachable with inputs far outside the admin validators' bounds.
    #[error("Amount out of range while computing {step}")]
    AmountOutOfRange { step: &'static str },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for admin-side writes.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., state code, decimal text).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::ProductNotFound("p-42".to_string());
        assert_eq!(err.to_string(), "Product not found: p-42");

        let err = CoreError::InvalidStatusTransition {
            order_id: "o-1".to_string(),
            from: "delivered".to_string(),
            to: "pending".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order o-1 is delivered, cannot move to pending"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::MustNotBeNegative {
            field: "rate_per_gram".to_string(),
        };
        assert_eq!(err.to_string(), "rate_per_gram must not be negative");

        let err = ValidationError::OutOfRange {
            field: "tunch_percentage".to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        };
        assert_eq!(err.to_string(), "tunch_percentage must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
