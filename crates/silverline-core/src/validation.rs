//! # Validation Module
//!
//! Input normalisation for the pricing engine and validation for admin writes.
//!
//! ## Two Different Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pricing inputs (weights)           Admin writes (rates, settings,     │
//! │  ─────────────────────────          product terms)                     │
//! │  Never rejected.                    ──────────────────────────────     │
//! │  Negative or garbage → 0.           Rejected with ValidationError      │
//! │  A checkout must not fail           before anything is stored.         │
//! │  because a segment was blank.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Heaviest single quote or order line, in kilograms.
pub const MAX_WEIGHT_KG: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Highest silver rate accepted, in rupees per gram.
pub const MAX_RATE_PER_GRAM: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Ceiling for rupee inputs such as labor per kg or a flat offer.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

fn out_of_range(field: &str, max: Decimal) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: "0".to_string(),
        max: max.to_string(),
    }
}

fn non_negative_up_to(field: &str, value: Decimal, max: Decimal) -> ValidationResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    if value > max {
        return Err(out_of_range(field, max));
    }
    Ok(value)
}

// =============================================================================
// Weights
// =============================================================================

/// A weight-range bucket, e.g. "10–20 g pieces".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeightRange {
    #[ts(type = "string")]
    pub min: Decimal,
    #[ts(type = "string")]
    pub max: Decimal,
}

/// A sub-quantity of a product ordered within one weight range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WeightSegment {
    pub range: WeightRange,
    #[ts(type = "string")]
    pub weight_kg: Decimal,
}

/// Clamps a weight to zero if negative.
#[inline]
pub fn clamp_weight(weight_kg: Decimal) -> Decimal {
    weight_kg.max(Decimal::ZERO)
}

/// Sums segment weights, flooring each segment at zero first.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use silverline_core::validation::{total_weight, WeightRange, WeightSegment};
///
/// let range = WeightRange { min: Decimal::ZERO, max: Decimal::TEN };
/// let segments = vec![
///     WeightSegment { range: range.clone(), weight_kg: Decimal::new(5, 3) },
///     WeightSegment { range, weight_kg: Decimal::new(-2, 0) },
/// ];
/// assert_eq!(total_weight(&segments), Decimal::new(5, 3));
/// ```
pub fn total_weight(segments: &[WeightSegment]) -> Decimal {
    segments
        .iter()
        .map(|s| clamp_weight(s.weight_kg))
        .sum()
}

/// Rejects a (already clamped) line weight above [`MAX_WEIGHT_KG`].
///
/// Garbage and negative weights are zero by the time they get here; only
/// implausibly large ones fail.
pub fn validate_weight(weight_kg: Decimal) -> ValidationResult<Decimal> {
    if weight_kg > MAX_WEIGHT_KG {
        return Err(out_of_range("weight_kg", MAX_WEIGHT_KG));
    }
    Ok(weight_kg)
}

/// Parses a textual weight. Anything unparsable or negative becomes zero.
pub fn parse_weight(text: &str) -> Decimal {
    Decimal::from_str(text.trim())
        .map(clamp_weight)
        .unwrap_or(Decimal::ZERO)
}

// =============================================================================
// Admin Validators
// =============================================================================

/// Parses a decimal field, reporting the field name on failure.
pub fn parse_decimal(field: &str, text: &str) -> ValidationResult<Decimal> {
    Decimal::from_str(text.trim()).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Validates a silver rate per gram (0 to [`MAX_RATE_PER_GRAM`]).
pub fn validate_rate(rate_per_gram: Decimal) -> ValidationResult<Decimal> {
    non_negative_up_to("rate_per_gram", rate_per_gram, MAX_RATE_PER_GRAM)
}

/// Validates a percentage (discount, loop, extra charges, GST, offer) in 0–100.
pub fn validate_percent(field: &str, pct: Decimal) -> ValidationResult<Decimal> {
    non_negative_up_to(field, pct, Decimal::ONE_HUNDRED)
}

/// Validates a rupee amount (0 to [`MAX_AMOUNT`]).
pub fn validate_amount(field: &str, amount: Decimal) -> ValidationResult<Decimal> {
    non_negative_up_to(field, amount, MAX_AMOUNT)
}

/// Validates a tunch percentage (0–100).
pub fn validate_tunch(pct: Decimal) -> ValidationResult<Decimal> {
    if pct < Decimal::ZERO || pct > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "tunch_percentage".to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        });
    }
    Ok(pct)
}

/// Validates and normalises a GST state code (2 alphanumeric chars, uppercased).
///
/// ## Example
/// ```rust
/// use silverline_core::validation::validate_state_code;
///
/// assert_eq!(validate_state_code("mh").unwrap(), "MH");
/// assert_eq!(validate_state_code("27").unwrap(), "27");
/// assert!(validate_state_code("MAH").is_err());
/// ```
pub fn validate_state_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "state_code".to_string(),
        });
    }

    if code.chars().count() != 2 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "state_code".to_string(),
            reason: "must be exactly 2 letters or digits".to_string(),
        });
    }

    Ok(code.to_ascii_uppercase())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
