//! # Money Module
//!
//! Provides the `Money` type for rupee amounts.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    802 × 1.5 / 100 = 12.030000000000001  ❌                             │
//! │                                                                         │
//! │  A line price is a chain of percent-of-percent steps:                  │
//! │    base → deduction → subtotal → discount → loop → offer → GST         │
//! │  Every float step can drift, and the admin and reseller views          │
//! │  must agree to the paisa.                                              │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 Decimal, never rounded mid-chain                │
//! │    802 × 1.5 / 100 = 12.03 exactly                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use silverline_core::money::Money;
//!
//! let subtotal = Money::new(Decimal::from(802));
//! let cgst = subtotal.percent(Decimal::new(15, 1)); // 1.5%
//! assert_eq!(cgst.amount(), Decimal::new(1203, 2));
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A rupee amount with exact decimal precision.
///
/// ## Design Decisions
/// - **Signed**: flat offers can push a taxable amount below zero and that
///   value is carried through as-is
/// - **Unrounded**: the calculator never rounds; `round_paise` is for display
/// - **Serialized as a string**: `"826.06"`, so JSON consumers never see floats
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(#[ts(type = "string")] Decimal);

impl Money {
    /// Wraps a decimal rupee value.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns zero rupees.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the raw decimal value.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns `pct` percent of this amount (`self × pct / 100`).
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use silverline_core::money::Money;
    ///
    /// let base = Money::new(Decimal::from(800));
    /// assert_eq!(base.percent(Decimal::from(6)).amount(), Decimal::from(48));
    /// ```
    ///
    /// Negative percentages are allowed and produce a negative share.
    #[inline]
    pub fn percent(&self, pct: Decimal) -> Money {
        Money(self.0 * pct / Decimal::ONE_HUNDRED)
    }

    /// [`Money::percent`] that reports overflow instead of panicking.
    pub fn checked_percent(&self, pct: Decimal) -> Option<Money> {
        self.0
            .checked_mul(pct)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .map(Money)
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Rounds to paise (2 dp, half away from zero) for display.
    ///
    /// ## Note
    /// Never used inside the pricing chain. Stored snapshots keep full precision.
    pub fn round_paise(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows rupees rounded to paise, e.g. `₹826.06` or `-₹203.94`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_paise().0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        write!(f, "{}₹{:.2}", sign, rounded.abs())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Scaling by a decimal factor (weight, rate per gram).
impl Mul<Decimal> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: Decimal) -> Self {
        Money(self.0 * factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
