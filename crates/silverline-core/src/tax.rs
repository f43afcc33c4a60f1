//! # GST Jurisdiction Module
//!
//! Decides how GST is split for a taxable amount.
//!
//! ## Decision Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  gst_rate   company   reseller    result                               │
//! │  ────────   ───────   ────────    ──────────────────────────────────── │
//! │  0          any       any         no GST, is_same_state = true         │
//! │  > 0        "MH"      "mh"        intra-state: CGST = SGST = rate / 2  │
//! │  > 0        "MH"      "GJ"        inter-state: IGST = rate             │
//! │  > 0        None      any         inter-state: IGST = rate             │
//! │  > 0        any       None        inter-state: IGST = rate             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A missing state code on either side is billed as inter-state. Empty strings
//! count as missing. Codes are compared case-insensitively and are not trimmed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// The resolved GST split for one taxable amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GstSplit {
    pub is_gst_enabled: bool,
    pub is_same_state: bool,
    #[ts(type = "string")]
    pub cgst_rate: Decimal,
    #[ts(type = "string")]
    pub sgst_rate: Decimal,
    #[ts(type = "string")]
    pub igst_rate: Decimal,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub igst_amount: Money,
    pub total_gst_amount: Money,
}

impl GstSplit {
    /// The split when GST is disabled: all zero, vacuously same-state.
    pub fn disabled() -> Self {
        GstSplit {
            is_gst_enabled: false,
            is_same_state: true,
            cgst_rate: Decimal::ZERO,
            sgst_rate: Decimal::ZERO,
            igst_rate: Decimal::ZERO,
            cgst_amount: Money::zero(),
            sgst_amount: Money::zero(),
            igst_amount: Money::zero(),
            total_gst_amount: Money::zero(),
        }
    }
}

/// Whether both codes are present and equal, ignoring ASCII case.
pub fn is_same_state(company_state_code: Option<&str>, reseller_state_code: Option<&str>) -> bool {
    match (
        company_state_code.filter(|c| !c.is_empty()),
        reseller_state_code.filter(|c| !c.is_empty()),
    ) {
        (Some(company), Some(reseller)) => company.eq_ignore_ascii_case(reseller),
        _ => false,
    }
}

/// Resolves the GST split for `taxable_amount`.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use silverline_core::money::Money;
/// use silverline_core::tax::resolve_gst;
///
/// let split =
///     resolve_gst(Money::new(Decimal::from(802)), Decimal::from(3), Some("MH"), Some("MH")).unwrap();
/// assert!(split.is_same_state);
/// assert_eq!(split.cgst_amount.amount(), Decimal::new(1203, 2));
/// ```
pub fn resolve_gst(
    taxable_amount: Money,
    gst_rate_percent: Decimal,
    company_state_code: Option<&str>,
    reseller_state_code: Option<&str>,
) -> CoreResult<GstSplit> {
    if gst_rate_percent <= Decimal::ZERO {
        return Ok(GstSplit::disabled());
    }

    let out_of_range = || CoreError::AmountOutOfRange { step: "gst" };

    if is_same_state(company_state_code, reseller_state_code) {
        let half = gst_rate_percent / Decimal::TWO;
        let cgst_amount = taxable_amount.checked_percent(half).ok_or_else(out_of_range)?;
        let sgst_amount = cgst_amount;

        Ok(GstSplit {
            is_gst_enabled: true,
            is_same_state: true,
            cgst_rate: half,
            sgst_rate: half,
            igst_rate: Decimal::ZERO,
            cgst_amount,
            sgst_amount,
            igst_amount: Money::zero(),
            total_gst_amount: cgst_amount.checked_add(sgst_amount).ok_or_else(out_of_range)?,
        })
    } else {
        let igst_amount = taxable_amount
            .checked_percent(gst_rate_percent)
            .ok_or_else(out_of_range)?;

        Ok(GstSplit {
            is_gst_enabled: true,
            is_same_state: false,
            cgst_rate: Decimal::ZERO,
            sgst_rate: Decimal::ZERO,
            igst_rate: gst_rate_percent,
            cgst_amount: Money::zero(),
            sgst_amount: Money::zero(),
            igst_amount,
            total_gst_amount: igst_amount,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
