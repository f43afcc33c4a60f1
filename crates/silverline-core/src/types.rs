//! # Domain Types
//!
//! Core domain types consumed by the pricing engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐  ┌──────────────────┐  ┌───────────────────┐  │
//! │  │ ProductPricing      │  │ CommercialTerms  │  │ GlobalPricing     │  │
//! │  │ ─────────────────── │  │ ──────────────── │  │ Settings          │  │
//! │  │ tunch_percentage    │  │ discount %       │  │ ───────────────── │  │
//! │  │ labor_per_kg        │  │ global loop %    │  │ extra charges %   │  │
//! │  │ offer               │  │ reseller state   │  │ gst rate %        │  │
//! │  └─────────────────────┘  └──────────────────┘  │ company state     │  │
//! │   owned by the catalog     owned by reseller    └───────────────────┘  │
//! │                                                  admin-mutable         │
//! │                                                                         │
//! │  ┌─────────────────────┐  ┌──────────────────┐                          │
//! │  │ Product             │  │ OrderStatus      │                          │
//! │  │ identity + pricing  │  │ pending → ...    │                          │
//! │  └─────────────────────┘  └──────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All three pricing inputs are read-only to the calculator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Offer
// =============================================================================

/// How an offer's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    /// `value` is a percent of the post-terms price.
    #[default]
    Percentage,
    /// `value` is a fixed rupee amount.
    Flat,
}

impl fmt::Display for OfferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferKind::Percentage => write!(f, "percentage"),
            OfferKind::Flat => write!(f, "flat"),
        }
    }
}

impl FromStr for OfferKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "percentage" | "percent" => Ok(OfferKind::Percentage),
            "flat" => Ok(OfferKind::Flat),
            _ => Err(ValidationError::NotAllowed {
                field: "offer_kind".to_string(),
                allowed: vec!["percentage".to_string(), "flat".to_string()],
            }),
        }
    }
}

/// A promotional offer attached to a product.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Offer {
    pub enabled: bool,
    pub kind: OfferKind,
    #[ts(type = "string")]
    pub value: Decimal,
    /// Display text, e.g. "Diwali 5% off".
    pub text: Option<String>,
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub valid_till: Option<DateTime<Utc>>,
}

impl Offer {
    /// An offer that never applies.
    pub fn none() -> Self {
        Offer::default()
    }

    /// Whether the offer applies at `now`.
    ///
    /// Enabled, and inside `[valid_from, valid_till]` where either bound may be open.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        if self.valid_from.is_some_and(|from| now < from) {
            return false;
        }
        if self.valid_till.is_some_and(|till| now > till) {
            return false;
        }
        true
    }

    /// Returns a copy that is disabled unless active at `now`.
    ///
    /// The calculator only looks at `enabled`, so callers resolve the window
    /// here before handing the attributes over.
    pub fn resolved_at(&self, now: DateTime<Utc>) -> Offer {
        Offer {
            enabled: self.is_active_at(now),
            ..self.clone()
        }
    }
}

// =============================================================================
// Product Pricing Attributes
// =============================================================================

/// The product-level trade terms the calculator reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPricingAttributes {
    /// Purity factor, 0–100.
    #[ts(type = "string")]
    pub tunch_percentage: Decimal,
    /// Making charge per kilogram.
    #[ts(type = "string")]
    pub labor_per_kg: Decimal,
    pub offer: Offer,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product: identity fields plus pricing attributes.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub hsn_code: Option<String>,
    pub pricing: ProductPricingAttributes,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Pricing attributes with the offer window resolved at `now`.
    pub fn pricing_at(&self, now: DateTime<Utc>) -> ProductPricingAttributes {
        ProductPricingAttributes {
            offer: self.pricing.offer.resolved_at(now),
            ..self.pricing.clone()
        }
    }
}

// =============================================================================
// Commercial Terms
// =============================================================================

/// Per-reseller negotiated terms.
///
/// `Default` is the "no reseller record" value: zero percentages, no state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CommercialTerms {
    #[ts(type = "string")]
    pub reseller_discount_percent: Decimal,
    #[ts(type = "string")]
    pub global_loop_percent: Decimal,
    pub reseller_state_code: Option<String>,
}

// =============================================================================
// Global Pricing Settings
// =============================================================================

/// Platform-wide pricing configuration.
///
/// Fetched fresh for every calculation and passed in by value. `Default`
/// is the fully unconfigured state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GlobalPricingSettings {
    #[ts(type = "string")]
    pub extra_charges_percent: Decimal,
    #[ts(type = "string")]
    pub gst_rate_percent: Decimal,
    pub company_state_code: Option<String>,
}

/// Keys of the key/value settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ExtraChargesPercent,
    GstRatePercent,
    CompanyStateCode,
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] = [
        SettingKey::ExtraChargesPercent,
        SettingKey::GstRatePercent,
        SettingKey::CompanyStateCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ExtraChargesPercent => "extra_charges_percent",
            SettingKey::GstRatePercent => "gst_rate_percent",
            SettingKey::CompanyStateCode => "company_state_code",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "setting".to_string(),
                allowed: SettingKey::ALL.iter().map(|k| k.to_string()).collect(),
            })
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order.
///
/// ```text
/// pending ──► confirmed ──► dispatched ──► delivered
///    │            │
///    └────────────┴──► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Dispatched,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Dispatched)
                | (Dispatched, Delivered)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Dispatched => "dispatched",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "dispatched" => Ok(OrderStatus::Dispatched),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: ["pending", "confirmed", "dispatched", "delivered", "cancelled"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_offer_window() {
        let offer = Offer {
            enabled: true,
            kind: OfferKind::Percentage,
            value: dec!(5),
            text: Some("Holi 5%".to_string()),
            valid_from: Some(at(10)),
            valid_till: Some(at(20)),
        };

        assert!(!offer.is_active_at(at(9)));
        assert!(offer.is_active_at(at(10)));
        assert!(offer.is_active_at(at(15)));
        assert!(offer.is_active_at(at(20)));
        assert!(!offer.is_active_at(at(21)));
    }

    #[test]
    fn test_offer_open_window_and_disabled() {
        let open = Offer {
            enabled: true,
            value: dec!(100),
            kind: OfferKind::Flat,
            ..Offer::default()
        };
        assert!(open.is_active_at(at(1)));

        let disabled = Offer {
            enabled: false,
            ..open.clone()
        };
        assert!(!disabled.is_active_at(at(1)));
    }

    #[test]
    fn test_resolved_offer_keeps_value() {
        let offer = Offer {
            enabled: true,
            kind: OfferKind::Flat,
            value: dec!(250),
            text: None,
            valid_from: None,
            valid_till: Some(at(5)),
        };
        let resolved = offer.resolved_at(at(6));
        assert!(!resolved.enabled);
        assert_eq!(resolved.value, dec!(250));
    }

    #[test]
    fn test_default_terms_and_settings_are_zero() {
        let terms = CommercialTerms::default();
        assert!(terms.reseller_discount_percent.is_zero());
        assert!(terms.global_loop_percent.is_zero());
        assert!(terms.reseller_state_code.is_none());

        let settings = GlobalPricingSettings::default();
        assert!(settings.gst_rate_percent.is_zero());
        assert!(settings.company_state_code.is_none());
    }

    #[test]
    fn test_setting_key_round_trip() {
        for key in SettingKey::ALL {
            assert_eq!(key.as_str().parse::<SettingKey>().unwrap(), key);
        }
        assert!("vat_rate".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_order_status_transitions() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Dispatched.can_transition_to(Cancelled));
        assert_eq!("Canceled".parse::<OrderStatus>().unwrap(), Cancelled);
    }
}
