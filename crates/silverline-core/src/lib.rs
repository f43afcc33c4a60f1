//! # silverline-core: Pure Pricing Engine for Silverline
//!
//! This crate holds every pricing and tax rule of the Silverline wholesale
//! platform as pure functions. The admin back office and the reseller storefront
//! both call into it, so the two always agree to the paisa.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Silverline Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              back-office CLI / reseller storefront              │   │
//! │  │      quote, place order, render invoice, set rate/settings      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ silverline-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌──────────┐ │   │
//! │  │   │  rate   │ │ pricing │ │   tax   │ │snapshot │ │validation│ │   │
//! │  │   │ current │ │ simple  │ │ CGST/   │ │ freeze  │ │ weights  │ │   │
//! │  │   │ 24h/day │ │ full    │ │ SGST/   │ │ invoice │ │ percents │ │   │
//! │  │   │ trend   │ │ chain   │ │ IGST    │ │         │ │ states   │ │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                silverline-db (Database Layer)                   │   │
//! │  │     rate history, terms lookup, settings, order snapshots       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Offer, CommercialTerms, settings)
//! - [`money`] - Exact decimal rupee amounts
//! - [`rate`] - Current rate, 24h change and daily trend
//! - [`tax`] - GST jurisdiction split
//! - [`pricing`] - The breakdown chain, simple and full variants
//! - [`snapshot`] - Frozen order lines and invoice totals
//! - [`validation`] - Admin input checks and weight helpers
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: rate, terms, settings and "now" are all arguments
//! 2. **Decimal Money**: no floats, no rounding inside the chain
//! 3. **Fresh Inputs**: nothing here caches a rate or a setting
//! 4. **Frozen History**: placed orders are read from snapshots, never recomputed
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use silverline_core::pricing::compute_simple;
//! use silverline_core::types::{GlobalPricingSettings, Offer, ProductPricingAttributes};
//!
//! let product = ProductPricingAttributes {
//!     tunch_percentage: Decimal::from(92),
//!     labor_per_kg: Decimal::from(5000),
//!     offer: Offer::none(),
//! };
//! let settings = GlobalPricingSettings {
//!     extra_charges_percent: Decimal::from(2),
//!     gst_rate_percent: Decimal::from(3),
//!     company_state_code: None,
//! };
//!
//! // 10 g at ₹80/g
//! let preview =
//!     compute_simple(&product, Decimal::new(10, 3), &settings, Decimal::from(80), None).unwrap();
//! assert_eq!(preview.total_price.to_string(), "₹826.06");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pricing;
pub mod rate;
pub mod snapshot;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::{
    compute_full, compute_simple, PriceBreakdown, QuoteRequest, SimpleBreakdown, WeightInput,
};
pub use rate::{RateChange, RateHistory, RateSample, TrendPoint};
pub use snapshot::{
    InvoiceSummary, Order, OrderItemSnapshot, OrderTaxSnapshot, ProductIdentity, SnapshotMeta,
};
pub use tax::{resolve_gst, GstSplit};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Days covered by the rate trend when the caller does not say.
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// India Standard Time, in minutes east of UTC. Trend days are bucketed here.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Maximum lines in a single order.
pub const MAX_ORDER_LINES: usize = 100;
