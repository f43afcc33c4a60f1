//! # Price Breakdown Calculator
//!
//! Turns weight, silver rate, product terms, reseller terms, offers and GST
//! into an itemised price.
//!
//! ## The Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Each step feeds the next. Later discounts are percentages OF earlier  │
//! │  totals, so the order is fixed.                                        │
//! │                                                                         │
//! │   1  silver_rate      = override ?? current rate                       │
//! │   2  base_price       = weight_kg × 1000 × silver_rate                 │
//! │   3  deduction_pct    = 100 − (tunch% + extra_charges%)                │
//! │   4  deduction_amount = base_price × deduction_pct / 100               │
//! │   5  labor_charges    = labor_per_kg × weight_kg                       │
//! │   6  subtotal         = base − deduction + labor                       │
//! │   7  reseller_disc    = subtotal × discount% / 100      (full only)    │
//! │   8  global_loop      = subtotal × loop% / 100          (full only)    │
//! │   9  after_terms      = subtotal − reseller_disc + global_loop         │
//! │  10  offer_discount   = after_terms × offer% / 100  |  flat value      │
//! │  11  taxable_amount   = after_terms − offer_discount                   │
//! │  12  GST split        on taxable_amount                                │
//! │  13  total_price      = taxable_amount + total GST                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Variants
//! - [`compute_simple`]: product + weight + global settings. No reseller
//!   terms, no jurisdiction split. Used for generic previews.
//! - [`compute_full`]: everything. Used for reseller-facing prices and
//!   checkout. Its [`PriceBreakdown::simple`] projection has the same fields
//!   as a [`SimpleBreakdown`].
//!
//! Nothing is clamped: a negative `deduction_pct` adds value back, and a flat
//! offer larger than the price yields a negative taxable amount and negative
//! GST. Both are carried through unchanged.
//!
//! Every step uses checked arithmetic. An input large enough to overflow
//! `Decimal` fails with [`CoreError::AmountOutOfRange`] instead of panicking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::tax::{resolve_gst, GstSplit};
use crate::types::{CommercialTerms, GlobalPricingSettings, OfferKind, ProductPricingAttributes};
use crate::validation::{clamp_weight, total_weight, WeightSegment};

/// Grams per kilogram.
const GRAMS_PER_KG: Decimal = Decimal::ONE_THOUSAND;

// =============================================================================
// Request
// =============================================================================

/// How the caller expresses quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum WeightInput {
    /// A single total weight.
    Total {
        #[ts(type = "string")]
        weight_kg: Decimal,
    },
    /// Per-range segments, summed with each floored at zero.
    Segments { segments: Vec<WeightSegment> },
}

impl WeightInput {
    /// The effective weight in kilograms (never negative).
    pub fn weight_kg(&self) -> Decimal {
        match self {
            WeightInput::Total { weight_kg } => clamp_weight(*weight_kg),
            WeightInput::Segments { segments } => total_weight(segments),
        }
    }
}

/// A quote request as both front ends send it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteRequest {
    pub product_id: String,
    #[serde(flatten)]
    pub weight: WeightInput,
    #[ts(type = "string | null")]
    pub rate_override: Option<Decimal>,
}

// =============================================================================
// Outputs
// =============================================================================

/// Output of the simple (preview) variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SimpleBreakdown {
    #[ts(type = "string")]
    pub weight_kg: Decimal,
    #[ts(type = "string")]
    pub silver_rate: Decimal,
    pub base_price: Money,
    #[ts(type = "string")]
    pub deduction_pct: Decimal,
    pub deduction_amount: Money,
    pub labor_charges: Money,
    pub subtotal: Money,
    pub offer_discount: Money,
    pub taxable_amount: Money,
    #[ts(type = "string")]
    pub gst_rate: Decimal,
    /// Same key as the flattened GST split of [`PriceBreakdown`].
    pub total_gst_amount: Money,
    pub total_price: Money,
}

/// Output of the full variant. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceBreakdown {
    #[ts(type = "string")]
    pub weight_kg: Decimal,
    #[ts(type = "string")]
    pub silver_rate: Decimal,
    pub base_price: Money,
    #[ts(type = "string")]
    pub deduction_pct: Decimal,
    pub deduction_amount: Money,
    pub labor_charges: Money,
    pub subtotal: Money,
    #[ts(type = "string")]
    pub reseller_discount_pct: Decimal,
    pub reseller_discount_amount: Money,
    #[ts(type = "string")]
    pub global_loop_pct: Decimal,
    pub global_loop_amount: Money,
    pub price_after_terms: Money,
    pub offer_discount: Money,
    pub taxable_amount: Money,
    #[ts(type = "string")]
    pub gst_rate: Decimal,
    #[serde(flatten)]
    pub gst: GstSplit,
    pub total_price: Money,
}

impl PriceBreakdown {
    /// Projects the fields shared with the simple variant.
    pub fn simple(&self) -> SimpleBreakdown {
        SimpleBreakdown {
            weight_kg: self.weight_kg,
            silver_rate: self.silver_rate,
            base_price: self.base_price,
            deduction_pct: self.deduction_pct,
            deduction_amount: self.deduction_amount,
            labor_charges: self.labor_charges,
            subtotal: self.subtotal,
            offer_discount: self.offer_discount,
            taxable_amount: self.taxable_amount,
            gst_rate: self.gst_rate,
            total_gst_amount: self.gst.total_gst_amount,
            total_price: self.total_price,
        }
    }
}

// =============================================================================
// Shared Steps
// =============================================================================

/// Turns an overflowed step into an error naming it.
fn step<T>(name: &'static str, value: Option<T>) -> CoreResult<T> {
    value.ok_or(CoreError::AmountOutOfRange { step: name })
}

/// Steps 2–6, shared by both variants.
struct MetalValue {
    base_price: Money,
    deduction_pct: Decimal,
    deduction_amount: Money,
    labor_charges: Money,
    subtotal: Money,
}

fn metal_value(
    product: &ProductPricingAttributes,
    weight_kg: Decimal,
    silver_rate: Decimal,
    extra_charges_percent: Decimal,
) -> CoreResult<MetalValue> {
    let base_price = step(
        "base_price",
        weight_kg
            .checked_mul(GRAMS_PER_KG)
            .and_then(|grams| grams.checked_mul(silver_rate))
            .map(Money::new),
    )?;
    let deduction_pct = step(
        "deduction_pct",
        product
            .tunch_percentage
            .checked_add(extra_charges_percent)
            .and_then(|kept| Decimal::ONE_HUNDRED.checked_sub(kept)),
    )?;
    let deduction_amount = step("deduction_amount", base_price.checked_percent(deduction_pct))?;
    let labor_charges = step(
        "labor_charges",
        product.labor_per_kg.checked_mul(weight_kg).map(Money::new),
    )?;
    let subtotal = step(
        "subtotal",
        base_price
            .checked_sub(deduction_amount)
            .and_then(|m| m.checked_add(labor_charges)),
    )?;

    Ok(MetalValue {
        base_price,
        deduction_pct,
        deduction_amount,
        labor_charges,
        subtotal,
    })
}

/// Steps 10–11: the offer discount on `price` and what remains taxable.
fn apply_offer(product: &ProductPricingAttributes, price: Money) -> CoreResult<(Money, Money)> {
    let offer = &product.offer;
    let discount = if !offer.enabled {
        Money::zero()
    } else {
        match offer.kind {
            OfferKind::Percentage => step("offer_discount", price.checked_percent(offer.value))?,
            OfferKind::Flat => Money::new(offer.value),
        }
    };
    let taxable = step("taxable_amount", price.checked_sub(discount))?;
    Ok((discount, taxable))
}

// =============================================================================
// Variants
// =============================================================================

/// Simple variant: no reseller terms, GST as a single undivided amount.
///
/// `current_rate` is the RateSource value, used when `rate_override` is `None`.
///
/// ## Errors
/// [`CoreError::AmountOutOfRange`] if an intermediate amount overflows.
/// Inputs within the admin validators' bounds never do.
pub fn compute_simple(
    product: &ProductPricingAttributes,
    weight_kg: Decimal,
    settings: &GlobalPricingSettings,
    current_rate: Decimal,
    rate_override: Option<Decimal>,
) -> CoreResult<SimpleBreakdown> {
    let weight_kg = clamp_weight(weight_kg);
    let silver_rate = rate_override.unwrap_or(current_rate);
    let metal = metal_value(product, weight_kg, silver_rate, settings.extra_charges_percent)?;

    let (offer_discount, taxable_amount) = apply_offer(product, metal.subtotal)?;
    let total_gst_amount = if settings.gst_rate_percent > Decimal::ZERO {
        step("gst", taxable_amount.checked_percent(settings.gst_rate_percent))?
    } else {
        Money::zero()
    };
    let total_price = step("total_price", taxable_amount.checked_add(total_gst_amount))?;

    Ok(SimpleBreakdown {
        weight_kg,
        silver_rate,
        base_price: metal.base_price,
        deduction_pct: metal.deduction_pct,
        deduction_amount: metal.deduction_amount,
        labor_charges: metal.labor_charges,
        subtotal: metal.subtotal,
        offer_discount,
        taxable_amount,
        gst_rate: settings.gst_rate_percent,
        total_gst_amount,
        total_price,
    })
}

/// Full variant: reseller terms, offer, and jurisdiction-aware GST.
///
/// ## Example
/// ```rust
/// use rust_decimal::Decimal;
/// use silverline_core::pricing::compute_full;
/// use silverline_core::types::*;
///
/// let product = ProductPricingAttributes {
///     tunch_percentage: Decimal::from(92),
///     labor_per_kg: Decimal::from(5000),
///     offer: Offer::none(),
/// };
/// let settings = GlobalPricingSettings {
///     extra_charges_percent: Decimal::from(2),
///     gst_rate_percent: Decimal::from(3),
///     company_state_code: Some("MH".to_string()),
/// };
/// let terms = CommercialTerms {
///     reseller_state_code: Some("MH".to_string()),
///     ..CommercialTerms::default()
/// };
///
/// let b = compute_full(&product, Decimal::new(10, 3), &terms, &settings, Decimal::from(80), None)
///     .unwrap();
/// assert_eq!(b.subtotal.amount(), Decimal::from(802));
/// assert_eq!(b.total_price.amount(), Decimal::new(82606, 2));
/// ```
pub fn compute_full(
    product: &ProductPricingAttributes,
    weight_kg: Decimal,
    terms: &CommercialTerms,
    settings: &GlobalPricingSettings,
    current_rate: Decimal,
    rate_override: Option<Decimal>,
) -> CoreResult<PriceBreakdown> {
    let weight_kg = clamp_weight(weight_kg);
    let silver_rate = rate_override.unwrap_or(current_rate);
    let metal = metal_value(product, weight_kg, silver_rate, settings.extra_charges_percent)?;

    let reseller_discount_amount = step(
        "reseller_discount",
        metal.subtotal.checked_percent(terms.reseller_discount_percent),
    )?;
    let global_loop_amount = step(
        "global_loop",
        metal.subtotal.checked_percent(terms.global_loop_percent),
    )?;
    let price_after_terms = step(
        "price_after_terms",
        metal
            .subtotal
            .checked_sub(reseller_discount_amount)
            .and_then(|m| m.checked_add(global_loop_amount)),
    )?;

    let (offer_discount, taxable_amount) = apply_offer(product, price_after_terms)?;

    let gst = resolve_gst(
        taxable_amount,
        settings.gst_rate_percent,
        settings.company_state_code.as_deref(),
        terms.reseller_state_code.as_deref(),
    )?;
    let total_price = step("total_price", taxable_amount.checked_add(gst.total_gst_amount))?;

    Ok(PriceBreakdown {
        weight_kg,
        silver_rate,
        base_price: metal.base_price,
        deduction_pct: metal.deduction_pct,
        deduction_amount: metal.deduction_amount,
        labor_charges: metal.labor_charges,
        subtotal: metal.subtotal,
        reseller_discount_pct: terms.reseller_discount_percent,
        reseller_discount_amount,
        global_loop_pct: terms.global_loop_percent,
        global_loop_amount,
        price_after_terms,
        offer_discount,
        taxable_amount,
        gst_rate: settings.gst_rate_percent,
        gst,
        total_price,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
