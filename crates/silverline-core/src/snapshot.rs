//! # Order Snapshot Module
//!
//! Freezes a full-variant breakdown onto an order line, and aggregates frozen
//! lines for invoices.
//!
//! ## Snapshot Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout                         any later view / print / export      │
//! │  ────────                         ─────────────────────────────────    │
//! │  fresh rate, terms, settings      OrderItemSnapshot rows ONLY          │
//! │          │                                 │                            │
//! │          ▼                                 ▼                            │
//! │  compute_full() ──► freeze() ──► INSERT   InvoiceSummary::from_lines() │
//! │                                                                         │
//! │  NEVER recompute a historical order with today's rate or settings.     │
//! │  The stored line is what the customer was charged.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pricing::PriceBreakdown;
use crate::types::{OrderStatus, Product};

/// Product identity captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductIdentity {
    pub product_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub hsn_code: Option<String>,
}

impl From<&Product> for ProductIdentity {
    fn from(product: &Product) -> Self {
        ProductIdentity {
            product_id: product.id.clone(),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            hsn_code: product.hsn_code.clone(),
        }
    }
}

/// Terms in force for the line at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SnapshotMeta {
    pub hsn_code: Option<String>,
    #[ts(type = "string")]
    pub rate_per_gm: Decimal,
    #[ts(type = "string")]
    pub deduction_pct: Decimal,
    #[ts(type = "string")]
    pub labor_per_kg: Decimal,
    pub product_name: String,
    pub product_image: Option<String>,
    pub offer_text: Option<String>,
}

/// One frozen order line.
///
/// Built only through [`OrderItemSnapshot::freeze`]. Once written it is the
/// sole source for invoicing, reporting and dispute resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItemSnapshot {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    #[ts(type = "string")]
    pub weight_kg: Decimal,
    #[ts(type = "string")]
    pub silver_rate: Decimal,
    pub base_price: Money,
    pub deduction_amount: Money,
    pub labor_charges: Money,
    pub discount_amount: Money,
    pub global_loop_amount: Money,
    pub offer_discount: Money,
    pub taxable_amount: Money,
    #[ts(type = "string")]
    pub gst_rate: Decimal,
    pub is_same_state: bool,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub igst_amount: Money,
    pub gst_amount: Money,
    pub item_total: Money,
    pub meta: SnapshotMeta,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItemSnapshot {
    /// Copies a breakdown's monetary fields verbatim onto a new line.
    ///
    /// `labor_per_kg` and `offer_text` come from the product attributes the
    /// breakdown was computed with.
    pub fn freeze(
        id: impl Into<String>,
        order_id: impl Into<String>,
        breakdown: &PriceBreakdown,
        identity: &ProductIdentity,
        labor_per_kg: Decimal,
        offer_text: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        OrderItemSnapshot {
            id: id.into(),
            order_id: order_id.into(),
            product_id: identity.product_id.clone(),
            weight_kg: breakdown.weight_kg,
            silver_rate: breakdown.silver_rate,
            base_price: breakdown.base_price,
            deduction_amount: breakdown.deduction_amount,
            labor_charges: breakdown.labor_charges,
            discount_amount: breakdown.reseller_discount_amount,
            global_loop_amount: breakdown.global_loop_amount,
            offer_discount: breakdown.offer_discount,
            taxable_amount: breakdown.taxable_amount,
            gst_rate: breakdown.gst_rate,
            is_same_state: breakdown.gst.is_same_state,
            cgst_amount: breakdown.gst.cgst_amount,
            sgst_amount: breakdown.gst.sgst_amount,
            igst_amount: breakdown.gst.igst_amount,
            gst_amount: breakdown.gst.total_gst_amount,
            item_total: breakdown.total_price,
            meta: SnapshotMeta {
                hsn_code: identity.hsn_code.clone(),
                rate_per_gm: breakdown.silver_rate,
                deduction_pct: breakdown.deduction_pct,
                labor_per_kg,
                product_name: identity.name.clone(),
                product_image: identity.image_url.clone(),
                offer_text: if breakdown.offer_discount.is_zero() {
                    None
                } else {
                    offer_text
                },
            },
            created_at,
        }
    }
}

// =============================================================================
// Order Header
// =============================================================================

/// Order-level values frozen at checkout alongside the lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTaxSnapshot {
    #[ts(type = "string")]
    pub gst_rate: Decimal,
    pub is_same_state: bool,
}

/// A placed order. Everything except `status` and `updated_at` is fixed at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Human-readable number, e.g. `SL-20260316-4F2A9C1B`.
    pub order_number: String,
    pub reseller_id: String,
    /// Seller name as printed on the invoice at checkout.
    pub seller_name: String,
    pub status: OrderStatus,
    #[ts(type = "string")]
    pub gst_rate: Decimal,
    pub is_same_state: bool,
    pub company_state_code: Option<String>,
    pub reseller_state_code: Option<String>,
    /// Σ line taxable amounts.
    pub subtotal: Money,
    /// Σ line GST amounts.
    pub gst_amount: Money,
    /// Σ line totals.
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds the header for freshly frozen lines.
    ///
    /// The order's GST rate and jurisdiction are the ones the lines were
    /// computed with.
    #[allow(clippy::too_many_arguments)]
    pub fn from_lines(
        id: impl Into<String>,
        order_number: impl Into<String>,
        reseller_id: impl Into<String>,
        seller_name: impl Into<String>,
        tax: OrderTaxSnapshot,
        company_state_code: Option<String>,
        reseller_state_code: Option<String>,
        lines: &[OrderItemSnapshot],
        created_at: DateTime<Utc>,
    ) -> Self {
        Order {
            id: id.into(),
            order_number: order_number.into(),
            reseller_id: reseller_id.into(),
            seller_name: seller_name.into(),
            status: OrderStatus::Pending,
            gst_rate: tax.gst_rate,
            is_same_state: tax.is_same_state,
            company_state_code,
            reseller_state_code,
            subtotal: lines.iter().map(|l| l.taxable_amount).sum(),
            gst_amount: lines.iter().map(|l| l.gst_amount).sum(),
            total: lines.iter().map(|l| l.item_total).sum(),
            created_at,
            updated_at: created_at,
        }
    }

    /// The stored tax values used when rendering the invoice.
    pub fn tax_snapshot(&self) -> OrderTaxSnapshot {
        OrderTaxSnapshot {
            gst_rate: self.gst_rate,
            is_same_state: self.is_same_state,
        }
    }
}

// =============================================================================
// Invoice Aggregation
// =============================================================================

/// Invoice totals, computed from stored lines only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceSummary {
    pub lines: Vec<OrderItemSnapshot>,
    /// Σ stored pre-tax line amounts.
    pub subtotal: Money,
    #[ts(type = "string")]
    pub gst_rate: Decimal,
    pub cgst_amount: Money,
    pub sgst_amount: Money,
    pub igst_amount: Money,
    /// `subtotal × stored gst_rate / 100`, recomputed for display only.
    pub gst_amount: Money,
    pub grand_total: Money,
    /// Σ stored line totals, for reconciling against the per-line figures.
    pub line_total_sum: Money,
}

impl InvoiceSummary {
    /// Aggregates stored lines using the order's stored GST rate and jurisdiction.
    pub fn from_lines(lines: Vec<OrderItemSnapshot>, tax: &OrderTaxSnapshot) -> Self {
        let subtotal: Money = lines.iter().map(|l| l.taxable_amount).sum();
        let line_total_sum: Money = lines.iter().map(|l| l.item_total).sum();

        let gst_amount = if tax.gst_rate > Decimal::ZERO {
            subtotal.percent(tax.gst_rate)
        } else {
            Money::zero()
        };

        let (cgst_amount, sgst_amount, igst_amount) = if gst_amount.is_zero() {
            (Money::zero(), Money::zero(), Money::zero())
        } else if tax.is_same_state {
            let half = subtotal.percent(tax.gst_rate / Decimal::TWO);
            (half, half, Money::zero())
        } else {
            (Money::zero(), Money::zero(), gst_amount)
        };

        InvoiceSummary {
            lines,
            subtotal,
            gst_rate: tax.gst_rate,
            cgst_amount,
            sgst_amount,
            igst_amount,
            gst_amount,
            grand_total: subtotal + gst_amount,
            line_total_sum,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::compute_full;
    use crate::types::{CommercialTerms, GlobalPricingSettings, Offer, ProductPricingAttributes};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn identity() -> ProductIdentity {
        ProductIdentity {
            product_id: "p-anklet".to_string(),
            name: "Payal 92.5".to_string(),
            image_url: Some("https://cdn.example/payal.jpg".to_string()),
            hsn_code: Some("7113".to_string()),
        }
    }

    fn attrs() -> ProductPricingAttributes {
        ProductPricingAttributes {
            tunch_percentage: dec!(92),
            labor_per_kg: dec!(5000),
            offer: Offer::none(),
        }
    }

    fn settings(gst: Decimal) -> GlobalPricingSettings {
        GlobalPricingSettings {
            extra_charges_percent: dec!(2),
            gst_rate_percent: gst,
            company_state_code: Some("MH".to_string()),
        }
    }

    fn terms() -> CommercialTerms {
        CommercialTerms {
            reseller_discount_percent: dec!(0),
            global_loop_percent: dec!(0),
            reseller_state_code: Some("MH".to_string()),
        }
    }

    fn frozen(rate: Decimal, id: &str) -> OrderItemSnapshot {
        let b = compute_full(&attrs(), dec!(0.010), &terms(), &settings(dec!(3)), rate, None)
            .unwrap();
        OrderItemSnapshot::freeze(
            id,
            "o-1",
            &b,
            &identity(),
            dec!(5000),
            None,
            Utc.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_freeze_copies_breakdown_verbatim() {
        let line = frozen(dec!(80), "l-1");

        assert_eq!(line.weight_kg, dec!(0.010));
        assert_eq!(line.silver_rate, dec!(80));
        assert_eq!(line.base_price.amount(), dec!(800));
        assert_eq!(line.deduction_amount.amount(), dec!(48));
        assert_eq!(line.labor_charges.amount(), dec!(50));
        assert_eq!(line.taxable_amount.amount(), dec!(802));
        assert_eq!(line.gst_amount.amount(), dec!(24.06));
        assert_eq!(line.cgst_amount.amount(), dec!(12.03));
        assert_eq!(line.item_total.amount(), dec!(826.06));
        assert_eq!(line.meta.hsn_code.as_deref(), Some("7113"));
        assert_eq!(line.meta.rate_per_gm, dec!(80));
        assert_eq!(line.meta.deduction_pct, dec!(6));
        assert_eq!(line.meta.product_name, "Payal 92.5");
    }

    #[test]
    fn test_offer_text_only_kept_when_applied() {
        let b = compute_full(&attrs(), dec!(0.010), &terms(), &settings(dec!(3)), dec!(80), None)
            .unwrap();
        let line = OrderItemSnapshot::freeze(
            "l-1",
            "o-1",
            &b,
            &identity(),
            dec!(5000),
            Some("Expired promo".to_string()),
            Utc::now(),
        );
        assert!(line.meta.offer_text.is_none());
    }

    #[test]
    fn test_invoice_sums_stored_lines() {
        let lines = vec![frozen(dec!(80), "l-1"), frozen(dec!(90), "l-2")];
        let tax = OrderTaxSnapshot {
            gst_rate: dec!(3),
            is_same_state: true,
        };
        let invoice = InvoiceSummary::from_lines(lines, &tax);

        // 802 + (900 - 54 + 50 = 896)
        assert_eq!(invoice.subtotal.amount(), dec!(1698));
        assert_eq!(invoice.gst_amount.amount(), dec!(50.94));
        assert_eq!(invoice.cgst_amount.amount(), dec!(25.47));
        assert_eq!(invoice.sgst_amount.amount(), dec!(25.47));
        assert!(invoice.igst_amount.is_zero());
        assert_eq!(invoice.grand_total.amount(), dec!(1748.94));
        assert_eq!(invoice.line_total_sum, invoice.grand_total);
    }

    #[test]
    fn test_invoice_uses_stored_rate_not_current() {
        // Lines were frozen at 3% GST; the order snapshot says 3%.
        let lines = vec![frozen(dec!(80), "l-1")];
        let tax = OrderTaxSnapshot {
            gst_rate: dec!(3),
            is_same_state: false,
        };
        let before = InvoiceSummary::from_lines(lines.clone(), &tax);

        // Settings later change to 5% and the rate to 120: a recompute would differ...
        let recomputed = compute_full(&attrs(), dec!(0.010), &terms(), &settings(dec!(5)), dec!(120), None)
            .unwrap();
        assert_ne!(recomputed.total_price, before.grand_total);

        // ...but the invoice reads only the stored lines.
        let after = InvoiceSummary::from_lines(lines, &tax);
        assert_eq!(before, after);
        assert_eq!(after.igst_amount.amount(), dec!(24.06));
        assert_eq!(after.grand_total.amount(), dec!(826.06));
    }

    #[test]
    fn test_order_header_sums_lines() {
        let lines = vec![frozen(dec!(80), "l-1"), frozen(dec!(90), "l-2")];
        let tax = OrderTaxSnapshot {
            gst_rate: dec!(3),
            is_same_state: true,
        };
        let order = Order::from_lines(
            "o-1",
            "SL-20260316-00000001",
            "r-1",
            "Silverline Wholesale",
            tax.clone(),
            Some("MH".to_string()),
            Some("MH".to_string()),
            &lines,
            Utc::now(),
        );

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal.amount(), dec!(1698));
        assert_eq!(order.gst_amount.amount(), dec!(50.94));
        assert_eq!(order.total.amount(), dec!(1748.94));
        assert_eq!(order.tax_snapshot(), tax);

        let invoice = InvoiceSummary::from_lines(lines, &order.tax_snapshot());
        assert_eq!(invoice.grand_total, order.total);
    }

    #[test]
    fn test_invoice_without_gst() {
        let lines = vec![frozen(dec!(80), "l-1")];
        let tax = OrderTaxSnapshot {
            gst_rate: dec!(0),
            is_same_state: true,
        };
        let invoice = InvoiceSummary::from_lines(lines, &tax);
        assert!(invoice.gst_amount.is_zero());
        assert_eq!(invoice.grand_total, invoice.subtotal);
    }
}
