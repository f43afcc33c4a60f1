//! # Order Commands
//!
//! Checkout and the order status lifecycle.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        place_order                                      │
//! │                                                                         │
//! │  1. Reject empty / oversized orders                                     │
//! │  2. Resolve reseller terms (must exist)    ─┐                           │
//! │  3. Resolve global settings                 ├─ read ONCE per order      │
//! │  4. Read current rate                      ─┘                           │
//! │  5. For each line:                                                      │
//! │       load product ─► pricing_at(now) ─► compute_full ─► freeze         │
//! │  6. Build order header (seller name, tax) from the frozen lines         │
//! │  7. Insert order + items in one transaction                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! After step 7 the lines are never recomputed. Invoices read them as stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::commands::quote::{checked_weight, load_pricing};
use crate::error::ApiError;
use crate::state::{ConfigState, DbState, TermsState};
use silverline_core::{
    compute_full, CoreError, Order, OrderItemSnapshot, OrderStatus, OrderTaxSnapshot,
    ProductIdentity, ValidationError, WeightInput, MAX_ORDER_LINES,
};
use silverline_db::repository::order::{generate_order_id, generate_order_number};

/// One requested line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    #[serde(flatten)]
    pub weight: WeightInput,
}

/// A placed order with its frozen lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItemSnapshot>,
}

/// Prices and stores an order for `reseller_id`.
pub async fn place_order(
    db: &DbState,
    terms: &TermsState,
    config: &ConfigState,
    reseller_id: &str,
    lines: &[OrderLineRequest],
    now: DateTime<Utc>,
) -> Result<PlacedOrder, ApiError> {
    debug!(reseller_id = %reseller_id, lines = lines.len(), "place_order command");

    if lines.is_empty() {
        return Err(CoreError::EmptyOrder.into());
    }
    if lines.len() > MAX_ORDER_LINES {
        return Err(CoreError::from(ValidationError::OutOfRange {
            field: "lines".to_string(),
            min: "1".to_string(),
            max: MAX_ORDER_LINES.to_string(),
        })
        .into());
    }

    let reseller_terms = terms
        .inner()
        .resolve_existing(reseller_id)
        .await?
        .ok_or_else(|| CoreError::ResellerNotFound(reseller_id.to_string()))?;
    let settings = terms.inner().resolve_global_settings().await?;
    let current_rate = db.inner().rates().current_rate().await?;

    let order_id = generate_order_id();
    let mut items = Vec::with_capacity(lines.len());
    let mut is_same_state = true;

    for line in lines {
        let weight_kg = checked_weight(&line.weight)?;
        let (product, pricing) = load_pricing(db, &line.product_id, now).await?;
        let breakdown = compute_full(
            &pricing,
            weight_kg,
            &reseller_terms,
            &settings,
            current_rate,
            None,
        )?;
        is_same_state = breakdown.gst.is_same_state;

        items.push(OrderItemSnapshot::freeze(
            Uuid::new_v4().to_string(),
            order_id.clone(),
            &breakdown,
            &ProductIdentity::from(&product),
            pricing.labor_per_kg,
            pricing.offer.text.clone(),
            now,
        ));
    }

    let order = Order::from_lines(
        order_id,
        generate_order_number(),
        reseller_id,
        config.company_name(),
        OrderTaxSnapshot {
            gst_rate: settings.gst_rate_percent,
            is_same_state,
        },
        settings.company_state_code.clone(),
        reseller_terms.reseller_state_code.clone(),
        &items,
        now,
    );

    db.inner().orders().place(&order, &items).await?;

    info!(
        order_id = %order.id,
        order_number = %order.order_number,
        reseller_id = %reseller_id,
        lines = items.len(),
        total = %order.total,
        "Order placed"
    );

    Ok(PlacedOrder { order, items })
}

/// Moves an order to `next`. Snapshot fields are untouched.
pub async fn update_order_status(
    db: &DbState,
    order_id: &str,
    next: OrderStatus,
) -> Result<Order, ApiError> {
    debug!(order_id = %order_id, status = %next, "update_order_status command");

    let order = db
        .inner()
        .orders()
        .get(order_id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

    if !order.status.can_transition_to(next) {
        return Err(CoreError::InvalidStatusTransition {
            order_id: order_id.to_string(),
            from: order.status.to_string(),
            to: next.to_string(),
        }
        .into());
    }

    db.inner()
        .orders()
        .update_status(order_id, order.status, next)
        .await?;

    info!(order_id = %order_id, from = %order.status, to = %next, "Order status changed");

    db.inner()
        .orders()
        .get(order_id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()).into())
}

/// Most recent orders for a reseller.
pub async fn list_orders(
    db: &DbState,
    reseller_id: &str,
    limit: Option<u32>,
) -> Result<Vec<Order>, ApiError> {
    let limit = limit.unwrap_or(20).min(200);
    Ok(db.inner().orders().list_for_reseller(reseller_id, limit).await?)
}
