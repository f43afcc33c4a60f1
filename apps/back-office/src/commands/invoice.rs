//! # Invoice Commands
//!
//! Renders an invoice from the stored order and its frozen lines.
//!
//! Reads nothing else: no product, no settings, no rate, no config. The
//! seller name comes from the order header. Changing any of those after
//! checkout leaves every past invoice byte-identical.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::DbState;
use silverline_core::{CoreError, InvoiceSummary, Order};

/// Everything printed on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDocument {
    pub company_name: String,
    pub order: Order,
    pub summary: InvoiceSummary,
}

/// Builds the invoice for `order_id`.
pub async fn render_invoice(db: &DbState, order_id: &str) -> Result<InvoiceDocument, ApiError> {
    debug!(order_id = %order_id, "render_invoice command");

    let order = db
        .inner()
        .orders()
        .get(order_id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
    let lines = db.inner().orders().items(order_id).await?;

    let summary = InvoiceSummary::from_lines(lines, &order.tax_snapshot());

    Ok(InvoiceDocument {
        company_name: order.seller_name.clone(),
        order,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::order::{place_order, OrderLineRequest};
    use crate::commands::test_support::seeded_state;
    use crate::config::AppConfig;
    use crate::state::ConfigState;
    use crate::error::ErrorCode;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use silverline_core::{RateSample, SettingKey, WeightInput};

    #[tokio::test]
    async fn test_invoice_survives_later_changes() {
        let (state, now) = seeded_state().await;
        let placed = place_order(
            &state.db,
            &state.terms,
            &state.config,
            "pune-chandi",
            &[OrderLineRequest {
                product_id: "bichiya-80".to_string(),
                weight: WeightInput::Total { weight_kg: dec!(0.4) },
            }],
            now,
        )
        .await
        .unwrap();
        let order_id = placed.order.id.as_str();

        let before = render_invoice(&state.db, order_id).await.unwrap();
        let before_json = serde_json::to_string(&before).unwrap();

        // Everything a recomputation would read changes
        let db = state.db.inner();
        db.settings().put(SettingKey::GstRatePercent, "12").await.unwrap();
        db.settings().put(SettingKey::ExtraChargesPercent, "9").await.unwrap();
        db.settings().put(SettingKey::CompanyStateCode, "KA").await.unwrap();
        db.resellers()
            .upsert_terms("pune-chandi", Decimal::from(20), Decimal::ZERO)
            .await
            .unwrap();
        db.rate_samples()
            .append(&RateSample {
                rate_per_gram: dec!(150),
                observed_at: now,
            })
            .await
            .unwrap();

        let after = render_invoice(&state.db, order_id).await.unwrap();
        assert_eq!(serde_json::to_string(&after).unwrap(), before_json);
        assert_eq!(after.summary.gst_rate, dec!(3));
        assert_eq!(after.summary.lines[0].silver_rate, dec!(92.55));
        assert_eq!(after.company_name, "Silverline Wholesale");
    }

    #[tokio::test]
    async fn test_invoice_split_and_reconciliation() {
        let (state, now) = seeded_state().await;
        let placed = place_order(
            &state.db,
            &state.terms,
            &state.config,
            "pune-chandi",
            &[
                OrderLineRequest {
                    product_id: "kada-70".to_string(),
                    weight: WeightInput::Total { weight_kg: dec!(1) },
                },
                OrderLineRequest {
                    product_id: "chain-925".to_string(),
                    weight: WeightInput::Total { weight_kg: dec!(0.5) },
                },
            ],
            now,
        )
        .await
        .unwrap();

        let invoice = render_invoice(&state.db, &placed.order.id)
            .await
            .unwrap();
        let summary = &invoice.summary;

        assert_eq!(summary.subtotal, placed.order.subtotal);
        assert_eq!(summary.cgst_amount, summary.sgst_amount);
        assert!(summary.igst_amount.is_zero());
        assert_eq!(summary.grand_total, summary.subtotal + summary.gst_amount);
        assert_eq!(summary.line_total_sum, placed.order.total);
    }

    #[tokio::test]
    async fn test_seller_name_is_frozen_per_order() {
        let (state, now) = seeded_state().await;
        let lines = [OrderLineRequest {
            product_id: "kada-70".to_string(),
            weight: WeightInput::Total { weight_kg: dec!(1) },
        }];

        let first = place_order(
            &state.db,
            &state.terms,
            &state.config,
            "pune-chandi",
            &lines,
            now,
        )
        .await
        .unwrap();

        let renamed = ConfigState::new(AppConfig {
            company_name: "Silverline Exports".to_string(),
            ..state.config.config().clone()
        })
        .unwrap();
        let second = place_order(&state.db, &state.terms, &renamed, "pune-chandi", &lines, now)
            .await
            .unwrap();

        let old = render_invoice(&state.db, &first.order.id).await.unwrap();
        let new = render_invoice(&state.db, &second.order.id).await.unwrap();
        assert_eq!(old.company_name, "Silverline Wholesale");
        assert_eq!(new.company_name, "Silverline Exports");
        assert_eq!(old.summary.grand_total, new.summary.grand_total);
    }

    #[tokio::test]
    async fn test_missing_order() {
        let (state, _) = seeded_state().await;
        let err = render_invoice(&state.db, "o-missing")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
