//! # Quote Commands
//!
//! The two call sites of the price calculator.
//!
//! ```text
//!   admin preview ─────► compute_simple(product, weight, settings, rate)
//!   reseller quote ────► compute_full(product, weight, terms, settings, rate)
//!                               ▲          ▲        ▲        ▲
//!                               │          │        │        └─ RateSource, per call
//!                               │          │        └────────── settings rows, per call
//!                               │          └─────────────────── terms source, per call
//!                               └────────────────────────────── product, offer resolved at `now`
//! ```
//!
//! Nothing here is cached. A settings or rate change shows up in the next
//! quote on both sides.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{DbState, TermsState};
use silverline_core::validation::{validate_rate, validate_weight};
use silverline_core::{
    compute_full, compute_simple, CoreError, PriceBreakdown, Product, ProductPricingAttributes,
    QuoteRequest, SimpleBreakdown, WeightInput,
};

/// Loads an active product with its offer resolved against `now`.
pub(crate) async fn load_pricing(
    db: &DbState,
    product_id: &str,
    now: DateTime<Utc>,
) -> Result<(Product, ProductPricingAttributes), ApiError> {
    let product = db
        .inner()
        .products()
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

    let pricing = product.pricing_at(now);
    Ok((product, pricing))
}

/// Effective weight of a request, rejected above the line ceiling.
pub(crate) fn checked_weight(weight: &WeightInput) -> Result<Decimal, ApiError> {
    Ok(validate_weight(weight.weight_kg()).map_err(CoreError::from)?)
}

fn checked_override(rate_override: Option<Decimal>) -> Result<Option<Decimal>, ApiError> {
    match rate_override {
        Some(rate) => Ok(Some(validate_rate(rate).map_err(CoreError::from)?)),
        None => Ok(None),
    }
}

/// Admin price preview: no reseller terms, single GST amount.
pub async fn preview_price(
    db: &DbState,
    terms: &TermsState,
    request: &QuoteRequest,
    now: DateTime<Utc>,
) -> Result<SimpleBreakdown, ApiError> {
    let weight_kg = checked_weight(&request.weight)?;
    debug!(product_id = %request.product_id, weight_kg = %weight_kg, "preview_price command");

    let rate_override = checked_override(request.rate_override)?;
    let (_, pricing) = load_pricing(db, &request.product_id, now).await?;
    let settings = terms.inner().resolve_global_settings().await?;
    let current_rate = db.inner().rates().current_rate().await?;

    Ok(compute_simple(
        &pricing,
        weight_kg,
        &settings,
        current_rate,
        rate_override,
    )?)
}

/// Reseller quote: full chain with the reseller's terms and GST split.
///
/// An unknown reseller is quoted with zero terms.
pub async fn quote_for_reseller(
    db: &DbState,
    terms: &TermsState,
    reseller_id: &str,
    request: &QuoteRequest,
    now: DateTime<Utc>,
) -> Result<PriceBreakdown, ApiError> {
    let weight_kg = checked_weight(&request.weight)?;
    debug!(
        product_id = %request.product_id,
        reseller_id = %reseller_id,
        weight_kg = %weight_kg,
        "quote_for_reseller command"
    );

    let rate_override = checked_override(request.rate_override)?;
    let (_, pricing) = load_pricing(db, &request.product_id, now).await?;
    let reseller_terms = terms.inner().resolve(reseller_id).await?;
    let settings = terms.inner().resolve_global_settings().await?;
    let current_rate = db.inner().rates().current_rate().await?;

    Ok(compute_full(
        &pricing,
        weight_kg,
        &reseller_terms,
        &settings,
        current_rate,
        rate_override,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::seeded_state;
    use crate::error::ErrorCode;
    use rust_decimal_macros::dec;
    use silverline_core::SettingKey;

    fn request(product_id: &str, weight_kg: Decimal) -> QuoteRequest {
        QuoteRequest {
            product_id: product_id.to_string(),
            weight: WeightInput::Total { weight_kg },
            rate_override: None,
        }
    }

    #[tokio::test]
    async fn test_preview_and_zero_terms_quote_agree() {
        let (state, now) = seeded_state().await;
        let req = request("bichiya-80", dec!(0.5));

        let preview = preview_price(&state.db, &state.terms, &req, now).await.unwrap();
        let quote = quote_for_reseller(&state.db, &state.terms, "walk-in", &req, now)
            .await
            .unwrap();

        // No terms: every shared field matches the simple variant
        assert_eq!(quote.simple(), preview);
        assert_eq!(preview.silver_rate, dec!(92.55));
    }

    #[tokio::test]
    async fn test_intra_state_reseller_gets_split_gst() {
        let (state, now) = seeded_state().await;
        let req = request("kada-70", dec!(1));

        let quote = quote_for_reseller(&state.db, &state.terms, "pune-chandi", &req, now)
            .await
            .unwrap();

        assert!(quote.gst.is_same_state);
        assert_eq!(quote.gst.cgst_amount, quote.gst.sgst_amount);
        assert!(quote.gst.igst_amount.is_zero());
        assert_eq!(quote.reseller_discount_amount, quote.subtotal.percent(dec!(5)));
        assert_eq!(quote.global_loop_amount, quote.subtotal.percent(dec!(1)));
    }

    #[tokio::test]
    async fn test_inter_state_reseller_gets_igst() {
        let (state, now) = seeded_state().await;
        let req = request("kada-70", dec!(1));

        let quote = quote_for_reseller(&state.db, &state.terms, "surat-silver", &req, now)
            .await
            .unwrap();

        assert!(!quote.gst.is_same_state);
        assert!(quote.gst.cgst_amount.is_zero());
        assert_eq!(quote.gst.igst_amount, quote.gst.total_gst_amount);
    }

    #[tokio::test]
    async fn test_settings_change_applies_to_next_quote() {
        let (state, now) = seeded_state().await;
        let req = request("coin-999", dec!(0.25));

        let before = preview_price(&state.db, &state.terms, &req, now).await.unwrap();
        state
            .db
            .inner()
            .settings()
            .put(SettingKey::GstRatePercent, "5")
            .await
            .unwrap();
        let after = preview_price(&state.db, &state.terms, &req, now).await.unwrap();

        assert_eq!(before.gst_rate, dec!(3));
        assert_eq!(after.gst_rate, dec!(5));
        assert_eq!(before.taxable_amount, after.taxable_amount);
    }

    #[tokio::test]
    async fn test_rate_override_and_offer_window() {
        let (state, now) = seeded_state().await;
        let mut req = request("payal-925", dec!(0.1));
        req.rate_override = Some(dec!(100));

        let quote = preview_price(&state.db, &state.terms, &req, now).await.unwrap();
        assert_eq!(quote.silver_rate, dec!(100));
        assert!(!quote.offer_discount.is_zero());

        // The seeded launch offer ends 30 days out
        let later = now + chrono::Duration::days(31);
        let expired = preview_price(&state.db, &state.terms, &req, later).await.unwrap();
        assert!(expired.offer_discount.is_zero());
    }

    #[tokio::test]
    async fn test_unknown_product_and_negative_override() {
        let (state, now) = seeded_state().await;

        let err = preview_price(&state.db, &state.terms, &request("nope", dec!(1)), now)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let mut req = request("kada-70", dec!(1));
        req.rate_override = Some(dec!(-1));
        let err = preview_price(&state.db, &state.terms, &req, now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_oversized_inputs_are_rejected_not_priced() {
        let (state, now) = seeded_state().await;

        let heavy = request("kada-70", dec!(100000000000000000000000000));
        let err = preview_price(&state.db, &state.terms, &heavy, now).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = quote_for_reseller(&state.db, &state.terms, "pune-chandi", &heavy, now)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut req = request("kada-70", dec!(1));
        req.rate_override = Some(dec!(79228162514264337593543950));
        let err = quote_for_reseller(&state.db, &state.terms, "pune-chandi", &req, now)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
