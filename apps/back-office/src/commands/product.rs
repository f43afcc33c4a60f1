//! # Product Commands
//!
//! Catalog listing and admin product creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::DbState;
use silverline_core::validation::{
    validate_amount, validate_percent, validate_product_name, validate_tunch, ValidationResult,
};
use silverline_core::{CoreError, Offer, OfferKind, Product, ProductPricingAttributes};
use silverline_db::repository::product::generate_product_id;

/// Admin input for a new catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    /// Generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub hsn_code: Option<String>,
    pub tunch_percentage: Decimal,
    pub labor_per_kg: Decimal,
}

/// Active products, by name.
pub async fn list_products(db: &DbState, limit: Option<u32>) -> Result<Vec<Product>, ApiError> {
    let limit = limit.unwrap_or(50).min(500);
    debug!(limit, "list_products command");
    Ok(db.inner().products().list_active(limit).await?)
}

/// Validates and inserts a product with no offer.
pub async fn add_product(
    db: &DbState,
    input: NewProduct,
    now: DateTime<Utc>,
) -> Result<Product, ApiError> {
    debug!(name = %input.name, "add_product command");

    validate_product_name(&input.name).map_err(CoreError::from)?;
    let tunch_percentage = validate_tunch(input.tunch_percentage).map_err(CoreError::from)?;
    let labor_per_kg =
        validate_amount("labor_per_kg", input.labor_per_kg).map_err(CoreError::from)?;

    let product = Product {
        id: input.id.unwrap_or_else(generate_product_id),
        name: input.name.trim().to_string(),
        image_url: None,
        hsn_code: input.hsn_code,
        pricing: ProductPricingAttributes {
            tunch_percentage,
            labor_per_kg,
            offer: Offer::none(),
        },
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    db.inner().products().insert(&product).await?;
    info!(id = %product.id, name = %product.name, "Product added");
    Ok(product)
}

/// Offer values are percentages or rupees depending on the kind.
fn validate_pricing(pricing: &ProductPricingAttributes) -> ValidationResult<()> {
    validate_tunch(pricing.tunch_percentage)?;
    validate_amount("labor_per_kg", pricing.labor_per_kg)?;
    match pricing.offer.kind {
        OfferKind::Percentage => validate_percent("offer_value", pricing.offer.value)?,
        OfferKind::Flat => validate_amount("offer_value", pricing.offer.value)?,
    };
    Ok(())
}

/// Replaces a product's pricing attributes (including its offer).
pub async fn update_product_pricing(
    db: &DbState,
    product_id: &str,
    pricing: ProductPricingAttributes,
) -> Result<(), ApiError> {
    validate_pricing(&pricing).map_err(CoreError::from)?;

    db.inner().products().update_pricing(product_id, &pricing).await?;
    info!(id = %product_id, "Product pricing updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::seeded_state;
    use crate::error::ErrorCode;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_add_and_list() {
        let (state, now) = seeded_state().await;

        let added = add_product(
            &state.db,
            NewProduct {
                id: Some("toe-ring-80".to_string()),
                name: "  Toe Ring 80 ".to_string(),
                hsn_code: Some("7113".to_string()),
                tunch_percentage: dec!(80),
                labor_per_kg: dec!(4000),
            },
            now,
        )
        .await
        .unwrap();
        assert_eq!(added.name, "Toe Ring 80");

        let products = list_products(&state.db, None).await.unwrap();
        assert_eq!(products.len(), 6);
        assert!(products.iter().any(|p| p.id == "toe-ring-80"));
    }

    #[tokio::test]
    async fn test_add_rejects_bad_attributes() {
        let (state, now) = seeded_state().await;
        let base = NewProduct {
            id: None,
            name: "Anklet".to_string(),
            hsn_code: None,
            tunch_percentage: dec!(80),
            labor_per_kg: dec!(100),
        };

        for input in [
            NewProduct { name: " ".to_string(), ..base.clone() },
            NewProduct { tunch_percentage: dec!(101), ..base.clone() },
            NewProduct { labor_per_kg: dec!(-1), ..base.clone() },
        ] {
            let err = add_product(&state.db, input, now).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError);
        }
    }

    #[tokio::test]
    async fn test_update_pricing() {
        let (state, now) = seeded_state().await;
        let mut pricing = state
            .db
            .inner()
            .products()
            .get_by_id("kada-70")
            .await
            .unwrap()
            .unwrap()
            .pricing_at(now);
        pricing.labor_per_kg = dec!(3000);

        update_product_pricing(&state.db, "kada-70", pricing).await.unwrap();

        let reloaded = state
            .db
            .inner()
            .products()
            .get_by_id("kada-70")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.pricing.labor_per_kg, dec!(3000));

        let err = update_product_pricing(&state.db, "missing", reloaded.pricing.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        // A flat offer is rupees, a percentage offer is capped at 100
        let mut flat = reloaded.pricing.clone();
        flat.offer.kind = OfferKind::Flat;
        flat.offer.value = dec!(500);
        update_product_pricing(&state.db, "kada-70", flat.clone()).await.unwrap();

        let mut pct = flat;
        pct.offer.kind = OfferKind::Percentage;
        let err = update_product_pricing(&state.db, "kada-70", pct).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut costly = reloaded.pricing;
        costly.labor_per_kg = dec!(79228162514264337593543950);
        let err = update_product_pricing(&state.db, "kada-70", costly).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
