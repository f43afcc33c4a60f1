//! # Product Repository
//!
//! Database operations for catalog products and their pricing attributes.
//!
//! The calculator never sees a row: callers load a [`Product`] here and hand
//! `product.pricing_at(now)` to the engine, which resolves the offer window.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{decimal_col, DbError, DbResult};
use silverline_core::{Offer, OfferKind, Product, ProductPricingAttributes};

const PRODUCT_COLUMNS: &str = r#"
    id, name, image_url, hsn_code,
    tunch_percentage, labor_per_kg,
    offer_enabled, offer_kind, offer_value, offer_text,
    offer_valid_from, offer_valid_till,
    is_active, created_at, updated_at
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets an active product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        debug!(id = %id, "Loading product");

        let sql = format!(
            "SELECT {} FROM products WHERE id = ?1 AND is_active = 1",
            PRODUCT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Lists active products by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1",
            PRODUCT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        let pricing = &product.pricing;
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, image_url, hsn_code,
                tunch_percentage, labor_per_kg,
                offer_enabled, offer_kind, offer_value, offer_text,
                offer_valid_from, offer_valid_till,
                is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6,
                ?7, ?8, ?9, ?10,
                ?11, ?12,
                ?13, ?14, ?15
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.image_url)
        .bind(&product.hsn_code)
        .bind(pricing.tunch_percentage.to_string())
        .bind(pricing.labor_per_kg.to_string())
        .bind(pricing.offer.enabled)
        .bind(pricing.offer.kind)
        .bind(pricing.offer.value.to_string())
        .bind(&pricing.offer.text)
        .bind(pricing.offer.valid_from)
        .bind(pricing.offer.valid_till)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Replaces a product's pricing attributes.
    ///
    /// Placed orders are unaffected: their lines carry their own snapshot.
    pub async fn update_pricing(&self, id: &str, pricing: &ProductPricingAttributes) -> DbResult<()> {
        debug!(id = %id, "Updating product pricing");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                tunch_percentage = ?2,
                labor_per_kg = ?3,
                offer_enabled = ?4,
                offer_kind = ?5,
                offer_value = ?6,
                offer_text = ?7,
                offer_valid_from = ?8,
                offer_valid_till = ?9,
                updated_at = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(pricing.tunch_percentage.to_string())
        .bind(pricing.labor_per_kg.to_string())
        .bind(pricing.offer.enabled)
        .bind(pricing.offer.kind)
        .bind(pricing.offer.value.to_string())
        .bind(&pricing.offer.text)
        .bind(pricing.offer.valid_from)
        .bind(pricing.offer.valid_till)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product. Historical order lines keep their snapshot.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn product_from_row(row: &SqliteRow) -> DbResult<Product> {
    let offer = Offer {
        enabled: row.try_get("offer_enabled")?,
        kind: row.try_get::<OfferKind, _>("offer_kind")?,
        value: decimal_col(row, "offer_value")?,
        text: row.try_get("offer_text")?,
        valid_from: row.try_get::<Option<DateTime<Utc>>, _>("offer_valid_from")?,
        valid_till: row.try_get::<Option<DateTime<Utc>>, _>("offer_valid_till")?,
    };

    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        image_url: row.try_get("image_url")?,
        hsn_code: row.try_get("hsn_code")?,
        pricing: ProductPricingAttributes {
            tunch_percentage: decimal_col(row, "tunch_percentage")?,
            labor_per_kg: decimal_col(row, "labor_per_kg")?,
            offer,
        },
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
