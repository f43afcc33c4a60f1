//! # Order Repository
//!
//! Writes checkout snapshots and reads them back for invoicing.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLACE (one transaction)                                            │
//! │     └── INSERT orders       → header with gst_rate / is_same_state     │
//! │     └── INSERT order_items  → one frozen snapshot per line             │
//! │                                                                         │
//! │  2. READ (any number of times)                                         │
//! │     └── get() + items()     → invoice, export, dispute review          │
//! │                                                                         │
//! │  3. STATUS                                                             │
//! │     └── update_status()     → touches orders.status only               │
//! │                                                                         │
//! │  4. DELETE                                                             │
//! │     └── delete()            → order_items go with it (ON DELETE CASCADE)│
//! │                                                                         │
//! │  order_items are never updated: a trigger aborts any UPDATE.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{decimal_col, DbError, DbResult};
use silverline_core::{Money, Order, OrderItemSnapshot, OrderStatus, SnapshotMeta};

const ORDER_COLUMNS: &str = r#"
    id, order_number, reseller_id, seller_name, status,
    gst_rate, is_same_state, company_state_code, reseller_state_code,
    subtotal, gst_amount, total, created_at, updated_at
"#;

const ITEM_COLUMNS: &str = r#"
    id, order_id, product_id,
    weight_kg, silver_rate, base_price, deduction_amount, labor_charges,
    discount_amount, global_loop_amount, offer_discount, taxable_amount,
    gst_rate, is_same_state, cgst_amount, sgst_amount, igst_amount,
    gst_amount, item_total, meta, created_at
"#;

/// Repository for orders and their frozen lines.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order and all its lines atomically.
    ///
    /// Either every line is stored with its header, or nothing is.
    pub async fn place(&self, order: &Order, items: &[OrderItemSnapshot]) -> DbResult<()> {
        if items.is_empty() {
            return Err(DbError::Internal(format!(
                "order {} has no lines",
                order.id
            )));
        }

        debug!(
            id = %order.id,
            order_number = %order.order_number,
            lines = items.len(),
            "Placing order"
        );

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, reseller_id, seller_name, status,
                gst_rate, is_same_state, company_state_code, reseller_state_code,
                subtotal, gst_amount, total, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.reseller_id)
        .bind(&order.seller_name)
        .bind(order.status)
        .bind(order.gst_rate.to_string())
        .bind(order.is_same_state)
        .bind(&order.company_state_code)
        .bind(&order.reseller_state_code)
        .bind(order.subtotal.amount().to_string())
        .bind(order.gst_amount.amount().to_string())
        .bind(order.total.amount().to_string())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in items {
            let meta = serde_json::to_string(&item.meta)
                .map_err(|e| DbError::Internal(format!("snapshot meta: {}", e)))?;

            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, order_id, product_id,
                    weight_kg, silver_rate, base_price, deduction_amount, labor_charges,
                    discount_amount, global_loop_amount, offer_discount, taxable_amount,
                    gst_rate, is_same_state, cgst_amount, sgst_amount, igst_amount,
                    gst_amount, item_total, meta, created_at
                ) VALUES (
                    ?1, ?2, ?3,
                    ?4, ?5, ?6, ?7, ?8,
                    ?9, ?10, ?11, ?12,
                    ?13, ?14, ?15, ?16, ?17,
                    ?18, ?19, ?20, ?21
                )
                "#,
            )
            .bind(&item.id)
            .bind(&order.id)
            .bind(&item.product_id)
            .bind(item.weight_kg.to_string())
            .bind(item.silver_rate.to_string())
            .bind(money_text(item.base_price))
            .bind(money_text(item.deduction_amount))
            .bind(money_text(item.labor_charges))
            .bind(money_text(item.discount_amount))
            .bind(money_text(item.global_loop_amount))
            .bind(money_text(item.offer_discount))
            .bind(money_text(item.taxable_amount))
            .bind(item.gst_rate.to_string())
            .bind(item.is_same_state)
            .bind(money_text(item.cgst_amount))
            .bind(money_text(item.sgst_amount))
            .bind(money_text(item.igst_amount))
            .bind(money_text(item.gst_amount))
            .bind(money_text(item.item_total))
            .bind(meta)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %order.id, total = %order.total, "Order placed");
        Ok(())
    }

    /// Gets an order header by ID.
    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    /// Gets the frozen lines of an order, in insertion order.
    pub async fn items(&self, order_id: &str) -> DbResult<Vec<OrderItemSnapshot>> {
        let sql = format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY rowid",
            ITEM_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(item_from_row).collect()
    }

    /// Lists a reseller's orders, newest first.
    pub async fn list_for_reseller(&self, reseller_id: &str, limit: u32) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE reseller_id = ?1 ORDER BY created_at DESC LIMIT ?2",
            ORDER_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(reseller_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    /// Moves an order from `from` to `to`.
    ///
    /// The update only matches while the order is still in `from`, so two
    /// concurrent transitions cannot both succeed.
    pub async fn update_status(&self, id: &str, from: OrderStatus, to: OrderStatus) -> DbResult<()> {
        debug!(id = %id, from = %from, to = %to, "Updating order status");

        let result = sqlx::query(
            "UPDATE orders SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("Order ({})", from), id));
        }

        Ok(())
    }

    /// Deletes an order; its lines are removed by cascade.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }
        Ok(())
    }

    /// Counts stored order lines across all orders.
    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn money_text(m: Money) -> String {
    m.amount().to_string()
}

fn money_col(row: &SqliteRow, column: &str) -> DbResult<Money> {
    decimal_col(row, column).map(Money::new)
}

fn order_from_row(row: &SqliteRow) -> DbResult<Order> {
    Ok(Order {
        id: row.try_get("id")?,
        order_number: row.try_get("order_number")?,
        reseller_id: row.try_get("reseller_id")?,
        seller_name: row.try_get("seller_name")?,
        status: row.try_get::<OrderStatus, _>("status")?,
        gst_rate: decimal_col(row, "gst_rate")?,
        is_same_state: row.try_get("is_same_state")?,
        company_state_code: row.try_get("company_state_code")?,
        reseller_state_code: row.try_get("reseller_state_code")?,
        subtotal: money_col(row, "subtotal")?,
        gst_amount: money_col(row, "gst_amount")?,
        total: money_col(row, "total")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn item_from_row(row: &SqliteRow) -> DbResult<OrderItemSnapshot> {
    let meta_text: String = row.try_get("meta")?;
    let meta: SnapshotMeta =
        serde_json::from_str(&meta_text).map_err(|_| DbError::corrupt("meta", meta_text.clone()))?;

    Ok(OrderItemSnapshot {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        weight_kg: decimal_col(row, "weight_kg")?,
        silver_rate: decimal_col(row, "silver_rate")?,
        base_price: money_col(row, "base_price")?,
        deduction_amount: money_col(row, "deduction_amount")?,
        labor_charges: money_col(row, "labor_charges")?,
        discount_amount: money_col(row, "discount_amount")?,
        global_loop_amount: money_col(row, "global_loop_amount")?,
        offer_discount: money_col(row, "offer_discount")?,
        taxable_amount: money_col(row, "taxable_amount")?,
        gst_rate: decimal_col(row, "gst_rate")?,
        is_same_state: row.try_get("is_same_state")?,
        cgst_amount: money_col(row, "cgst_amount")?,
        sgst_amount: money_col(row, "sgst_amount")?,
        igst_amount: money_col(row, "igst_amount")?,
        gst_amount: money_col(row, "gst_amount")?,
        item_total: money_col(row, "item_total")?,
        meta,
        created_at: row.try_get("created_at")?,
    })
}

/// Generates an order number: `SL-YYYYMMDD-XXXXXXXX`.
pub fn generate_order_number() -> String {
    let suffix = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("SL-{}-{}", Utc::now().format("%Y%m%d"), &suffix[..8])
}

/// Generates a new order or order line ID.
pub fn generate_order_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::reseller::Reseller;
    use crate::{Database, DbConfig};
    use rust_decimal_macros::dec;
    use silverline_core::{
        compute_full, CommercialTerms, GlobalPricingSettings, InvoiceSummary, Offer,
        OrderTaxSnapshot, ProductIdentity, ProductPricingAttributes,
    };

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.resellers()
            .insert(&Reseller {
                id: "r-1".to_string(),
                name: "Pune Chandi Traders".to_string(),
                state_code: Some("MH".to_string()),
                is_active: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        db
    }

    fn frozen_order(rate: rust_decimal::Decimal) -> (Order, Vec<OrderItemSnapshot>) {
        let attrs = ProductPricingAttributes {
            tunch_percentage: dec!(92),
            labor_per_kg: dec!(5000),
            offer: Offer::none(),
        };
        let settings = GlobalPricingSettings {
            extra_charges_percent: dec!(2),
            gst_rate_percent: dec!(3),
            company_state_code: Some("MH".to_string()),
        };
        let terms = CommercialTerms {
            reseller_state_code: Some("MH".to_string()),
            ..CommercialTerms::default()
        };
        let b = compute_full(&attrs, dec!(0.010), &terms, &settings, rate, None).unwrap();
        let identity = ProductIdentity {
            product_id: "p-1".to_string(),
            name: "Payal".to_string(),
            image_url: None,
            hsn_code: Some("7113".to_string()),
        };
        let now = Utc::now();
        let item = OrderItemSnapshot::freeze(
            generate_order_id(),
            "o-1",
            &b,
            &identity,
            attrs.labor_per_kg,
            None,
            now,
        );
        let items = vec![item];
        let order = Order::from_lines(
            "o-1",
            generate_order_number(),
            "r-1",
            "Silverline Wholesale",
            OrderTaxSnapshot {
                gst_rate: b.gst_rate,
                is_same_state: b.gst.is_same_state,
            },
            settings.company_state_code.clone(),
            terms.reseller_state_code.clone(),
            &items,
            now,
        );
        (order, items)
    }

    #[tokio::test]
    async fn test_place_and_read_back_verbatim() {
        let db = setup().await;
        let (order, items) = frozen_order(dec!(80));
        db.orders().place(&order, &items).await.unwrap();

        let stored = db.orders().get("o-1").await.unwrap().unwrap();
        assert_eq!(stored.total.amount(), dec!(826.06));
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.seller_name, "Silverline Wholesale");

        let lines = db.orders().items("o-1").await.unwrap();
        assert_eq!(lines, items);
        assert_eq!(lines[0].meta.hsn_code.as_deref(), Some("7113"));
    }

    #[tokio::test]
    async fn test_order_items_reject_updates() {
        let db = setup().await;
        let (order, items) = frozen_order(dec!(80));
        db.orders().place(&order, &items).await.unwrap();

        let result = sqlx::query("UPDATE order_items SET item_total = '1' WHERE order_id = 'o-1'")
            .execute(db.pool())
            .await;
        let err: DbError = result.unwrap_err().into();
        assert!(matches!(err, DbError::QueryFailed(ref m) if m.contains("immutable")));

        let lines = db.orders().items("o-1").await.unwrap();
        assert_eq!(lines[0].item_total.amount(), dec!(826.06));
    }

    #[tokio::test]
    async fn test_invoice_unchanged_after_settings_and_rate_change() {
        let db = setup().await;
        let (order, items) = frozen_order(dec!(80));
        db.orders().place(&order, &items).await.unwrap();

        let render = |order: Order, lines: Vec<OrderItemSnapshot>| {
            InvoiceSummary::from_lines(lines, &order.tax_snapshot())
        };
        let before = render(
            db.orders().get("o-1").await.unwrap().unwrap(),
            db.orders().items("o-1").await.unwrap(),
        );

        db.settings()
            .put(silverline_core::SettingKey::GstRatePercent, "18")
            .await
            .unwrap();
        db.rate_samples()
            .append(&silverline_core::RateSample {
                rate_per_gram: dec!(150),
                observed_at: Utc::now(),
            })
            .await
            .unwrap();

        let after = render(
            db.orders().get("o-1").await.unwrap().unwrap(),
            db.orders().items("o-1").await.unwrap(),
        );
        assert_eq!(before, after);
        assert_eq!(after.grand_total.amount(), dec!(826.06));
    }

    #[tokio::test]
    async fn test_status_update_leaves_snapshot_alone() {
        let db = setup().await;
        let (order, items) = frozen_order(dec!(80));
        db.orders().place(&order, &items).await.unwrap();

        db.orders()
            .update_status("o-1", OrderStatus::Pending, OrderStatus::Confirmed)
            .await
            .unwrap();
        let stored = db.orders().get("o-1").await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Confirmed);
        assert_eq!(db.orders().items("o-1").await.unwrap(), items);

        // Stale "from" does not match
        let err = db
            .orders()
            .update_status("o-1", OrderStatus::Pending, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades_to_items() {
        let db = setup().await;
        let (order, items) = frozen_order(dec!(80));
        db.orders().place(&order, &items).await.unwrap();
        assert_eq!(db.orders().count_items().await.unwrap(), 1);

        db.orders().delete("o-1").await.unwrap();
        assert!(db.orders().get("o-1").await.unwrap().is_none());
        assert_eq!(db.orders().count_items().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_line_rolls_back_header() {
        let db = setup().await;
        let (order, mut items) = frozen_order(dec!(80));
        // Duplicate line id violates the primary key on the second insert
        items.push(items[0].clone());

        let err = db.orders().place(&order, &items).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "order_items.id"));
        assert!(db.orders().get("o-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_reseller_violates_foreign_key() {
        let db = setup().await;
        let (mut order, items) = frozen_order(dec!(80));
        order.reseller_id = "ghost".to_string();

        let err = db.orders().place(&order, &items).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[test]
    fn test_order_number_format() {
        let n = generate_order_number();
        assert!(n.starts_with("SL-"));
        assert_eq!(n.len(), "SL-20260316-ABCDEF12".len());
    }
}
