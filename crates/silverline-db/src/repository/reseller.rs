//! # Reseller Repository
//!
//! Reseller accounts and their negotiated pricing terms.
//!
//! Terms are stored as two tables (`resellers`, `reseller_terms`) and exposed
//! for pricing through the `reseller_pricing_terms` view. Reads for pricing go
//! through [`crate::terms`]; this repository covers account administration.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use sqlx::Row;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// A reseller account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reseller {
    pub id: String,
    pub name: String,
    /// GST registration state, already normalised (2 uppercase chars).
    pub state_code: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository for reseller accounts.
#[derive(Debug, Clone)]
pub struct ResellerRepository {
    pool: SqlitePool,
}

impl ResellerRepository {
    /// Creates a new ResellerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ResellerRepository { pool }
    }

    /// Inserts a reseller account.
    pub async fn insert(&self, reseller: &Reseller) -> DbResult<()> {
        debug!(id = %reseller.id, name = %reseller.name, "Inserting reseller");

        sqlx::query(
            "INSERT INTO resellers (id, name, state_code, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&reseller.id)
        .bind(&reseller.name)
        .bind(&reseller.state_code)
        .bind(reseller.is_active)
        .bind(reseller.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Whether an active reseller with this ID exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM resellers WHERE id = ?1 AND is_active = 1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Gets a reseller by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Reseller>> {
        let row = sqlx::query(
            "SELECT id, name, state_code, is_active, created_at FROM resellers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(Reseller {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                state_code: row.try_get("state_code")?,
                is_active: row.try_get("is_active")?,
                created_at: row.try_get("created_at")?,
            })),
            None => Ok(None),
        }
    }

    /// Creates or replaces the reseller's negotiated percentages.
    pub async fn upsert_terms(
        &self,
        reseller_id: &str,
        discount_percent: Decimal,
        global_loop_percent: Decimal,
    ) -> DbResult<()> {
        debug!(
            reseller_id = %reseller_id,
            discount_percent = %discount_percent,
            global_loop_percent = %global_loop_percent,
            "Upserting reseller terms"
        );

        sqlx::query(
            r#"
            INSERT INTO reseller_terms (reseller_id, discount_percent, global_loop_percent, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (reseller_id) DO UPDATE SET
                discount_percent = excluded.discount_percent,
                global_loop_percent = excluded.global_loop_percent,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(reseller_id)
        .bind(discount_percent.to_string())
        .bind(global_loop_percent.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates the reseller's GST registration state.
    pub async fn set_state_code(&self, reseller_id: &str, state_code: Option<&str>) -> DbResult<()> {
        let result = sqlx::query("UPDATE resellers SET state_code = ?2 WHERE id = ?1")
            .bind(reseller_id)
            .bind(state_code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Reseller", reseller_id));
        }
        Ok(())
    }

    /// Counts active resellers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resellers WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
