//! # Settings Repository
//!
//! Key/value storage for platform-wide pricing settings.
//!
//! Each key is an independent row. A missing row is a normal state: the terms
//! resolver substitutes the documented default for that key alone.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::debug;

use crate::error::DbResult;
use silverline_core::SettingKey;

/// Repository for settings rows.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Loads every stored row as raw text, in one query.
    pub async fn load_all(&self) -> DbResult<HashMap<String, String>> {
        let rows = sqlx::query("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await?;

        let mut values = HashMap::with_capacity(rows.len());
        for row in rows {
            values.insert(row.try_get("key")?, row.try_get("value")?);
        }
        Ok(values)
    }

    /// Reads one key.
    pub async fn get(&self, key: SettingKey) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    /// Writes one key. Callers validate the value first.
    pub async fn put(&self, key: SettingKey, value: &str) -> DbResult<()> {
        debug!(key = %key, value = %value, "Writing setting");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key.as_str())
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes one key so it falls back to its default.
    pub async fn clear(&self, key: SettingKey) -> DbResult<()> {
        debug!(key = %key, "Clearing setting");

        sqlx::query("DELETE FROM settings WHERE key = ?1")
            .bind(key.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
