//! # Rate Sample Repository
//!
//! Append-only storage for silver rate observations.
//!
//! Rows are never updated or deleted. Every read is newest-first.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::{decimal_col, DbResult};
use silverline_core::RateSample;

/// Repository for rate samples.
#[derive(Debug, Clone)]
pub struct RateRepository {
    pool: SqlitePool,
}

impl RateRepository {
    /// Creates a new RateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RateRepository { pool }
    }

    /// Appends a sample. Callers validate the rate first.
    pub async fn append(&self, sample: &RateSample) -> DbResult<()> {
        debug!(
            rate_per_gram = %sample.rate_per_gram,
            observed_at = %sample.observed_at,
            "Appending rate sample"
        );

        sqlx::query("INSERT INTO rate_samples (rate_per_gram, observed_at) VALUES (?1, ?2)")
            .bind(sample.rate_per_gram.to_string())
            .bind(sample.observed_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// The most recent sample, if any.
    pub async fn latest(&self) -> DbResult<Option<RateSample>> {
        let row = sqlx::query(
            "SELECT rate_per_gram, observed_at FROM rate_samples
             ORDER BY observed_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(sample_from_row).transpose()
    }

    /// The most recent sample observed at or before `cutoff`.
    pub async fn latest_at_or_before(&self, cutoff: DateTime<Utc>) -> DbResult<Option<RateSample>> {
        let row = sqlx::query(
            "SELECT rate_per_gram, observed_at FROM rate_samples
             WHERE observed_at <= ?1
             ORDER BY observed_at DESC, id DESC LIMIT 1",
        )
        .bind(cutoff)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(sample_from_row).transpose()
    }

    /// All samples in `[since, until]`, newest first.
    pub async fn between(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> DbResult<Vec<RateSample>> {
        let rows = sqlx::query(
            "SELECT rate_per_gram, observed_at FROM rate_samples
             WHERE observed_at >= ?1 AND observed_at <= ?2
             ORDER BY observed_at DESC, id DESC",
        )
        .bind(since)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Loaded rate samples");
        rows.iter().map(sample_from_row).collect()
    }

    /// Counts stored samples.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rate_samples")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn sample_from_row(row: &SqliteRow) -> DbResult<RateSample> {
    Ok(RateSample {
        rate_per_gram: decimal_col(row, "rate_per_gram")?,
        observed_at: row.try_get("observed_at")?,
    })
}
