//! # Rate Commands
//!
//! Recording silver rates and the dashboard overview.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};
use silverline_core::validation::{parse_decimal, validate_rate};
use silverline_core::{CoreError, RateChange, RateSample, TrendPoint};

/// Current rate, its 24h movement and the daily trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateOverview {
    pub current_rate: Decimal,
    pub change_24h: RateChange,
    pub trend: Vec<TrendPoint>,
}

/// Parses, validates and appends a new rate sample observed at `now`.
pub async fn set_rate(db: &DbState, text: &str, now: DateTime<Utc>) -> Result<RateSample, ApiError> {
    debug!(rate = %text, "set_rate command");

    let rate_per_gram = parse_decimal("rate_per_gram", text)
        .and_then(validate_rate)
        .map_err(CoreError::from)?;

    let sample = RateSample {
        rate_per_gram,
        observed_at: now,
    };
    db.inner().rate_samples().append(&sample).await?;

    info!(rate_per_gram = %rate_per_gram, "Silver rate recorded");
    Ok(sample)
}

/// Builds the rate overview as of `now`.
pub async fn rate_overview(
    db: &DbState,
    config: &ConfigState,
    now: DateTime<Utc>,
) -> Result<RateOverview, ApiError> {
    let rates = db.inner().rates();

    Ok(RateOverview {
        current_rate: rates.current_rate().await?,
        change_24h: rates.change_24h(now).await?,
        trend: rates
            .trend(config.trend_days(), now, config.utc_offset())
            .await?,
    })
}
