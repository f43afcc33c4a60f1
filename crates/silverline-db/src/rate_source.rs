//! # Rate Source
//!
//! Current silver rate, 24-hour change and daily trend, read fresh from the
//! sample table on every call.
//!
//! ```text
//! current_rate()          ──► latest sample, or 0 when the table is empty
//! change_24h(now)         ──► latest + newest sample at or before now − 24h
//! trend(days, now, tz)    ──► samples in [now − days, now], one per local day
//! ```
//!
//! The reductions themselves live in [`silverline_core::RateHistory`]; this
//! type only decides which rows to load.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::DbResult;
use crate::repository::rate::RateRepository;
use silverline_core::{RateChange, RateHistory, RateSample, TrendPoint};

/// Read side of the rate history.
#[derive(Debug, Clone)]
pub struct RateSource {
    samples: RateRepository,
}

impl RateSource {
    pub fn new(samples: RateRepository) -> Self {
        RateSource { samples }
    }

    /// The most recent rate per gram. Zero when no sample exists.
    pub async fn current_rate(&self) -> DbResult<Decimal> {
        let latest = self.samples.latest().await?;
        if latest.is_none() {
            warn!("No rate samples recorded, pricing at rate 0");
        }
        Ok(RateHistory::new(latest.into_iter().collect()).current_rate())
    }

    /// Current rate compared with the rate 24 hours before `now`.
    pub async fn change_24h(&self, now: DateTime<Utc>) -> DbResult<RateChange> {
        let mut samples: Vec<RateSample> = Vec::with_capacity(2);
        if let Some(latest) = self.samples.latest().await? {
            samples.push(latest);
        }
        if let Some(baseline) = self
            .samples
            .latest_at_or_before(now - Duration::hours(24))
            .await?
        {
            samples.push(baseline);
        }

        let change = RateHistory::new(samples).change_24h(now);
        debug!(rate = %change.rate, change_pct = ?change.change_pct, "Computed 24h rate change");
        Ok(change)
    }

    /// One point per local calendar day over the last `days` days, ascending.
    pub async fn trend(
        &self,
        days: u32,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> DbResult<Vec<TrendPoint>> {
        let since = now - Duration::days(i64::from(days));
        let samples = self.samples.between(since, now).await?;
        Ok(RateHistory::new(samples).daily_trend(days, now, offset))
    }
}
