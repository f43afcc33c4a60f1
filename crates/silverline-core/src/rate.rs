//! # Silver Rate Module
//!
//! Reductions over the append-only silver rate history.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  samples (newest first)                                                 │
//! │  ──────────────────────                                                 │
//! │  16 Mar 18:05  ₹92.10   ◄── current_rate()                             │
//! │  16 Mar 10:00  ₹91.80                                                  │
//! │  15 Mar 17:30  ₹91.50   ◄── baseline for change_24h(now = 16 Mar 18:05)│
//! │  15 Mar 09:00  ₹90.90                                                  │
//! │  14 Mar 16:00  ₹90.40                                                  │
//! │                                                                         │
//! │  daily_trend(3) ──► [14 Mar ₹90.40, 15 Mar ₹91.50, 16 Mar ₹92.10]      │
//! │                      one point per day, last sample of the day wins    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here reads the clock or caches: callers pass `now`, and each call
//! recomputes from the samples it is given.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

/// One observation of the silver rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateSample {
    /// Price per gram, ≥ 0.
    #[ts(type = "string")]
    pub rate_per_gram: Decimal,
    #[ts(as = "String")]
    pub observed_at: DateTime<Utc>,
}

/// Current rate compared against the rate 24 hours earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateChange {
    #[ts(type = "string")]
    pub rate: Decimal,
    /// `None` means "no baseline", which is different from a 0% change.
    #[ts(type = "string | null")]
    pub change_pct: Option<Decimal>,
}

/// One point of the daily trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendPoint {
    #[ts(as = "String")]
    pub day: NaiveDate,
    #[ts(type = "string")]
    pub rate: Decimal,
}

// =============================================================================
// Rate History
// =============================================================================

/// A snapshot of rate samples, held newest first.
#[derive(Debug, Clone, Default)]
pub struct RateHistory {
    samples: Vec<RateSample>,
}

impl RateHistory {
    /// Builds a history from samples in any order.
    pub fn new(mut samples: Vec<RateSample>) -> Self {
        samples.sort_by(|a, b| b.observed_at.cmp(&a.observed_at));
        RateHistory { samples }
    }

    /// Samples, newest first.
    pub fn samples(&self) -> &[RateSample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recent rate, or zero when there are no samples.
    pub fn current_rate(&self) -> Decimal {
        self.samples
            .first()
            .map(|s| s.rate_per_gram)
            .unwrap_or(Decimal::ZERO)
    }

    /// Percentage change against the newest sample at or before `now - 24h`.
    ///
    /// `change_pct` is `None` when there is no such sample, or when the
    /// baseline rate is zero.
    pub fn change_24h(&self, now: DateTime<Utc>) -> RateChange {
        let rate = self.current_rate();
        let cutoff = now - Duration::hours(24);

        let change_pct = self
            .samples
            .iter()
            .find(|s| s.observed_at <= cutoff)
            .filter(|baseline| !baseline.rate_per_gram.is_zero())
            .map(|baseline| {
                (rate - baseline.rate_per_gram) / baseline.rate_per_gram * Decimal::ONE_HUNDRED
            });

        RateChange { rate, change_pct }
    }

    /// One point per calendar day over the last `days` days, ascending.
    ///
    /// Days are bucketed in `offset` (the business's local time). When a day
    /// has several samples, the latest by timestamp is kept.
    pub fn daily_trend(
        &self,
        days: u32,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Vec<TrendPoint> {
        let since = now - Duration::days(i64::from(days));
        let mut by_day: BTreeMap<NaiveDate, &RateSample> = BTreeMap::new();

        for sample in self
            .samples
            .iter()
            .filter(|s| s.observed_at >= since && s.observed_at <= now)
        {
            let day = sample.observed_at.with_timezone(&offset).date_naive();
            by_day
                .entry(day)
                .and_modify(|kept| {
                    if sample.observed_at > kept.observed_at {
                        *kept = sample;
                    }
                })
                .or_insert(sample);
        }

        by_day
            .into_iter()
            .map(|(day, sample)| TrendPoint {
                day,
                rate: sample.rate_per_gram,
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    fn sample(day: u32, hour: u32, rate: Decimal) -> RateSample {
        RateSample {
            rate_per_gram: rate,
            observed_at: Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap(),
        }
    }

    fn history() -> RateHistory {
        RateHistory::new(vec![
            sample(14, 10, dec!(90.40)),
            sample(16, 12, dec!(92.10)),
            sample(15, 3, dec!(90.90)),
            sample(15, 11, dec!(91.50)),
            sample(16, 4, dec!(91.80)),
        ])
    }

    #[test]
    fn test_current_rate_is_newest() {
        assert_eq!(history().current_rate(), dec!(92.10));
    }

    #[test]
    fn test_current_rate_empty_is_zero() {
        assert_eq!(RateHistory::default().current_rate(), Decimal::ZERO);
    }

    #[test]
    fn test_change_24h_uses_latest_sample_before_cutoff() {
        let now = Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap();
        let change = history().change_24h(now);
        // baseline: 15 Mar 11:00 @ 91.50
        assert_eq!(change.rate, dec!(92.10));
        let expected = (dec!(92.10) - dec!(91.50)) / dec!(91.50) * dec!(100);
        assert_eq!(change.change_pct, Some(expected));
    }

    #[test]
    fn test_change_24h_without_baseline_is_none() {
        let now = Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap();
        let recent = RateHistory::new(vec![sample(16, 4, dec!(91.80)), sample(16, 12, dec!(92.10))]);
        let change = recent.change_24h(now);
        assert_eq!(change.rate, dec!(92.10));
        assert_eq!(change.change_pct, None);
    }

    #[test]
    fn test_change_24h_zero_baseline_is_none() {
        let now = Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap();
        let h = RateHistory::new(vec![sample(14, 10, dec!(0)), sample(16, 12, dec!(92))]);
        assert_eq!(h.change_24h(now).change_pct, None);
    }

    #[test]
    fn test_unchanged_rate_is_zero_not_none() {
        let now = Utc.with_ymd_and_hms(2026, 3, 16, 12, 0, 0).unwrap();
        let h = RateHistory::new(vec![sample(14, 10, dec!(90)), sample(16, 12, dec!(90))]);
        assert_eq!(h.change_24h(now).change_pct, Some(Decimal::ZERO));
    }

    #[test]
    fn test_daily_trend_keeps_last_sample_per_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 16, 13, 0, 0).unwrap();
        let trend = history().daily_trend(7, now, FixedOffset::east_opt(0).unwrap());

        let rates: Vec<Decimal> = trend.iter().map(|p| p.rate).collect();
        assert_eq!(rates, vec![dec!(90.40), dec!(91.50), dec!(92.10)]);
        assert!(trend.windows(2).all(|w| w[0].day < w[1].day));
    }

    #[test]
    fn test_daily_trend_buckets_in_local_time() {
        // 15 Mar 20:00 UTC is 16 Mar 01:30 IST
        let h = RateHistory::new(vec![
            sample(15, 10, dec!(91)),
            sample(15, 20, dec!(93)),
        ]);
        let now = Utc.with_ymd_and_hms(2026, 3, 16, 6, 0, 0).unwrap();
        let trend = h.daily_trend(7, now, ist());
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].day, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        assert_eq!(trend[1].day, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
    }

    #[test]
    fn test_daily_trend_respects_window_and_is_restartable() {
        let now = Utc.with_ymd_and_hms(2026, 3, 16, 13, 0, 0).unwrap();
        let h = history();
        let first = h.daily_trend(1, now, FixedOffset::east_opt(0).unwrap());
        let second = h.daily_trend(1, now, FixedOffset::east_opt(0).unwrap());
        assert_eq!(first, second);
        assert!(first.iter().all(|p| p.day >= NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()));
    }
}
