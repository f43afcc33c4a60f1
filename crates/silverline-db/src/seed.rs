//! # Demo Data
//!
//! Populates an empty database with a small silver catalog, two resellers in
//! different states, pricing settings, and a week of rate samples.
//!
//! Used by the `seed` binary and the back-office `seed` command.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::reseller::Reseller;
use silverline_core::{
    Offer, OfferKind, Product, ProductPricingAttributes, RateSample, SettingKey,
};

/// Catalog rows: (id, name, hsn, tunch %, labor per kg).
const CATALOG: &[(&str, &str, &str, i64, i64)] = &[
    ("payal-925", "Payal 92.5", "7113", 925, 5000),
    ("bichiya-80", "Bichiya 80", "7113", 800, 3500),
    ("kada-70", "Kada 70", "7113", 700, 2800),
    ("chain-925", "Chain 92.5", "7113", 925, 6500),
    ("coin-999", "Coin 99.9", "7114", 999, 800),
];

/// Resellers: (id, name, state, discount %, global loop %).
const RESELLERS: &[(&str, &str, &str, i64, i64)] = &[
    ("pune-chandi", "Pune Chandi Traders", "MH", 50, 10),
    ("surat-silver", "Surat Silver Mart", "GJ", 30, 0),
];

/// What a seed run did.
#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub skipped: bool,
    pub products: usize,
    pub resellers: usize,
    pub rate_samples: usize,
}

/// Seeds demo data unless products already exist.
///
/// Percentages in the tables above are stored in tenths (925 = 92.5%).
pub async fn seed_demo(db: &Database, now: DateTime<Utc>) -> DbResult<SeedSummary> {
    if db.products().count().await? > 0 {
        info!("Database already has products, skipping seed");
        return Ok(SeedSummary {
            skipped: true,
            products: 0,
            resellers: 0,
            rate_samples: 0,
        });
    }

    for (i, (id, name, hsn, tunch, labor)) in CATALOG.iter().enumerate() {
        let offer = if i == 0 {
            Offer {
                enabled: true,
                kind: OfferKind::Percentage,
                value: Decimal::from(2),
                text: Some("Launch 2% off".to_string()),
                valid_from: Some(now - Duration::days(1)),
                valid_till: Some(now + Duration::days(30)),
            }
        } else {
            Offer::none()
        };

        db.products()
            .insert(&Product {
                id: id.to_string(),
                name: name.to_string(),
                image_url: None,
                hsn_code: Some(hsn.to_string()),
                pricing: ProductPricingAttributes {
                    tunch_percentage: Decimal::new(*tunch, 1),
                    labor_per_kg: Decimal::from(*labor),
                    offer,
                },
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }

    for (id, name, state, discount, loop_pct) in RESELLERS {
        db.resellers()
            .insert(&Reseller {
                id: id.to_string(),
                name: name.to_string(),
                state_code: Some(state.to_string()),
                is_active: true,
                created_at: now,
            })
            .await?;
        db.resellers()
            .upsert_terms(id, Decimal::new(*discount, 1), Decimal::new(*loop_pct, 1))
            .await?;
    }

    db.settings().put(SettingKey::ExtraChargesPercent, "2").await?;
    db.settings().put(SettingKey::GstRatePercent, "3").await?;
    db.settings().put(SettingKey::CompanyStateCode, "MH").await?;

    // Two samples a day for a week, drifting up by 35 paise per sample
    let mut rate_samples = 0;
    for step in 0..14i64 {
        let observed_at = now - Duration::hours(12 * (13 - step));
        db.rate_samples()
            .append(&RateSample {
                rate_per_gram: Decimal::new(8800 + 35 * step, 2),
                observed_at,
            })
            .await?;
        rate_samples += 1;
    }

    info!(
        products = CATALOG.len(),
        resellers = RESELLERS.len(),
        rate_samples,
        "Seed complete"
    );

    Ok(SeedSummary {
        skipped: false,
        products: CATALOG.len(),
        resellers: RESELLERS.len(),
        rate_samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;

    #[tokio::test]
    async fn test_seed_then_skip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let first = seed_demo(&db, now).await.unwrap();
        assert!(!first.skipped);
        assert_eq!(db.products().count().await.unwrap(), 5);
        assert_eq!(db.rate_samples().count().await.unwrap(), 14);
        assert_eq!(db.rates().current_rate().await.unwrap(), Decimal::new(9255, 2));

        let second = seed_demo(&db, now).await.unwrap();
        assert!(second.skipped);
        assert_eq!(db.products().count().await.unwrap(), 5);
    }
}
