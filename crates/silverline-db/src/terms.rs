//! # Commercial Terms Resolver
//!
//! Resolves per-reseller terms and global pricing settings for one calculation.
//!
//! ## Terms Lookup Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TieredTermsSource                                                      │
//! │                                                                         │
//! │   lookup(reseller_id)                                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ViewTermsSource ── reads reseller_pricing_terms view                  │
//! │        │                                                                │
//! │        ├── Ok(terms)  ──► done                                          │
//! │        └── Err(e)     ──► warn!, then TableTermsSource                  │
//! │                              reads resellers + reseller_terms directly  │
//! │                                                                         │
//! │  "direct" strategy skips the view and uses TableTermsSource alone.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The strategy is picked once when the resolver is built. Callers never
//! see which source answered.
//!
//! ## Defaults
//! - Unknown reseller: zero percentages, no state code
//! - Missing settings key: 0 for percentages, `None` for the company state
//! - Unparsable settings value: same default as missing, with a warning

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{decimal_col, DbError, DbResult};
use crate::pool::Database;
use crate::repository::settings::SettingsRepository;
use silverline_core::{CommercialTerms, GlobalPricingSettings, SettingKey};

// =============================================================================
// Terms Source Trait
// =============================================================================

/// One way of looking up a reseller's terms.
#[async_trait]
pub trait TermsSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Terms for an active reseller, or `None` when no such reseller exists.
    async fn lookup(&self, reseller_id: &str) -> DbResult<Option<CommercialTerms>>;
}

fn terms_from_row(row: &SqliteRow) -> DbResult<CommercialTerms> {
    let state_code: Option<String> = row.try_get("state_code")?;
    Ok(CommercialTerms {
        reseller_discount_percent: decimal_col(row, "discount_percent")?,
        global_loop_percent: decimal_col(row, "global_loop_percent")?,
        reseller_state_code: state_code.filter(|s| !s.is_empty()),
    })
}

/// Primary source: the `reseller_pricing_terms` view.
#[derive(Debug, Clone)]
pub struct ViewTermsSource {
    pool: SqlitePool,
}

impl ViewTermsSource {
    pub fn new(pool: SqlitePool) -> Self {
        ViewTermsSource { pool }
    }
}

#[async_trait]
impl TermsSource for ViewTermsSource {
    fn name(&self) -> &'static str {
        "view"
    }

    async fn lookup(&self, reseller_id: &str) -> DbResult<Option<CommercialTerms>> {
        let row = sqlx::query(
            "SELECT discount_percent, global_loop_percent, state_code
             FROM reseller_pricing_terms WHERE reseller_id = ?1",
        )
        .bind(reseller_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(terms_from_row).transpose()
    }
}

/// Fallback source: direct reads of the underlying tables.
#[derive(Debug, Clone)]
pub struct TableTermsSource {
    pool: SqlitePool,
}

impl TableTermsSource {
    pub fn new(pool: SqlitePool) -> Self {
        TableTermsSource { pool }
    }
}

#[async_trait]
impl TermsSource for TableTermsSource {
    fn name(&self) -> &'static str {
        "table"
    }

    async fn lookup(&self, reseller_id: &str) -> DbResult<Option<CommercialTerms>> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(t.discount_percent, '0')    AS discount_percent,
                COALESCE(t.global_loop_percent, '0') AS global_loop_percent,
                r.state_code                         AS state_code
            FROM resellers r
            LEFT JOIN reseller_terms t ON t.reseller_id = r.id
            WHERE r.id = ?1 AND r.is_active = 1
            "#,
        )
        .bind(reseller_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(terms_from_row).transpose()
    }
}

/// Tries `primary`, and on error answers from `fallback`.
///
/// A primary `Ok(None)` is an answer, not a failure.
#[derive(Debug, Clone)]
pub struct TieredTermsSource<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> TieredTermsSource<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        TieredTermsSource { primary, fallback }
    }
}

#[async_trait]
impl<P, F> TermsSource for TieredTermsSource<P, F>
where
    P: TermsSource,
    F: TermsSource,
{
    fn name(&self) -> &'static str {
        "tiered"
    }

    async fn lookup(&self, reseller_id: &str) -> DbResult<Option<CommercialTerms>> {
        match self.primary.lookup(reseller_id).await {
            Ok(terms) => Ok(terms),
            Err(e) => {
                warn!(
                    reseller_id = %reseller_id,
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "Primary terms lookup failed, using fallback"
                );
                self.fallback.lookup(reseller_id).await
            }
        }
    }
}

// =============================================================================
// Strategy Selection
// =============================================================================

/// Which terms source to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TermsStrategy {
    /// View first, tables on error.
    #[default]
    Tiered,
    /// Tables only.
    Direct,
}

impl fmt::Display for TermsStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermsStrategy::Tiered => f.write_str("tiered"),
            TermsStrategy::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for TermsStrategy {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tiered" => Ok(TermsStrategy::Tiered),
            "direct" => Ok(TermsStrategy::Direct),
            other => Err(DbError::Internal(format!(
                "unknown terms source '{}', expected 'tiered' or 'direct'",
                other
            ))),
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Reads terms and settings for one calculation. Holds no cached values.
#[derive(Clone)]
pub struct CommercialTermsResolver {
    source: Arc<dyn TermsSource>,
    settings: SettingsRepository,
}

impl fmt::Debug for CommercialTermsResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommercialTermsResolver")
            .field("source", &self.source.name())
            .finish()
    }
}

impl CommercialTermsResolver {
    /// Builds a resolver over an explicit source.
    pub fn new(source: Arc<dyn TermsSource>, settings: SettingsRepository) -> Self {
        CommercialTermsResolver { source, settings }
    }

    /// Builds a resolver for the configured strategy.
    pub fn for_strategy(db: &Database, strategy: TermsStrategy) -> Self {
        let pool = db.pool().clone();
        let source: Arc<dyn TermsSource> = match strategy {
            TermsStrategy::Tiered => Arc::new(TieredTermsSource::new(
                ViewTermsSource::new(pool.clone()),
                TableTermsSource::new(pool),
            )),
            TermsStrategy::Direct => Arc::new(TableTermsSource::new(pool)),
        };
        debug!(strategy = %strategy, "Terms resolver ready");
        CommercialTermsResolver::new(source, db.settings())
    }

    /// Terms for a reseller; zero terms when the reseller is unknown.
    pub async fn resolve(&self, reseller_id: &str) -> DbResult<CommercialTerms> {
        match self.source.lookup(reseller_id).await? {
            Some(terms) => Ok(terms),
            None => {
                debug!(reseller_id = %reseller_id, "No terms for reseller, using zero terms");
                Ok(CommercialTerms::default())
            }
        }
    }

    /// Terms for a reseller that must exist (checkout).
    pub async fn resolve_existing(&self, reseller_id: &str) -> DbResult<Option<CommercialTerms>> {
        self.source.lookup(reseller_id).await
    }

    /// Current global settings, each key defaulted independently.
    pub async fn resolve_global_settings(&self) -> DbResult<GlobalPricingSettings> {
        let raw = self.settings.load_all().await?;
        Ok(settings_from_values(&raw))
    }
}

fn percent_setting(raw: &HashMap<String, String>, key: SettingKey) -> Decimal {
    match raw.get(key.as_str()) {
        None => {
            debug!(key = %key, "Setting not configured, defaulting to 0");
            Decimal::ZERO
        }
        Some(text) => Decimal::from_str(text.trim()).unwrap_or_else(|_| {
            warn!(key = %key, value = %text, "Unparsable setting, defaulting to 0");
            Decimal::ZERO
        }),
    }
}

/// Builds settings from raw rows. Never fails.
pub fn settings_from_values(raw: &HashMap<String, String>) -> GlobalPricingSettings {
    let company_state_code = raw
        .get(SettingKey::CompanyStateCode.as_str())
        .filter(|s| !s.is_empty())
        .cloned();
    if company_state_code.is_none() {
        debug!("Company state code not configured, GST will be inter-state");
    }

    GlobalPricingSettings {
        extra_charges_percent: percent_setting(raw, SettingKey::ExtraChargesPercent),
        gst_rate_percent: percent_setting(raw, SettingKey::GstRatePercent),
        company_state_code,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::reseller::Reseller;
    use crate::DbConfig;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    struct BrokenSource;

    #[async_trait]
    impl TermsSource for BrokenSource {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn lookup(&self, _reseller_id: &str) -> DbResult<Option<CommercialTerms>> {
            Err(DbError::QueryFailed("no such function".to_string()))
        }
    }

    async fn db_with_reseller() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.resellers()
            .insert(&Reseller {
                id: "r-1".to_string(),
                name: "Jaipur Silver House".to_string(),
                state_code: Some("RJ".to_string()),
                is_active: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        db.resellers()
            .upsert_terms("r-1", dec!(5), dec!(1.5))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_view_and_table_sources_agree() {
        let db = db_with_reseller().await;
        let view = ViewTermsSource::new(db.pool().clone());
        let table = TableTermsSource::new(db.pool().clone());

        let a = view.lookup("r-1").await.unwrap().unwrap();
        let b = table.lookup("r-1").await.unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.reseller_discount_percent, dec!(5));
        assert_eq!(a.global_loop_percent, dec!(1.5));
        assert_eq!(a.reseller_state_code.as_deref(), Some("RJ"));
    }

    #[tokio::test]
    async fn test_reseller_without_terms_row_gets_zero_percentages() {
        let db = db_with_reseller().await;
        db.resellers()
            .insert(&Reseller {
                id: "r-2".to_string(),
                name: "New Reseller".to_string(),
                state_code: None,
                is_active: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let resolver = CommercialTermsResolver::for_strategy(&db, TermsStrategy::Tiered);
        let terms = resolver.resolve("r-2").await.unwrap();
        assert_eq!(terms, CommercialTerms::default());
    }

    #[tokio::test]
    async fn test_unknown_reseller_resolves_to_defaults() {
        let db = db_with_reseller().await;
        let resolver = CommercialTermsResolver::for_strategy(&db, TermsStrategy::Direct);

        assert_eq!(resolver.resolve("ghost").await.unwrap(), CommercialTerms::default());
        assert!(resolver.resolve_existing("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tiered_falls_back_on_primary_error() {
        let db = db_with_reseller().await;
        let tiered = TieredTermsSource::new(BrokenSource, TableTermsSource::new(db.pool().clone()));

        let terms = tiered.lookup("r-1").await.unwrap().unwrap();
        assert_eq!(terms.reseller_discount_percent, dec!(5));
    }

    #[tokio::test]
    async fn test_tiered_survives_missing_view() {
        let db = db_with_reseller().await;
        sqlx::query("DROP VIEW reseller_pricing_terms")
            .execute(db.pool())
            .await
            .unwrap();

        let resolver = CommercialTermsResolver::for_strategy(&db, TermsStrategy::Tiered);
        let terms = resolver.resolve("r-1").await.unwrap();
        assert_eq!(terms.global_loop_percent, dec!(1.5));
    }

    #[tokio::test]
    async fn test_partial_settings_default_independently() {
        let db = db_with_reseller().await;
        db.settings().put(SettingKey::GstRatePercent, "3").await.unwrap();

        let resolver = CommercialTermsResolver::for_strategy(&db, TermsStrategy::Tiered);
        let settings = resolver.resolve_global_settings().await.unwrap();
        assert_eq!(settings.gst_rate_percent, dec!(3));
        assert!(settings.extra_charges_percent.is_zero());
        assert!(settings.company_state_code.is_none());
    }

    #[tokio::test]
    async fn test_settings_are_read_fresh_each_call() {
        let db = db_with_reseller().await;
        let resolver = CommercialTermsResolver::for_strategy(&db, TermsStrategy::Tiered);

        db.settings().put(SettingKey::GstRatePercent, "3").await.unwrap();
        assert_eq!(resolver.resolve_global_settings().await.unwrap().gst_rate_percent, dec!(3));

        db.settings().put(SettingKey::GstRatePercent, "5").await.unwrap();
        assert_eq!(resolver.resolve_global_settings().await.unwrap().gst_rate_percent, dec!(5));
    }

    #[test]
    fn test_unparsable_setting_defaults_to_zero() {
        let mut raw = HashMap::new();
        raw.insert("extra_charges_percent".to_string(), "two".to_string());
        raw.insert("gst_rate_percent".to_string(), " 3 ".to_string());
        raw.insert("company_state_code".to_string(), String::new());

        let settings = settings_from_values(&raw);
        assert!(settings.extra_charges_percent.is_zero());
        assert_eq!(settings.gst_rate_percent, dec!(3));
        assert!(settings.company_state_code.is_none());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("Tiered".parse::<TermsStrategy>().unwrap(), TermsStrategy::Tiered);
        assert_eq!("direct".parse::<TermsStrategy>().unwrap(), TermsStrategy::Direct);
        assert!("rpc".parse::<TermsStrategy>().is_err());
    }
}
