//! # Commands Module
//!
//! Every operation the back office exposes. The CLI in `lib.rs` is one
//! caller; an HTTP or desktop shell would call the same functions.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── quote.rs     ◄─── Admin preview, reseller quote
//! ├── order.rs     ◄─── Checkout, status lifecycle
//! ├── invoice.rs   ◄─── Invoice from stored snapshots
//! ├── rates.rs     ◄─── Record rate, rate overview
//! ├── settings.rs  ◄─── Global pricing settings
//! └── product.rs   ◄─── Catalog admin
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs database
//! async fn set_rate(db: &DbState, text: &str, now: DateTime<Utc>)
//!
//! // Needs database and terms resolver
//! async fn quote_for_reseller(db: &DbState, terms: &TermsState, ...)
//!
//! // Needs database and config
//! async fn render_invoice(db: &DbState, config: &ConfigState, order_id: &str)
//! ```
//!
//! Commands that depend on the clock take `now` as a parameter.

pub mod invoice;
pub mod order;
pub mod product;
pub mod quote;
pub mod rates;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};
    use silverline_db::pool::IN_MEMORY_PATH;
    use silverline_db::seed::seed_demo;

    use crate::config::AppConfig;
    use crate::state::AppState;

    /// Fresh in-memory state with no data.
    pub async fn empty_state() -> (AppState, DateTime<Utc>) {
        let config = AppConfig {
            database_path: IN_MEMORY_PATH.to_string(),
            ..AppConfig::default()
        };
        (AppState::open(config).await.unwrap(), Utc::now())
    }

    /// In-memory state with the demo catalog, resellers, settings and rates.
    pub async fn seeded_state() -> (AppState, DateTime<Utc>) {
        let (state, now) = empty_state().await;
        seed_demo(state.db.inner(), now).await.unwrap();
        (state, now)
    }
}
