//! # silverline-db: Database Layer for Silverline
//!
//! SQLite persistence for the pricing engine: rate history, catalog, reseller
//! terms, settings, and the order snapshots that invoices are rendered from.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Silverline Data Flow                               │
//! │                                                                         │
//! │  back-office command (quote / place order / invoice)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  silverline-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐  ┌──────────────────┐  ┌────────────────────┐  │   │
//! │  │  │  Database  │  │  RateSource      │  │  Repositories      │  │   │
//! │  │  │  (pool.rs) │  │  Commercial-     │  │  products, rates,  │  │   │
//! │  │  │            │◄─│  TermsResolver   │  │  resellers,        │  │   │
//! │  │  │ SqlitePool │  │  (terms.rs)      │  │  settings, orders  │  │   │
//! │  │  └────────────┘  └──────────────────┘  └────────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL) with embedded migrations                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`rate_source`] - Current rate, 24h change, daily trend
//! - [`terms`] - Commercial terms lookup strategy and settings defaults
//! - [`repository`] - Repository implementations
//! - [`seed`] - Demo data for development
//!
//! ## Usage
//!
//! ```rust,ignore
//! use silverline_db::{CommercialTermsResolver, Database, DbConfig, TermsStrategy};
//!
//! let db = Database::new(DbConfig::new("silverline.db")).await?;
//! let resolver = CommercialTermsResolver::for_strategy(&db, TermsStrategy::Tiered);
//!
//! let settings = resolver.resolve_global_settings().await?;
//! let terms = resolver.resolve("reseller-id").await?;
//! let rate = db.rates().current_rate().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod rate_source;
pub mod repository;
pub mod seed;
pub mod terms;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use rate_source::RateSource;
pub use terms::{
    CommercialTermsResolver, TableTermsSource, TermsSource, TermsStrategy, TieredTermsSource,
    ViewTermsSource,
};

// Repository re-exports for convenience
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::rate::RateRepository;
pub use repository::reseller::{Reseller, ResellerRepository};
pub use repository::settings::SettingsRepository;
