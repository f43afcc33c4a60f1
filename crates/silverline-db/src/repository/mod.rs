//! # Repository Module
//!
//! Database repository implementations for Silverline.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  back-office command                                                   │
//! │       │                                                                 │
//! │       │  db.orders().items(order_id)                                   │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── place(&self, order, items)    one transaction                     │
//! │  ├── get(&self, id)                                                    │
//! │  ├── items(&self, order_id)                                            │
//! │  └── update_status(&self, id, from, to)                                │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog products and pricing attributes
//! - [`RateRepository`](rate::RateRepository) - Append-only silver rate samples
//! - [`ResellerRepository`](reseller::ResellerRepository) - Reseller accounts and terms
//! - [`SettingsRepository`](settings::SettingsRepository) - Key/value pricing settings
//! - [`OrderRepository`](order::OrderRepository) - Orders and frozen line snapshots

pub mod order;
pub mod product;
pub mod rate;
pub mod reseller;
pub mod settings;
