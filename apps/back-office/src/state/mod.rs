//! # State Module
//!
//! Application state built once at start-up and lent to commands.
//!
//! Each command takes only the pieces it needs, so quoting never sees the
//! config and invoicing never sees the terms resolver.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppState::open(config)                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │          ┌──────────────────┼──────────────────┐                       │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │   TermsState     │  │   ConfigState    │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Database    │  │  Commercial-     │  │  trend_days      │          │
//! │  │  (SQLite     │  │  TermsResolver   │  │  utc_offset      │          │
//! │  │   pool)      │  │  (no cache)      │  │  company_name    │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  All three are read-only after start-up.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod terms;

pub use config::ConfigState;
pub use db::DbState;
pub use terms::TermsState;

use silverline_db::pool::IN_MEMORY_PATH;
use silverline_db::{Database, DbConfig};
use tracing::info;

use crate::config::AppConfig;
use crate::error::ApiError;

/// Everything a command may need.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: DbState,
    pub terms: TermsState,
    pub config: ConfigState,
}

impl AppState {
    /// Opens the database (running migrations) and builds the terms resolver.
    pub async fn open(config: AppConfig) -> Result<Self, ApiError> {
        let config = ConfigState::new(config)?;
        let strategy = config.config().terms_strategy()?;

        let db_config = if config.config().database_path == IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&config.config().database_path)
                .max_connections(config.config().max_connections)
        };

        info!(path = %config.config().database_path, "Opening database");
        let db = Database::new(db_config).await?;
        let terms = TermsState::new(&db, strategy);

        Ok(AppState {
            db: DbState::new(db),
            terms,
            config,
        })
    }
}
