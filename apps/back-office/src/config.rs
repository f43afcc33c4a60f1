//! Back office configuration.
//!
//! Loaded with the `config` crate, later sources overriding earlier ones:
//!
//! ```text
//! built-in defaults ──► silverline.toml (optional) ──► SILVERLINE_* environment
//! ```
//!
//! Environment keys use a single `_` after the prefix and `__` for nesting,
//! e.g. `SILVERLINE_DATABASE_PATH=/var/lib/silverline.db`.
//!
//! Pricing settings (extra charges, GST rate, company state) are NOT here.
//! They live in the database and are read fresh for every calculation.

use chrono::FixedOffset;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use silverline_db::TermsStrategy;

/// Base name of the optional config file (any format `config` recognises).
pub const CONFIG_FILE: &str = "silverline";

/// Back office configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file, or `:memory:`
    pub database_path: String,

    /// Pool size for file databases
    pub max_connections: u32,

    /// Days covered by the rate trend
    pub trend_days: u32,

    /// Offset used to bucket rate samples into calendar days (330 = IST)
    pub trend_utc_offset_minutes: i32,

    /// Seller name printed on invoices
    pub company_name: String,

    /// `tiered` (view, then tables) or `direct` (tables only)
    pub terms_source: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: "silverline.db".to_string(),
            max_connections: 5,
            trend_days: silverline_core::DEFAULT_TREND_DAYS,
            trend_utc_offset_minutes: silverline_core::DEFAULT_UTC_OFFSET_MINUTES,
            company_name: "Silverline Wholesale".to_string(),
            terms_source: TermsStrategy::default().to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `silverline.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix("SILVERLINE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Parses configuration from TOML text over the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// Checks values the deserializer cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }
        if self.trend_days == 0 || self.trend_days > 366 {
            return Err(ConfigError::InvalidValue("trend_days".to_string()));
        }
        self.utc_offset()?;
        self.terms_strategy()?;
        Ok(())
    }

    /// The fixed offset for trend day boundaries.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        FixedOffset::east_opt(self.trend_utc_offset_minutes * 60)
            .ok_or_else(|| ConfigError::InvalidValue("trend_utc_offset_minutes".to_string()))
    }

    /// The terms source selected for this process.
    pub fn terms_strategy(&self) -> Result<TermsStrategy, ConfigError> {
        self.terms_source
            .parse()
            .map_err(|_| ConfigError::InvalidValue("terms_source".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}
