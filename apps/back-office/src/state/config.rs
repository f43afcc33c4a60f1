//! # Configuration State
//!
//! Process configuration, read-only after start-up.
//!
//! Pricing settings are deliberately absent. They are read from the
//! database on every calculation so an admin change applies to the very
//! next quote.

use chrono::FixedOffset;

use crate::config::{AppConfig, ConfigError};

/// Validated configuration handed to commands.
#[derive(Debug, Clone)]
pub struct ConfigState {
    config: AppConfig,
    utc_offset: FixedOffset,
}

impl ConfigState {
    /// Validates `config` and resolves derived values.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let utc_offset = config.utc_offset()?;
        Ok(ConfigState { config, utc_offset })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Days covered by the rate trend.
    pub fn trend_days(&self) -> u32 {
        self.config.trend_days
    }

    /// Offset that defines a trend calendar day.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn company_name(&self) -> &str {
        &self.config.company_name
    }
}
