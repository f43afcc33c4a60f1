//! # Settings Commands
//!
//! Admin writes to the global pricing settings.
//!
//! Each key is written on its own. An empty value clears the key, which
//! makes the resolver fall back to that key's default.

use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{DbState, TermsState};
use silverline_core::validation::{parse_decimal, validate_percent, validate_state_code};
use silverline_core::{CoreError, GlobalPricingSettings, SettingKey};

/// Validates and stores one setting, returning the settings now in force.
pub async fn set_setting(
    db: &DbState,
    terms: &TermsState,
    key: &str,
    value: &str,
) -> Result<GlobalPricingSettings, ApiError> {
    debug!(key = %key, value = %value, "set_setting command");

    let key = key.parse::<SettingKey>().map_err(CoreError::from)?;
    let settings = db.inner().settings();

    if value.trim().is_empty() {
        settings.clear(key).await?;
        info!(key = %key, "Setting cleared");
        return Ok(terms.inner().resolve_global_settings().await?);
    }

    let stored = match key {
        SettingKey::ExtraChargesPercent | SettingKey::GstRatePercent => {
            parse_decimal(key.as_str(), value)
                .and_then(|pct| validate_percent(key.as_str(), pct))
                .map_err(CoreError::from)?
                .to_string()
        }
        SettingKey::CompanyStateCode => validate_state_code(value).map_err(CoreError::from)?,
    };

    settings.put(key, &stored).await?;
    info!(key = %key, value = %stored, "Setting updated");

    Ok(terms.inner().resolve_global_settings().await?)
}

/// The settings a calculation would use right now.
pub async fn show_settings(terms: &TermsState) -> Result<GlobalPricingSettings, ApiError> {
    Ok(terms.inner().resolve_global_settings().await?)
}
