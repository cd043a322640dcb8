use anyhow::{Context, Result};
use contracts::system::site_settings::SiteSettings;

use super::repository::{self, SITE_SETTINGS_KEY};
use crate::shared::api_error::bad_request;

/// Current settings; defaults until an admin saves them
pub async fn get() -> Result<SiteSettings> {
    match repository::get_value(SITE_SETTINGS_KEY).await? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!("Stored site settings are unreadable, using defaults: {}", e);
                Ok(SiteSettings::default())
            }
        },
        None => Ok(SiteSettings::default()),
    }
}

pub async fn update(settings: SiteSettings) -> Result<SiteSettings> {
    settings.validate().map_err(bad_request)?;
    let json = serde_json::to_string(&settings).context("Failed to serialize site settings")?;
    repository::upsert_value(SITE_SETTINGS_KEY, &json, "Site-wide pricing and support settings")
        .await?;
    tracing::info!(
        "Site settings updated: floor charge {} ({} paise/floor), commission {} paise/jar",
        if settings.floor_charge_enabled { "on" } else { "off" },
        settings.floor_charge_per_floor,
        settings.partner_commission_per_jar
    );
    Ok(settings)
}
