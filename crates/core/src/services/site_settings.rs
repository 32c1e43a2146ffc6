//! Site settings service.

use neighborly_common::{AppError, AppResult};
use neighborly_db::entities::site_setting;
use neighborly_db::repositories::SiteSettingRepository;
use once_cell::sync::Lazy;
use regex::Regex;

static SETTING_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_.-]{0,63}$").expect("valid setting key regex"));

/// Largest serialized value accepted.
const MAX_VALUE_BYTES: usize = 64 * 1024;

fn require_key(key: &str) -> AppResult<()> {
    if SETTING_KEY.is_match(key) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid setting key: {key}")))
    }
}

/// Key/value JSON settings.
#[derive(Clone)]
pub struct SiteSettingsService {
    setting_repo: SiteSettingRepository,
}

impl SiteSettingsService {
    #[must_use]
    pub const fn new(setting_repo: SiteSettingRepository) -> Self {
        Self { setting_repo }
    }

    /// Value of one setting.
    pub async fn get(&self, key: &str) -> AppResult<serde_json::Value> {
        require_key(key)?;
        self.setting_repo
            .find(key)
            .await?
            .map(|s| s.value)
            .ok_or_else(|| AppError::NotFound(format!("Setting not found: {key}")))
    }

    pub async fn list(&self) -> AppResult<Vec<site_setting::Model>> {
        self.setting_repo.find_all().await
    }

    /// Create or replace a setting.
    pub async fn set(&self, key: &str, value: serde_json::Value) -> AppResult<()> {
        require_key(key)?;
        if value.to_string().len() > MAX_VALUE_BYTES {
            return Err(AppError::Validation("Setting value is too large".to_string()));
        }
        self.setting_repo.upsert(key, value).await?;
        tracing::info!(key = %key, "Site setting updated");
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        require_key(key)?;
        self.setting_repo.delete(key).await
    }
}
