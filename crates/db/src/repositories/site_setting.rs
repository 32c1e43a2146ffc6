//! Site setting repository.

use std::sync::Arc;

use chrono::Utc;
use neighborly_common::{AppError, AppResult};
use sea_orm::{
    DatabaseConnection, EntityTrait, Order, QueryOrder, Set, sea_query::OnConflict,
};

use crate::entities::{SiteSetting, site_setting};

/// Repository for key/value site settings.
#[derive(Clone)]
pub struct SiteSettingRepository {
    db: Arc<DatabaseConnection>,
}

impl SiteSettingRepository {
    /// Create a new site setting repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a setting by key.
    pub async fn find(&self, key: &str) -> AppResult<Option<site_setting::Model>> {
        SiteSetting::find_by_id(key)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All settings ordered by key.
    pub async fn find_all(&self) -> AppResult<Vec<site_setting::Model>> {
        SiteSetting::find()
            .order_by(site_setting::Column::Key, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert or overwrite a setting.
    pub async fn upsert(&self, key: &str, value: serde_json::Value) -> AppResult<()> {
        let model = site_setting::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(Utc::now().into()),
        };

        SiteSetting::insert(model)
            .on_conflict(
                OnConflict::column(site_setting::Column::Key)
                    .update_columns([site_setting::Column::Value, site_setting::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a setting. Missing keys are ignored.
    pub async fn delete(&self, key: &str) -> AppResult<()> {
        SiteSetting::delete_by_id(key)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
