//! Discovered event repository.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use neighborly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, sea_query::Expr,
};

use crate::entities::{DiscoveredEvent, EventSource, ModerationStatus, discovered_event, event_source};

/// Repository for discovered events and the sources they come from.
#[derive(Clone)]
pub struct EventRepository {
    db: Arc<DatabaseConnection>,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Event Operations ====================

    /// Find event by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<discovered_event::Model>> {
        DiscoveredEvent::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Approved, active events that have not ended, soonest first.
    pub async fn find_upcoming(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> AppResult<Vec<discovered_event::Model>> {
        DiscoveredEvent::find()
            .filter(discovered_event::Column::Status.eq(ModerationStatus::Approved))
            .filter(discovered_event::Column::IsActive.eq(true))
            .filter(discovered_event::Column::EndTime.gt(now))
            .order_by(discovered_event::Column::StartTime, Order::Asc)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Events in a moderation state, highest quality first.
    pub async fn find_by_status(
        &self,
        status: ModerationStatus,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<discovered_event::Model>> {
        DiscoveredEvent::find()
            .filter(discovered_event::Column::Status.eq(status))
            .order_by(discovered_event::Column::QualityScore, Order::Desc)
            .order_by(discovered_event::Column::StartTime, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an event by its upstream identity.
    pub async fn find_by_external_id(
        &self,
        source_id: &str,
        external_id: &str,
    ) -> AppResult<Option<discovered_event::Model>> {
        DiscoveredEvent::find()
            .filter(discovered_event::Column::SourceId.eq(source_id))
            .filter(discovered_event::Column::ExternalId.eq(external_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an event.
    pub async fn create(&self, model: discovered_event::ActiveModel) -> AppResult<discovered_event::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an event.
    pub async fn update(&self, model: discovered_event::ActiveModel) -> AppResult<discovered_event::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Source Operations ====================

    /// All event sources by name.
    pub async fn find_sources(&self) -> AppResult<Vec<event_source::Model>> {
        EventSource::find()
            .order_by(event_source::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find event source by ID.
    pub async fn find_source_by_id(&self, id: &str) -> AppResult<Option<event_source::Model>> {
        EventSource::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an event source.
    pub async fn create_source(&self, model: event_source::ActiveModel) -> AppResult<event_source::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Enable or disable a source.
    pub async fn set_source_active(&self, id: &str, active: bool) -> AppResult<()> {
        let result = EventSource::update_many()
            .col_expr(event_source::Column::IsActive, Expr::value(active))
            .filter(event_source::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Event source not found: {id}")));
        }
        Ok(())
    }

    /// Stamp the last successful fetch of a source.
    pub async fn touch_source(&self, id: &str, at: DateTime<Utc>) -> AppResult<()> {
        EventSource::update_many()
            .col_expr(event_source::Column::LastFetchedAt, Expr::value(at))
            .filter(event_source::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{event_model, event_source_model, mock_db};

    #[tokio::test]
    async fn test_find_upcoming() {
        let db = Arc::new(
            mock_db()
                .append_query_results([[event_model("e1", ModerationStatus::Approved)]])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let found = repo.find_upcoming(Utc::now(), 50).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].status, ModerationStatus::Approved);
    }

    #[tokio::test]
    async fn test_find_by_external_id_missing() {
        let db = Arc::new(
            mock_db()
                .append_query_results([Vec::<discovered_event::Model>::new()])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        assert!(
            repo.find_by_external_id("src1", "ext-42")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_find_sources() {
        let db = Arc::new(
            mock_db()
                .append_query_results([vec![
                    event_source_model("src1", "bangalore-mirror"),
                    event_source_model("src2", "insider"),
                ]])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        assert_eq!(repo.find_sources().await.unwrap().len(), 2);
    }
}
