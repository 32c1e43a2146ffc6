//! Journey repository.

use std::sync::Arc;

use neighborly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};

use crate::entities::{Journey, JourneyStop, journey, journey_stop};

/// Repository for journeys and their ordered stops.
#[derive(Clone)]
pub struct JourneyRepository {
    db: Arc<DatabaseConnection>,
}

impl JourneyRepository {
    /// Create a new journey repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Journey Operations ====================

    /// Find journey by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<journey::Model>> {
        Journey::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find journey by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<journey::Model>> {
        Journey::find()
            .filter(journey::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published journeys, newest first.
    pub async fn find_published(&self, limit: u64, offset: u64) -> AppResult<Vec<journey::Model>> {
        Journey::find()
            .filter(journey::Column::IsPublished.eq(true))
            .order_by(journey::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All journeys including drafts, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<journey::Model>> {
        Journey::find()
            .order_by(journey::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count published journeys.
    pub async fn count_published(&self) -> AppResult<u64> {
        Journey::find()
            .filter(journey::Column::IsPublished.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a journey and its stops atomically.
    ///
    /// Either every row is written or none is.
    pub async fn create_with_stops(
        &self,
        journey: journey::ActiveModel,
        stops: Vec<journey_stop::ActiveModel>,
    ) -> AppResult<journey::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = journey
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for stop in stops {
            stop.insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Update journey fields.
    pub async fn update(&self, model: journey::ActiveModel) -> AppResult<journey::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a journey and replace its stops atomically.
    pub async fn update_with_stops(
        &self,
        journey: journey::ActiveModel,
        stops: Vec<journey_stop::ActiveModel>,
    ) -> AppResult<journey::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = journey
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        JourneyStop::delete_many()
            .filter(journey_stop::Column::JourneyId.eq(updated.id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for stop in stops {
            stop.insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Delete a journey (stops cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Journey::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Journey not found: {id}")));
        }
        Ok(())
    }

    // ==================== Stop Operations ====================

    /// Stops of a journey in walking order.
    pub async fn find_stops(&self, journey_id: &str) -> AppResult<Vec<journey_stop::Model>> {
        JourneyStop::find()
            .filter(journey_stop::Column::JourneyId.eq(journey_id))
            .order_by(journey_stop::Column::OrderIndex, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
