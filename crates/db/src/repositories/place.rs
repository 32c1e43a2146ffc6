//! Place repository.

use std::sync::Arc;

use chrono::Utc;
use neighborly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};

use crate::entities::{Place, place};

/// Repository for place operations.
#[derive(Clone)]
pub struct PlaceRepository {
    db: Arc<DatabaseConnection>,
}

impl PlaceRepository {
    /// Create a new place repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find place by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<place::Model>> {
        Place::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get place by ID, failing with `NotFound`.
    pub async fn get_by_id(&self, id: &str) -> AppResult<place::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Place not found: {id}")))
    }

    /// All places ordered by name.
    pub async fn find_all(&self) -> AppResult<Vec<place::Model>> {
        Place::find()
            .order_by(place::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Places whose name is in `names`, ordered by name.
    pub async fn find_by_names(&self, names: &[String]) -> AppResult<Vec<place::Model>> {
        if names.is_empty() {
            return Ok(vec![]);
        }

        Place::find()
            .filter(place::Column::Name.is_in(names.iter().cloned()))
            .order_by(place::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Places with the given IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<place::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Place::find()
            .filter(place::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Places in a category, ordered by name.
    pub async fn find_by_category(&self, category: &str) -> AppResult<Vec<place::Model>> {
        Place::find()
            .filter(place::Column::Category.eq(category))
            .order_by(place::Column::Name, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all places.
    pub async fn count(&self) -> AppResult<u64> {
        Place::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new place.
    pub async fn create(&self, model: place::ActiveModel) -> AppResult<place::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a place.
    pub async fn update(&self, model: place::ActiveModel) -> AppResult<place::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set the cached aggregate rating of a place.
    pub async fn set_rating(&self, id: &str, rating: Option<f64>) -> AppResult<()> {
        Place::update_many()
            .col_expr(place::Column::Rating, Expr::value(rating))
            .col_expr(place::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(place::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Mark several places visited or unvisited. Returns the number of rows changed.
    pub async fn set_visited_many(&self, ids: &[String], visited: bool) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Place::update_many()
            .col_expr(place::Column::Visited, Expr::value(visited))
            .col_expr(place::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(place::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Delete a place.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Place::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Place not found: {id}")));
        }
        Ok(())
    }

    /// Delete several places. Returns the number of rows removed.
    pub async fn delete_many(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = Place::delete_many()
            .filter(place::Column::Id.is_in(ids.iter().cloned()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }

    /// Apply a partial update, stamping `updated_at`.
    pub async fn patch(
        &self,
        id: &str,
        apply: impl FnOnce(&mut place::ActiveModel),
    ) -> AppResult<place::Model> {
        let existing = self.get_by_id(id).await?;
        let mut active: place::ActiveModel = existing.into();
        apply(&mut active);
        active.updated_at = Set(Some(Utc::now().into()));
        self.update(active).await
    }
}
