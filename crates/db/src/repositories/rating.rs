//! Rating repository.

use std::sync::Arc;

use neighborly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QuerySelect,
    sea_query::{Expr, Func, SimpleExpr},
};

use crate::entities::{EntityType, Rating, rating};

/// Average and count of the ratings of one entity.
#[derive(Debug, Clone, Copy, PartialEq, FromQueryResult)]
pub struct RatingAggregate {
    pub average: Option<f64>,
    pub count: i64,
}

/// Repository for rating operations.
#[derive(Clone)]
pub struct RatingRepository {
    db: Arc<DatabaseConnection>,
}

impl RatingRepository {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a rating.
    pub async fn create(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Average and count of an entity's ratings.
    pub async fn aggregate(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<RatingAggregate> {
        let result = Rating::find()
            .filter(rating::Column::EntityType.eq(entity_type))
            .filter(rating::Column::EntityId.eq(entity_id))
            .select_only()
            .column_as(
                SimpleExpr::from(Func::avg(Expr::col(rating::Column::Rating))),
                "average",
            )
            .column_as(
                SimpleExpr::from(Func::count(Expr::col(rating::Column::Id))),
                "count",
            )
            .into_model::<RatingAggregate>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.unwrap_or(RatingAggregate {
            average: None,
            count: 0,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{mock_db, rating_model};

    #[tokio::test]
    async fn test_create() {
        let row = rating_model("r1", EntityType::Place, "p1", 4.5);
        let db = Arc::new(mock_db().append_query_results([[row.clone()]]).into_connection());

        let repo = RatingRepository::new(db);
        let created = repo.create(row.into()).await.unwrap();
        assert!((created.rating - 4.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_aggregate() {
        let db = Arc::new(
            mock_db()
                .append_query_results([[maplit::btreemap! {
                    "average" => sea_orm::Value::Double(Some(4.25)),
                    "count" => sea_orm::Value::BigInt(Some(4)),
                }]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let agg = repo.aggregate(EntityType::Place, "p1").await.unwrap();
        assert_eq!(agg.count, 4);
        assert_eq!(agg.average, Some(4.25));
    }

    #[tokio::test]
    async fn test_aggregate_without_ratings() {
        let db = Arc::new(
            mock_db()
                .append_query_results([[maplit::btreemap! {
                    "average" => sea_orm::Value::Double(None),
                    "count" => sea_orm::Value::BigInt(Some(0)),
                }]])
                .into_connection(),
        );

        let repo = RatingRepository::new(db);
        let agg = repo.aggregate(EntityType::Event, "e1").await.unwrap();
        assert_eq!(agg.count, 0);
        assert!(agg.average.is_none());
    }
}
