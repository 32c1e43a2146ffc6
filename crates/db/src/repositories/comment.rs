//! Comment repository.

use std::sync::Arc;

use neighborly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

use crate::entities::{Comment, EntityType, comment};

/// Repository for comment operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Approved comments of an entity, oldest first.
    pub async fn find_approved_for(
        &self,
        entity_type: EntityType,
        entity_id: &str,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::EntityType.eq(entity_type))
            .filter(comment::Column::EntityId.eq(entity_id))
            .filter(comment::Column::IsApproved.eq(true))
            .order_by(comment::Column::CreatedAt, Order::Asc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count approved comments of an entity.
    pub async fn count_approved_for(&self, entity_type: EntityType, entity_id: &str) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::EntityType.eq(entity_type))
            .filter(comment::Column::EntityId.eq(entity_id))
            .filter(comment::Column::IsApproved.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most recent comments across all entities, for moderation.
    pub async fn find_recent(&self, limit: u64, offset: u64) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .order_by(comment::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a comment.
    pub async fn create(&self, model: comment::ActiveModel) -> AppResult<comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Show or hide a comment.
    pub async fn set_approved(&self, id: &str, approved: bool) -> AppResult<()> {
        let result = Comment::update_many()
            .col_expr(comment::Column::IsApproved, Expr::value(approved))
            .filter(comment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Comment not found: {id}")));
        }
        Ok(())
    }

    /// Delete a comment (replies cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = Comment::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Comment not found: {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{comment_model, mock_db};
    use sea_orm::MockExecResult;

    #[tokio::test]
    async fn test_find_approved_for() {
        let mut reply = comment_model("c2", EntityType::Place, "p1");
        reply.parent_id = Some("c1".to_string());
        let db = Arc::new(
            mock_db()
                .append_query_results([vec![comment_model("c1", EntityType::Place, "p1"), reply]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let found = repo.find_approved_for(EntityType::Place, "p1").await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].parent_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_set_approved_missing() {
        let db = Arc::new(
            mock_db()
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        assert!(matches!(
            repo.set_approved("c404", false).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_count_approved_for() {
        let db = Arc::new(
            mock_db()
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(4))
                }]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        assert_eq!(
            repo.count_approved_for(EntityType::Journey, "j1").await.unwrap(),
            4
        );
    }
}
