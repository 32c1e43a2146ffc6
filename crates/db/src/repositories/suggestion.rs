//! Community suggestion repository.

use std::sync::Arc;

use chrono::Utc;
use neighborly_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, sea_query::Expr,
};

use crate::entities::{
    CommunityPlaceSuggestion, ModerationStatus, SuggestionVote, community_place_suggestion,
    suggestion_vote,
};

/// Repository for community place suggestions and their votes.
#[derive(Clone)]
pub struct SuggestionRepository {
    db: Arc<DatabaseConnection>,
}

impl SuggestionRepository {
    /// Create a new suggestion repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find suggestion by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<community_place_suggestion::Model>> {
        CommunityPlaceSuggestion::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Suggestions, most voted first, optionally filtered by status.
    pub async fn find_many(
        &self,
        status: Option<ModerationStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<community_place_suggestion::Model>> {
        let mut query = CommunityPlaceSuggestion::find();
        if let Some(status) = status {
            query = query.filter(community_place_suggestion::Column::Status.eq(status));
        }

        query
            .order_by(community_place_suggestion::Column::Votes, Order::Desc)
            .order_by(community_place_suggestion::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a suggestion.
    pub async fn create(
        &self,
        model: community_place_suggestion::ActiveModel,
    ) -> AppResult<community_place_suggestion::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a moderation decision.
    pub async fn set_status(
        &self,
        id: &str,
        status: ModerationStatus,
        admin_notes: Option<String>,
    ) -> AppResult<community_place_suggestion::Model> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Suggestion not found: {id}")))?;

        let mut active: community_place_suggestion::ActiveModel = existing.into();
        active.status = Set(status);
        if admin_notes.is_some() {
            active.admin_notes = Set(admin_notes);
        }
        active.reviewed_at = Set(Some(Utc::now().into()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether `voter_key` already voted for a suggestion.
    pub async fn has_voted(&self, suggestion_id: &str, voter_key: &str) -> AppResult<bool> {
        let existing = SuggestionVote::find()
            .filter(suggestion_vote::Column::SuggestionId.eq(suggestion_id))
            .filter(suggestion_vote::Column::VoterKey.eq(voter_key))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(existing.is_some())
    }

    /// Record a vote and bump the suggestion's counter in one transaction.
    pub async fn add_vote(&self, vote: suggestion_vote::ActiveModel) -> AppResult<suggestion_vote::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = vote.insert(&txn).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("You have already voted for this suggestion".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        CommunityPlaceSuggestion::update_many()
            .col_expr(
                community_place_suggestion::Column::Votes,
                Expr::col(community_place_suggestion::Column::Votes).add(1),
            )
            .filter(community_place_suggestion::Column::Id.eq(created.suggestion_id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Delete a suggestion (votes cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = CommunityPlaceSuggestion::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Suggestion not found: {id}")));
        }
        Ok(())
    }
}

/// A second vote from the same voter trips `idx_suggestion_votes_unique`.
fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err
            .to_string()
            .contains("duplicate key value violates unique constraint")
}
