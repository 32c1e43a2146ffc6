//! Community place suggestion service.

use chrono::Utc;
use neighborly_common::{AppError, AppResult, id::IdGenerator, sanitize_text};
use neighborly_db::entities::{ModerationStatus, community_place_suggestion, suggestion_vote};
use neighborly_db::repositories::SuggestionRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::rate_limit::{FixedWindowLimiter, policies};
use crate::validation::{OUT_OF_BOUNDS_MESSAGE, validate_indiranagar};

/// Input for suggesting a new place.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuggestionInput {
    #[validate(length(min = 1, max = 200))]
    pub place_name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[validate(email)]
    pub submitter_email: String,
    #[validate(length(max = 100))]
    pub submitter_name: Option<String>,
}

/// Admin decision on a suggestion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateSuggestionInput {
    pub status: ModerationStatus,
    pub admin_notes: Option<String>,
}

/// Service for community suggestions and their votes.
#[derive(Clone)]
pub struct SuggestionService {
    suggestion_repo: SuggestionRepository,
    limiter: FixedWindowLimiter,
    id_gen: IdGenerator,
}

impl SuggestionService {
    /// Create a new suggestion service.
    #[must_use]
    pub const fn new(suggestion_repo: SuggestionRepository, limiter: FixedWindowLimiter) -> Self {
        Self {
            suggestion_repo,
            limiter,
            id_gen: IdGenerator::new(),
        }
    }

    /// Suggestions by votes, optionally in one moderation state.
    pub async fn list(
        &self,
        status: Option<ModerationStatus>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<community_place_suggestion::Model>> {
        self.suggestion_repo.find_many(status, limit, offset).await
    }

    /// Submit a suggestion. Each email may submit three per day.
    pub async fn submit(
        &self,
        input: CreateSuggestionInput,
    ) -> AppResult<community_place_suggestion::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let email = input.submitter_email.trim().to_lowercase();
        self.limiter.enforce(&email, &policies::SUGGESTIONS).await?;

        let (latitude, longitude) = match (input.latitude, input.longitude) {
            (Some(lat), Some(lng)) => {
                if !validate_indiranagar(lat, lng) {
                    return Err(AppError::Validation(OUT_OF_BOUNDS_MESSAGE.to_string()));
                }
                (Some(lat), Some(lng))
            }
            (None, None) => (None, None),
            _ => {
                return Err(AppError::Validation(
                    "Latitude and longitude must be given together".to_string(),
                ));
            }
        };

        let place_name = sanitize_text(&input.place_name);
        if place_name.is_empty() {
            return Err(AppError::Validation("Place name is required".to_string()));
        }

        let model = community_place_suggestion::ActiveModel {
            id: Set(self.id_gen.generate()),
            place_name: Set(place_name),
            description: Set(input.description.as_deref().map(sanitize_text)),
            category: Set(input.category.map(|c| c.trim().to_lowercase())),
            latitude: Set(latitude),
            longitude: Set(longitude),
            submitter_email: Set(email),
            submitter_name: Set(input.submitter_name.as_deref().map(sanitize_text)),
            status: Set(ModerationStatus::Pending),
            votes: Set(0),
            admin_notes: Set(None),
            created_at: Set(Utc::now().into()),
            reviewed_at: Set(None),
        };

        let created = self.suggestion_repo.create(model).await?;
        tracing::info!(suggestion_id = %created.id, "Community suggestion received");
        Ok(created)
    }

    /// Vote for a suggestion once per voter. Returns the updated suggestion.
    pub async fn vote(
        &self,
        suggestion_id: &str,
        voter_key: &str,
    ) -> AppResult<community_place_suggestion::Model> {
        self.limiter.enforce(voter_key, &policies::VOTES).await?;

        let suggestion = self
            .suggestion_repo
            .find_by_id(suggestion_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Suggestion not found: {suggestion_id}")))?;

        if suggestion.status == ModerationStatus::Rejected {
            return Err(AppError::Conflict(
                "Suggestion is closed for voting".to_string(),
            ));
        }
        if self.suggestion_repo.has_voted(suggestion_id, voter_key).await? {
            return Err(AppError::Conflict(
                "You have already voted for this suggestion".to_string(),
            ));
        }

        self.suggestion_repo
            .add_vote(suggestion_vote::ActiveModel {
                id: Set(self.id_gen.generate()),
                suggestion_id: Set(suggestion_id.to_string()),
                voter_key: Set(voter_key.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        self.suggestion_repo
            .find_by_id(suggestion_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Suggestion not found: {suggestion_id}")))
    }

    /// Approve or reject a suggestion.
    pub async fn moderate(
        &self,
        id: &str,
        input: ModerateSuggestionInput,
    ) -> AppResult<community_place_suggestion::Model> {
        if input.status == ModerationStatus::Pending {
            return Err(AppError::Validation(
                "Status must be approved or rejected".to_string(),
            ));
        }
        let updated = self
            .suggestion_repo
            .set_status(id, input.status, input.admin_notes)
            .await?;
        tracing::info!(suggestion_id = %id, status = updated.status.as_str(), "Suggestion moderated");
        Ok(updated)
    }

    /// Delete a suggestion.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.suggestion_repo.delete(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use neighborly_common::ManualClock;
    use neighborly_db::test_utils::{mock_db, suggestion_model, suggestion_vote_model};
    use sea_orm::{DatabaseConnection, DbErr, MockExecResult, RuntimeErr};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> SuggestionService {
        SuggestionService::new(
            SuggestionRepository::new(Arc::new(db)),
            FixedWindowLimiter::in_memory(Arc::new(ManualClock::default())),
        )
    }

    fn input(email: &str) -> CreateSuggestionInput {
        CreateSuggestionInput {
            place_name: "Corner Bakery".to_string(),
            description: None,
            category: Some("Bakery".to_string()),
            latitude: Some(12.975),
            longitude: Some(77.64),
            submitter_email: email.to_string(),
            submitter_name: None,
        }
    }

    #[tokio::test]
    async fn test_fourth_suggestion_per_day_is_limited() {
        let mut db = mock_db();
        for i in 0..3 {
            db = db.append_query_results([[suggestion_model(&format!("s{i}"), "a@b.com")]]);
        }
        let svc = service(db.into_connection());

        for _ in 0..3 {
            svc.submit(input("a@b.com")).await.unwrap();
        }
        // Case differences do not make a new submitter.
        match svc.submit(input("A@B.com")).await {
            Err(AppError::RateLimited(msg)) => {
                assert_eq!(msg, "Rate limit exceeded. Maximum 3 suggestions per day.");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejects_half_coordinates_and_out_of_bounds() {
        let svc = service(mock_db().into_connection());

        let mut half = input("x@y.com");
        half.longitude = None;
        assert!(matches!(svc.submit(half).await, Err(AppError::Validation(_))));

        let mut outside = input("z@y.com");
        outside.latitude = Some(12.90);
        match svc.submit(outside).await {
            Err(AppError::Validation(msg)) => assert_eq!(msg, OUT_OF_BOUNDS_MESSAGE),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejects_invalid_email() {
        let svc = service(mock_db().into_connection());
        assert!(matches!(
            svc.submit(input("not-an-email")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_vote_conflicts() {
        let db = mock_db()
            .append_query_results([[suggestion_model("s1", "a@b.com")]])
            .append_query_results([[suggestion_vote_model("v1", "s1", "10.0.0.1")]])
            .into_connection();

        let result = service(db).vote("s1", "10.0.0.1").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_vote_conflicts() {
        // The other request's vote lands between our check and our insert.
        let db = mock_db()
            .append_query_results([[suggestion_model("s1", "a@b.com")]])
            .append_query_results([Vec::<suggestion_vote::Model>::new()])
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                "duplicate key value violates unique constraint \"idx_suggestion_votes_unique\""
                    .to_string(),
            ))])
            .into_connection();

        match service(db).vote("s1", "10.0.0.1").await {
            Err(AppError::Conflict(msg)) => {
                assert_eq!(msg, "You have already voted for this suggestion");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_vote_returns_updated_count() {
        let mut voted = suggestion_model("s1", "a@b.com");
        voted.votes = 1;
        let db = mock_db()
            .append_query_results([[suggestion_model("s1", "a@b.com")]])
            .append_query_results([Vec::<suggestion_vote::Model>::new()])
            .append_query_results([[suggestion_vote_model("v1", "s1", "10.0.0.1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[voted]])
            .into_connection();

        let updated = service(db).vote("s1", "10.0.0.1").await.unwrap();
        assert_eq!(updated.votes, 1);
    }

    #[tokio::test]
    async fn test_moderate_rejects_pending() {
        let svc = service(mock_db().into_connection());
        let result = svc
            .moderate(
                "s1",
                ModerateSuggestionInput {
                    status: ModerationStatus::Pending,
                    admin_notes: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
