//! Rating service.

use chrono::Utc;
use neighborly_common::{AppError, AppResult, id::IdGenerator};
use neighborly_db::entities::rating;
use neighborly_db::repositories::{PlaceRepository, RatingAggregate, RatingRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use crate::entity_ref::{EntityDirectory, EntityRef};
use crate::rate_limit::{FixedWindowLimiter, policies};
use crate::validation::require_rating;

/// Input for rating a place, journey or event.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingInput {
    pub entity_type: String,
    pub entity_id: String,
    pub rating: f64,
}

/// Average and count for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    #[serde(flatten)]
    pub entity: EntityRef,
    /// One decimal; absent until the first rating.
    pub average: Option<f64>,
    pub count: i64,
}

impl RatingSummary {
    fn new(entity: EntityRef, aggregate: RatingAggregate) -> Self {
        Self {
            entity,
            average: aggregate.average.map(|avg| (avg * 10.0).round() / 10.0),
            count: aggregate.count,
        }
    }
}

/// Service for ratings.
#[derive(Clone)]
pub struct RatingService {
    rating_repo: RatingRepository,
    place_repo: PlaceRepository,
    entities: EntityDirectory,
    limiter: FixedWindowLimiter,
    id_gen: IdGenerator,
}

impl RatingService {
    /// Create a new rating service.
    #[must_use]
    pub const fn new(
        rating_repo: RatingRepository,
        place_repo: PlaceRepository,
        entities: EntityDirectory,
        limiter: FixedWindowLimiter,
    ) -> Self {
        Self {
            rating_repo,
            place_repo,
            entities,
            limiter,
            id_gen: IdGenerator::new(),
        }
    }

    /// Current average for an entity.
    pub async fn summary(&self, entity: EntityRef) -> AppResult<RatingSummary> {
        let aggregate = self.rating_repo.aggregate(entity.kind(), entity.id()).await?;
        Ok(RatingSummary::new(entity, aggregate))
    }

    /// Record a rating and return the new average.
    ///
    /// Place ratings also refresh the place's stored rating.
    pub async fn submit(&self, input: SubmitRatingInput, client_ip: &str) -> AppResult<RatingSummary> {
        self.limiter.enforce(client_ip, &policies::RATINGS).await?;

        let entity = EntityRef::parse(&input.entity_type, &input.entity_id)?;
        let value = require_rating(input.rating)?;

        self.entities.require(&entity).await?;

        let model = rating::ActiveModel {
            id: Set(self.id_gen.generate()),
            entity_type: Set(entity.kind()),
            entity_id: Set(entity.id().to_string()),
            rating: Set(value),
            submitter_ip: Set(Some(client_ip.to_string())),
            created_at: Set(Utc::now().into()),
        };
        self.rating_repo.create(model).await?;

        let summary = self.summary(entity).await?;
        if let EntityRef::Place(id) = &summary.entity {
            self.place_repo.set_rating(id, summary.average).await?;
        }

        tracing::debug!(
            entity = %summary.entity,
            average = ?summary.average,
            count = summary.count,
            "Rating recorded"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use neighborly_common::ManualClock;
    use neighborly_db::entities::EntityType;
    use neighborly_db::entities::{ModerationStatus, discovered_event};
    use neighborly_db::repositories::{EventRepository, JourneyRepository};
    use neighborly_db::test_utils::{event_model, mock_db, place_model, rating_model};
    use sea_orm::{DatabaseConnection, MockExecResult};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> RatingService {
        let db = Arc::new(db);
        RatingService::new(
            RatingRepository::new(db.clone()),
            PlaceRepository::new(db.clone()),
            EntityDirectory::new(
                PlaceRepository::new(db.clone()),
                JourneyRepository::new(db.clone()),
                EventRepository::new(db),
            ),
            FixedWindowLimiter::in_memory(Arc::new(ManualClock::default())),
        )
    }

    fn input(value: f64) -> SubmitRatingInput {
        SubmitRatingInput {
            entity_type: "place".to_string(),
            entity_id: "p1".to_string(),
            rating: value,
        }
    }

    #[tokio::test]
    async fn test_rejects_invalid_values() {
        let svc = service(mock_db().into_connection());
        for bad in [0.9, 5.1, 4.35] {
            assert!(matches!(
                svc.submit(input(bad), "10.0.0.1").await,
                Err(AppError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_unknown_place_is_not_found() {
        let db = mock_db()
            .append_query_results([Vec::<neighborly_db::entities::place::Model>::new()])
            .into_connection();
        assert!(matches!(
            service(db).submit(input(4.0), "10.0.0.1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_rounds_average_and_updates_place() {
        let db = mock_db()
            .append_query_results([[place_model("p1", "Toit", "bar")]])
            .append_query_results([[rating_model("r1", EntityType::Place, "p1", 4.5)]])
            .append_query_results([[maplit::btreemap! {
                "average" => sea_orm::Value::Double(Some(4.333_333)),
                "count" => sea_orm::Value::BigInt(Some(3)),
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let summary = service(db).submit(input(4.5), "10.0.0.1").await.unwrap();
        assert_eq!(summary.average, Some(4.3));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.entity, EntityRef::Place("p1".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let db = mock_db()
            .append_query_results([Vec::<discovered_event::Model>::new()])
            .into_connection();
        let rating = SubmitRatingInput {
            entity_type: "event".to_string(),
            entity_id: "e404".to_string(),
            rating: 4.0,
        };

        match service(db).submit(rating, "10.0.0.1").await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Event not found: e404"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_event_rating_leaves_places_alone() {
        // No exec result is queued, so a place update would fail the call.
        let db = mock_db()
            .append_query_results([[event_model("e1", ModerationStatus::Approved)]])
            .append_query_results([[rating_model("r1", EntityType::Event, "e1", 5.0)]])
            .append_query_results([[maplit::btreemap! {
                "average" => sea_orm::Value::Double(Some(5.0)),
                "count" => sea_orm::Value::BigInt(Some(1)),
            }]])
            .into_connection();
        let rating = SubmitRatingInput {
            entity_type: "event".to_string(),
            entity_id: "e1".to_string(),
            rating: 5.0,
        };

        let summary = service(db).submit(rating, "10.0.0.1").await.unwrap();
        assert_eq!(summary.average, Some(5.0));
        assert_eq!(summary.entity, EntityRef::Event("e1".to_string()));
    }
}
