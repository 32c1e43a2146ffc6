//! Discovered event service.

use chrono::{DateTime, Utc};
use neighborly_common::{AppError, AppResult, SharedClock, id::IdGenerator};
use neighborly_db::entities::{ModerationStatus, discovered_event, event_source};
use neighborly_db::repositories::EventRepository;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::validation::{OUT_OF_BOUNDS_MESSAGE, validate_indiranagar};

/// Upcoming events returned by default.
const DEFAULT_UPCOMING_LIMIT: u64 = 50;

/// An event pushed in by a fetch job.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IngestEventInput {
    pub source_id: Option<String>,
    pub external_id: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(length(max = 200))]
    pub venue_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Clamped into 0-100.
    #[serde(default)]
    pub quality_score: i32,
    #[validate(url)]
    pub source_url: Option<String>,
}

/// Result of an ingest.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Created(discovered_event::Model),
    /// The source already delivered this event.
    Duplicate(discovered_event::Model),
}

impl IngestOutcome {
    #[must_use]
    pub const fn event(&self) -> &discovered_event::Model {
        match self {
            Self::Created(e) | Self::Duplicate(e) => e,
        }
    }

    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Input for registering an event source.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventSourceInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[validate(length(min = 1, max = 32))]
    pub source_type: String,
}

/// Service for discovered events.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    clock: SharedClock,
    id_gen: IdGenerator,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub const fn new(event_repo: EventRepository, clock: SharedClock) -> Self {
        Self {
            event_repo,
            clock,
            id_gen: IdGenerator::new(),
        }
    }

    /// Approved events that have not ended yet, soonest first.
    pub async fn upcoming(&self, limit: Option<u64>) -> AppResult<Vec<discovered_event::Model>> {
        let limit = limit.unwrap_or(DEFAULT_UPCOMING_LIMIT).min(DEFAULT_UPCOMING_LIMIT);
        self.event_repo.find_upcoming(self.clock.now(), limit).await
    }

    /// Events in a moderation state.
    pub async fn list_by_status(
        &self,
        status: ModerationStatus,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<discovered_event::Model>> {
        self.event_repo.find_by_status(status, limit, offset).await
    }

    /// Store a discovered event as pending unless its source already sent it.
    pub async fn ingest(&self, input: IngestEventInput) -> AppResult<IngestOutcome> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if input.end_time <= input.start_time {
            return Err(AppError::Validation(
                "Event must end after it starts".to_string(),
            ));
        }
        match (input.latitude, input.longitude) {
            (Some(lat), Some(lng)) if !validate_indiranagar(lat, lng) => {
                return Err(AppError::Validation(OUT_OF_BOUNDS_MESSAGE.to_string()));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(AppError::Validation(
                    "Latitude and longitude must be given together".to_string(),
                ));
            }
            _ => {}
        }

        if let (Some(source_id), Some(external_id)) = (&input.source_id, &input.external_id)
            && let Some(existing) = self
                .event_repo
                .find_by_external_id(source_id, external_id)
                .await?
        {
            tracing::debug!(event_id = %existing.id, source_id = %source_id, "Duplicate event skipped");
            return Ok(IngestOutcome::Duplicate(existing));
        }

        let now = self.clock.now();
        let model = discovered_event::ActiveModel {
            id: Set(self.id_gen.generate()),
            source_id: Set(input.source_id.clone()),
            external_id: Set(input.external_id),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            start_time: Set(input.start_time.into()),
            end_time: Set(input.end_time.into()),
            venue_name: Set(input.venue_name),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            status: Set(ModerationStatus::Pending),
            quality_score: Set(input.quality_score.clamp(0, 100)),
            source_url: Set(input.source_url),
            is_active: Set(true),
            created_at: Set(now.into()),
            reviewed_at: Set(None),
        };
        let created = self.event_repo.create(model).await?;

        if let Some(source_id) = &input.source_id {
            self.event_repo.touch_source(source_id, now).await?;
        }

        tracing::info!(event_id = %created.id, title = %created.title, "Event ingested");
        Ok(IngestOutcome::Created(created))
    }

    /// Approve a pending event.
    pub async fn approve(&self, id: &str) -> AppResult<discovered_event::Model> {
        self.transition(id, ModerationStatus::Approved).await
    }

    /// Reject a pending event.
    pub async fn reject(&self, id: &str) -> AppResult<discovered_event::Model> {
        self.transition(id, ModerationStatus::Rejected).await
    }

    /// Only pending events can be decided on.
    async fn transition(
        &self,
        id: &str,
        to: ModerationStatus,
    ) -> AppResult<discovered_event::Model> {
        let event = self
            .event_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event not found: {id}")))?;

        if event.status != ModerationStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Event is already {}",
                event.status.as_str()
            )));
        }

        let mut active: discovered_event::ActiveModel = event.into();
        active.status = Set(to);
        active.reviewed_at = Set(Some(self.clock.now().into()));
        let updated = self.event_repo.update(active).await?;

        tracing::info!(event_id = %id, status = to.as_str(), "Event moderated");
        Ok(updated)
    }

    // ==================== Source Operations ====================

    /// Every configured source.
    pub async fn list_sources(&self) -> AppResult<Vec<event_source::Model>> {
        self.event_repo.find_sources().await
    }

    /// Register a source.
    pub async fn create_source(&self, input: CreateEventSourceInput) -> AppResult<event_source::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.event_repo
            .create_source(event_source::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(input.name.trim().to_string()),
                url: Set(input.url),
                source_type: Set(input.source_type.trim().to_lowercase()),
                is_active: Set(true),
                last_fetched_at: Set(None),
                created_at: Set(self.clock.now().into()),
            })
            .await
    }

    /// Enable or disable a source.
    pub async fn set_source_active(&self, id: &str, active: bool) -> AppResult<()> {
        self.event_repo.set_source_active(id, active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use neighborly_common::ManualClock;
    use neighborly_db::test_utils::{event_model, fixed_time, mock_db};
    use sea_orm::{DatabaseConnection, MockExecResult};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> EventService {
        EventService::new(
            EventRepository::new(Arc::new(db)),
            Arc::new(ManualClock::new(fixed_time().with_timezone(&Utc))),
        )
    }

    fn input(score: i32) -> IngestEventInput {
        let start = fixed_time().with_timezone(&Utc) + Duration::days(1);
        IngestEventInput {
            source_id: Some("src1".to_string()),
            external_id: Some("ext-42".to_string()),
            title: "Open mic night".to_string(),
            description: None,
            start_time: start,
            end_time: start + Duration::hours(2),
            venue_name: None,
            latitude: None,
            longitude: None,
            quality_score: score,
            source_url: None,
        }
    }

    #[tokio::test]
    async fn test_ingest_clamps_score_and_touches_source() {
        let mut stored = event_model("e1", ModerationStatus::Pending);
        stored.quality_score = 100;
        let db = mock_db()
            .append_query_results([Vec::<discovered_event::Model>::new()])
            .append_query_results([[stored]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let outcome = service(db).ingest(input(250)).await.unwrap();
        assert!(!outcome.is_duplicate());
        assert_eq!(outcome.event().quality_score, 100);
    }

    #[tokio::test]
    async fn test_ingest_skips_duplicates() {
        let db = mock_db()
            .append_query_results([[event_model("e1", ModerationStatus::Approved)]])
            .into_connection();

        let outcome = service(db).ingest(input(50)).await.unwrap();
        assert!(outcome.is_duplicate());
        assert_eq!(outcome.event().id, "e1");
    }

    #[tokio::test]
    async fn test_ingest_rejects_inverted_window() {
        let mut bad = input(50);
        bad.end_time = bad.start_time - Duration::minutes(1);
        assert!(matches!(
            service(mock_db().into_connection()).ingest(bad).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_approve_pending() {
        let mut approved = event_model("e1", ModerationStatus::Approved);
        approved.reviewed_at = Some(fixed_time());
        let db = mock_db()
            .append_query_results([[event_model("e1", ModerationStatus::Pending)]])
            .append_query_results([[approved]])
            .into_connection();

        let updated = service(db).approve("e1").await.unwrap();
        assert_eq!(updated.status, ModerationStatus::Approved);
    }

    #[tokio::test]
    async fn test_only_pending_events_transition() {
        let db = mock_db()
            .append_query_results([[event_model("e1", ModerationStatus::Rejected)]])
            .into_connection();

        match service(db).approve("e1").await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Event is already rejected"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_approve_missing_event() {
        let db = mock_db()
            .append_query_results([Vec::<discovered_event::Model>::new()])
            .into_connection();
        assert!(matches!(
            service(db).reject("nope").await,
            Err(AppError::NotFound(_))
        ));
    }
}
