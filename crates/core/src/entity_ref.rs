//! Typed reference to a commentable/ratable row.

use std::fmt;

use neighborly_common::{AppError, AppResult};
use neighborly_db::entities::EntityType;
use neighborly_db::repositories::{EventRepository, JourneyRepository, PlaceRepository};
use serde::{Deserialize, Serialize};

/// A place, journey or event, by ID.
///
/// Stored as the `entity_type` + `entity_id` column pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "entityType", content = "entityId", rename_all = "lowercase")]
pub enum EntityRef {
    Place(String),
    Journey(String),
    Event(String),
}

impl EntityRef {
    /// Build from the raw column/request pair.
    pub fn parse(entity_type: &str, entity_id: &str) -> AppResult<Self> {
        let id = entity_id.trim();
        if id.is_empty() {
            return Err(AppError::Validation("entityId is required".to_string()));
        }
        let id = id.to_string();
        match entity_type.trim().to_ascii_lowercase().as_str() {
            "place" => Ok(Self::Place(id)),
            "journey" => Ok(Self::Journey(id)),
            "event" => Ok(Self::Event(id)),
            other => Err(AppError::Validation(format!("Unknown entity type: {other}"))),
        }
    }

    #[must_use]
    pub fn from_columns(entity_type: EntityType, entity_id: String) -> Self {
        match entity_type {
            EntityType::Place => Self::Place(entity_id),
            EntityType::Journey => Self::Journey(entity_id),
            EntityType::Event => Self::Event(entity_id),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityType {
        match self {
            Self::Place(_) => EntityType::Place,
            Self::Journey(_) => EntityType::Journey,
            Self::Event(_) => EntityType::Event,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Place(id) | Self::Journey(id) | Self::Event(id) => id,
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind().as_str(), self.id())
    }
}

/// Looks up the row an [`EntityRef`] points at.
#[derive(Clone)]
pub struct EntityDirectory {
    place_repo: PlaceRepository,
    journey_repo: JourneyRepository,
    event_repo: EventRepository,
}

impl EntityDirectory {
    #[must_use]
    pub const fn new(
        place_repo: PlaceRepository,
        journey_repo: JourneyRepository,
        event_repo: EventRepository,
    ) -> Self {
        Self {
            place_repo,
            journey_repo,
            event_repo,
        }
    }

    /// Fails with `NotFound` unless the referenced row exists.
    pub async fn require(&self, entity: &EntityRef) -> AppResult<()> {
        let (label, found) = match entity {
            EntityRef::Place(id) => ("Place", self.place_repo.find_by_id(id).await?.is_some()),
            EntityRef::Journey(id) => ("Journey", self.journey_repo.find_by_id(id).await?.is_some()),
            EntityRef::Event(id) => ("Event", self.event_repo.find_by_id(id).await?.is_some()),
        };

        if found {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("{label} not found: {}", entity.id())))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use neighborly_db::entities::{ModerationStatus, discovered_event, journey, place};
    use neighborly_db::test_utils::{event_model, journey_model, mock_db, place_model};
    use sea_orm::MockDatabase;
    use std::sync::Arc;

    fn directory(db: MockDatabase) -> EntityDirectory {
        let db = Arc::new(db.into_connection());
        EntityDirectory::new(
            PlaceRepository::new(db.clone()),
            JourneyRepository::new(db.clone()),
            EventRepository::new(db),
        )
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            EntityRef::parse("Place", "p1").unwrap(),
            EntityRef::Place("p1".to_string())
        );
        assert!(EntityRef::parse("user", "u1").is_err());
        assert!(EntityRef::parse("event", "  ").is_err());
    }

    #[test]
    fn test_columns_round_trip() {
        let r = EntityRef::Journey("j1".to_string());
        assert_eq!(EntityRef::from_columns(r.kind(), r.id().to_string()), r);
        assert_eq!(r.to_string(), "journey:j1");
    }

    #[tokio::test]
    async fn test_require_place() {
        let dir = directory(
            mock_db()
                .append_query_results([[place_model("p1", "Toit", "bar")]])
                .append_query_results([Vec::<place::Model>::new()]),
        );

        dir.require(&EntityRef::Place("p1".to_string())).await.unwrap();
        match dir.require(&EntityRef::Place("gone".to_string())).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Place not found: gone"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_require_journey() {
        let dir = directory(
            mock_db()
                .append_query_results([[journey_model("j1", "evening-walk")]])
                .append_query_results([Vec::<journey::Model>::new()]),
        );

        dir.require(&EntityRef::Journey("j1".to_string())).await.unwrap();
        match dir.require(&EntityRef::Journey("gone".to_string())).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Journey not found: gone"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_require_event() {
        let dir = directory(
            mock_db()
                .append_query_results([[event_model("e1", ModerationStatus::Approved)]])
                .append_query_results([Vec::<discovered_event::Model>::new()]),
        );

        dir.require(&EntityRef::Event("e1".to_string())).await.unwrap();
        match dir.require(&EntityRef::Event("gone".to_string())).await {
            Err(AppError::NotFound(msg)) => assert_eq!(msg, "Event not found: gone"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
