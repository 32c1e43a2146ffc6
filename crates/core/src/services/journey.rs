//! Journey service.

use std::collections::HashMap;

use chrono::Utc;
use neighborly_common::{AppError, AppResult, id::IdGenerator};
use neighborly_db::entities::{journey, journey_stop, place};
use neighborly_db::repositories::{JourneyRepository, PlaceRepository};
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::geo::{Coordinate, RouteSummary, route_distance};
use crate::search::Searchable;
use crate::validation::{is_valid_slug, require_dense_order};
use crate::weather::{Suitability, WeatherCondition};

/// Most stops a single journey may have.
const MAX_STOPS: usize = 20;

impl Searchable for journey::Model {
    fn name(&self) -> &str {
        &self.title
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn labels(&self) -> Vec<&str> {
        self.mood_tags
            .as_array()
            .map(|tags| tags.iter().filter_map(serde_json::Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Weather suitability stored on a journey.
#[must_use]
pub fn journey_suitability(journey: &journey::Model) -> Suitability {
    Suitability::from_json(
        &journey.ideal_conditions,
        &journey.acceptable_conditions,
        &journey.avoid_conditions,
    )
}

/// One stop of a journey.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStopInput {
    #[validate(length(min = 1))]
    pub place_id: String,
    pub order_index: i32,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[validate(range(min = 0, max = 600))]
    pub duration_minutes: Option<i32>,
}

/// Input for creating or replacing a journey.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JourneyInput {
    #[validate(length(min = 1, max = 128))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 4000))]
    pub description: Option<String>,
    #[serde(default)]
    pub mood_tags: Vec<String>,
    #[validate(range(min = 0))]
    pub estimated_duration_minutes: Option<i32>,
    #[validate(range(min = 0))]
    pub estimated_distance_meters: Option<i32>,
    #[serde(default)]
    pub ideal_conditions: Vec<WeatherCondition>,
    #[serde(default)]
    pub acceptable_conditions: Vec<WeatherCondition>,
    #[serde(default)]
    pub avoid_conditions: Vec<WeatherCondition>,
    #[serde(default)]
    pub is_published: bool,
    #[validate(nested)]
    pub stops: Vec<JourneyStopInput>,
}

/// A stop together with its place, if the place still exists.
#[derive(Debug, Clone)]
pub struct StopDetail {
    pub stop: journey_stop::Model,
    pub place: Option<place::Model>,
}

/// A journey with its ordered stops and walking route.
#[derive(Debug, Clone)]
pub struct JourneyDetail {
    pub journey: journey::Model,
    pub stops: Vec<StopDetail>,
    pub route: RouteSummary,
}

fn labels_json(labels: &[WeatherCondition]) -> serde_json::Value {
    json!(labels.iter().map(|c| c.as_str()).collect::<Vec<_>>())
}

/// Route through the stops' places in order, skipping stops without a place.
fn route_for(stops: &[journey_stop::Model], places: &HashMap<String, place::Model>) -> RouteSummary {
    let coordinates: Vec<Coordinate> = stops
        .iter()
        .filter_map(|stop| places.get(&stop.place_id))
        .map(|p| Coordinate::new(p.latitude, p.longitude))
        .collect();
    route_distance(&coordinates)
}

/// Service for journeys.
#[derive(Clone)]
pub struct JourneyService {
    journey_repo: JourneyRepository,
    place_repo: PlaceRepository,
    id_gen: IdGenerator,
}

impl JourneyService {
    /// Create a new journey service.
    #[must_use]
    pub const fn new(journey_repo: JourneyRepository, place_repo: PlaceRepository) -> Self {
        Self {
            journey_repo,
            place_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Published journeys, newest first.
    pub async fn list_published(&self, limit: u64, offset: u64) -> AppResult<Vec<journey::Model>> {
        self.journey_repo.find_published(limit, offset).await
    }

    /// Every journey, published or not.
    pub async fn list_all(&self) -> AppResult<Vec<journey::Model>> {
        self.journey_repo.find_all().await
    }

    /// A published journey by slug, with stops and route.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<JourneyDetail> {
        let journey = self
            .journey_repo
            .find_by_slug(slug)
            .await?
            .filter(|j| j.is_published)
            .ok_or_else(|| AppError::NotFound(format!("Journey not found: {slug}")))?;

        self.detail(journey).await
    }

    async fn detail(&self, journey: journey::Model) -> AppResult<JourneyDetail> {
        let stops = self.journey_repo.find_stops(&journey.id).await?;
        let place_ids: Vec<String> = stops.iter().map(|s| s.place_id.clone()).collect();
        let places: HashMap<String, place::Model> = self
            .place_repo
            .find_by_ids(&place_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        let route = route_for(&stops, &places);
        let stops = stops
            .into_iter()
            .map(|stop| StopDetail {
                place: places.get(&stop.place_id).cloned(),
                stop,
            })
            .collect();

        Ok(JourneyDetail {
            journey,
            stops,
            route,
        })
    }

    /// Check input and load the places its stops refer to.
    async fn check(&self, input: &JourneyInput) -> AppResult<HashMap<String, place::Model>> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if !is_valid_slug(&input.slug) {
            return Err(AppError::Validation(
                "Slug must be lowercase words separated by hyphens".to_string(),
            ));
        }
        if input.stops.is_empty() {
            return Err(AppError::Validation(
                "A journey needs at least one stop".to_string(),
            ));
        }
        if input.stops.len() > MAX_STOPS {
            return Err(AppError::Validation(format!(
                "A journey can have at most {MAX_STOPS} stops"
            )));
        }
        let indices: Vec<i32> = input.stops.iter().map(|s| s.order_index).collect();
        require_dense_order(&indices)?;

        let place_ids: Vec<String> = input.stops.iter().map(|s| s.place_id.clone()).collect();
        let places: HashMap<String, place::Model> = self
            .place_repo
            .find_by_ids(&place_ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        if let Some(missing) = place_ids.iter().find(|id| !places.contains_key(*id)) {
            return Err(AppError::Validation(format!("Unknown place: {missing}")));
        }

        Ok(places)
    }

    fn stop_models(&self, journey_id: &str, stops: &[JourneyStopInput]) -> Vec<journey_stop::ActiveModel> {
        stops
            .iter()
            .map(|stop| journey_stop::ActiveModel {
                id: Set(self.id_gen.generate()),
                journey_id: Set(journey_id.to_string()),
                place_id: Set(stop.place_id.clone()),
                order_index: Set(stop.order_index),
                notes: Set(stop.notes.clone()),
                duration_minutes: Set(stop.duration_minutes),
            })
            .collect()
    }

    /// Distance and duration, computed from the route where not given.
    fn estimates(input: &JourneyInput, places: &HashMap<String, place::Model>) -> (i32, i32) {
        let mut ordered = input.stops.clone();
        ordered.sort_by_key(|s| s.order_index);
        let coordinates: Vec<Coordinate> = ordered
            .iter()
            .filter_map(|s| places.get(&s.place_id))
            .map(|p| Coordinate::new(p.latitude, p.longitude))
            .collect();
        let route = route_distance(&coordinates);

        let distance = input
            .estimated_distance_meters
            .unwrap_or(route.total_meters.round() as i32);
        let duration = input.estimated_duration_minutes.unwrap_or_else(|| {
            let dwell: i32 = ordered.iter().filter_map(|s| s.duration_minutes).sum();
            route.total_minutes as i32 + dwell
        });
        (distance, duration)
    }

    /// Create a journey and its stops in one transaction.
    pub async fn create(&self, input: JourneyInput) -> AppResult<JourneyDetail> {
        let places = self.check(&input).await?;

        if self.journey_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Journey slug already exists: {}",
                input.slug
            )));
        }

        let (distance, duration) = Self::estimates(&input, &places);
        let id = self.id_gen.generate();
        let model = journey::ActiveModel {
            id: Set(id.clone()),
            slug: Set(input.slug.clone()),
            title: Set(input.title.trim().to_string()),
            description: Set(input.description.clone()),
            mood_tags: Set(json!(input.mood_tags)),
            estimated_duration_minutes: Set(duration),
            estimated_distance_meters: Set(distance),
            ideal_conditions: Set(labels_json(&input.ideal_conditions)),
            acceptable_conditions: Set(labels_json(&input.acceptable_conditions)),
            avoid_conditions: Set(labels_json(&input.avoid_conditions)),
            is_published: Set(input.is_published),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };
        let stops = self.stop_models(&id, &input.stops);

        let journey = self.journey_repo.create_with_stops(model, stops).await?;
        tracing::info!(journey_id = %journey.id, slug = %journey.slug, "Journey created");

        self.detail(journey).await
    }

    /// Replace a journey's fields and stops in one transaction.
    pub async fn update(&self, id: &str, input: JourneyInput) -> AppResult<JourneyDetail> {
        let existing = self
            .journey_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Journey not found: {id}")))?;
        let places = self.check(&input).await?;

        if input.slug != existing.slug
            && let Some(other) = self.journey_repo.find_by_slug(&input.slug).await?
            && other.id != existing.id
        {
            return Err(AppError::Conflict(format!(
                "Journey slug already exists: {}",
                input.slug
            )));
        }

        let (distance, duration) = Self::estimates(&input, &places);
        let mut active: journey::ActiveModel = existing.into();
        active.slug = Set(input.slug.clone());
        active.title = Set(input.title.trim().to_string());
        active.description = Set(input.description.clone());
        active.mood_tags = Set(json!(input.mood_tags));
        active.estimated_duration_minutes = Set(duration);
        active.estimated_distance_meters = Set(distance);
        active.ideal_conditions = Set(labels_json(&input.ideal_conditions));
        active.acceptable_conditions = Set(labels_json(&input.acceptable_conditions));
        active.avoid_conditions = Set(labels_json(&input.avoid_conditions));
        active.is_published = Set(input.is_published);
        active.updated_at = Set(Some(Utc::now().into()));

        let stops = self.stop_models(id, &input.stops);
        let journey = self.journey_repo.update_with_stops(active, stops).await?;
        self.detail(journey).await
    }

    /// Delete a journey and its stops.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.journey_repo.delete(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use neighborly_db::test_utils::{journey_model, journey_stop_model, mock_db, place_model};
    use sea_orm::{DatabaseConnection, DbErr};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> JourneyService {
        let db = Arc::new(db);
        JourneyService::new(
            JourneyRepository::new(db.clone()),
            PlaceRepository::new(db),
        )
    }

    fn stop(place_id: &str, order_index: i32) -> JourneyStopInput {
        JourneyStopInput {
            place_id: place_id.to_string(),
            order_index,
            notes: None,
            duration_minutes: Some(15),
        }
    }

    fn input(stops: Vec<JourneyStopInput>) -> JourneyInput {
        JourneyInput {
            slug: "cafe-crawl".to_string(),
            title: "Cafe crawl".to_string(),
            description: None,
            mood_tags: vec!["chill".to_string()],
            estimated_duration_minutes: None,
            estimated_distance_meters: None,
            ideal_conditions: vec![WeatherCondition::Cool],
            acceptable_conditions: vec![],
            avoid_conditions: vec![WeatherCondition::Rainy],
            is_published: true,
            stops,
        }
    }

    fn two_places() -> (place::Model, place::Model) {
        let a = place_model("p1", "Araku", "cafe");
        let mut b = place_model("p2", "Dyu", "cafe");
        b.latitude = 12.9805;
        (a, b)
    }

    #[tokio::test]
    async fn test_get_by_slug_builds_route() {
        let (a, b) = two_places();
        let db = mock_db()
            .append_query_results([[journey_model("j1", "cafe-crawl")]])
            .append_query_results([[
                journey_stop_model("s1", "j1", "p1", 0),
                journey_stop_model("s2", "j1", "p2", 1),
            ]])
            .append_query_results([[b, a]])
            .into_connection();

        let detail = service(db).get_by_slug("cafe-crawl").await.unwrap();
        assert_eq!(detail.stops.len(), 2);
        assert_eq!(detail.stops[0].place.as_ref().unwrap().id, "p1");
        assert_eq!(detail.route.legs.len(), 1);
        assert!((detail.route.total_meters - 989.6).abs() < 1.0);
    }

    #[tokio::test]
    async fn test_get_by_slug_hides_drafts() {
        let mut draft = journey_model("j1", "draft");
        draft.is_published = false;
        let db = mock_db().append_query_results([[draft]]).into_connection();

        assert!(matches!(
            service(db).get_by_slug("draft").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_gapped_order() {
        let svc = service(mock_db().into_connection());
        let result = svc.create(input(vec![stop("p1", 0), stop("p2", 2)])).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_slug() {
        let svc = service(mock_db().into_connection());
        let mut bad = input(vec![stop("p1", 0)]);
        bad.slug = "Cafe Crawl".to_string();
        assert!(matches!(svc.create(bad).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_place() {
        let (a, _) = two_places();
        let db = mock_db().append_query_results([[a]]).into_connection();
        let result = service(db)
            .create(input(vec![stop("p1", 0), stop("ghost", 1)]))
            .await;
        match result {
            Err(AppError::Validation(msg)) => assert!(msg.contains("ghost")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_slug() {
        let (a, b) = two_places();
        let db = mock_db()
            .append_query_results([[a, b]])
            .append_query_results([[journey_model("j0", "cafe-crawl")]])
            .into_connection();
        let result = service(db)
            .create(input(vec![stop("p1", 0), stop("p2", 1)]))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_writes_journey_and_stops() {
        let (a, b) = two_places();
        let db = mock_db()
            .append_query_results([[a.clone(), b.clone()]])
            .append_query_results([Vec::<journey::Model>::new()])
            .append_query_results([[journey_model("j1", "cafe-crawl")]])
            .append_query_results([[journey_stop_model("s1", "j1", "p1", 0)]])
            .append_query_results([[journey_stop_model("s2", "j1", "p2", 1)]])
            .append_query_results([[
                journey_stop_model("s1", "j1", "p1", 0),
                journey_stop_model("s2", "j1", "p2", 1),
            ]])
            .append_query_results([[a, b]])
            .into_connection();

        let detail = service(db)
            .create(input(vec![stop("p1", 0), stop("p2", 1)]))
            .await
            .unwrap();
        assert_eq!(detail.journey.slug, "cafe-crawl");
        assert_eq!(detail.stops.len(), 2);
    }

    #[tokio::test]
    async fn test_create_surfaces_stop_failure() {
        let (a, b) = two_places();
        let db = mock_db()
            .append_query_results([[a, b]])
            .append_query_results([Vec::<journey::Model>::new()])
            .append_query_results([[journey_model("j1", "cafe-crawl")]])
            .append_query_errors([DbErr::Custom("stop insert failed".to_string())])
            .into_connection();

        let result = service(db)
            .create(input(vec![stop("p1", 0), stop("p2", 1)]))
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[test]
    fn test_estimates_fill_missing_values() {
        let (a, b) = two_places();
        let places: HashMap<String, place::Model> =
            [(a.id.clone(), a), (b.id.clone(), b)].into_iter().collect();
        let (distance, duration) =
            JourneyService::estimates(&input(vec![stop("p2", 1), stop("p1", 0)]), &places);
        assert!((985..=995).contains(&distance));
        // 990 m at 5 km/h rounds up to 12 minutes, plus two 15 minute stops.
        assert_eq!(duration, 42);
    }

    #[test]
    fn test_journey_labels_are_mood_tags() {
        let journey = journey_model("j1", "x");
        assert_eq!(journey.labels(), vec!["chill"]);
    }
}
