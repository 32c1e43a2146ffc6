//! Place and journey search with per-client history.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveTime, Timelike};
use chrono_tz::Asia::Kolkata;
use neighborly_common::{AppError, AppResult, SharedClock};
use neighborly_db::entities::{journey, place};
use tokio::sync::RwLock;

use super::journey::JourneyService;
use super::place::PlaceService;
use crate::geo::Coordinate;
use crate::search::{MIN_QUERY_CHARS, RankedResult, SearchContext, SearchFilters, SearchHistory, search};

/// Journeys considered per search.
const JOURNEY_POOL: u64 = 200;

/// Clients whose history is kept before the map is reset.
const MAX_HISTORY_CLIENTS: usize = 10_000;

/// A search request.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    pub filters: SearchFilters,
    pub user_location: Option<Coordinate>,
    /// Local hour for the open-now filter; defaults to the current IST hour.
    pub hour: Option<u32>,
}

/// Ranked places and journeys.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub places: Vec<RankedResult<place::Model>>,
    pub journeys: Vec<RankedResult<journey::Model>>,
}

impl SearchResults {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty() && self.journeys.is_empty()
    }
}

#[derive(Clone)]
pub struct SearchService {
    places: PlaceService,
    journeys: JourneyService,
    histories: Arc<RwLock<HashMap<String, SearchHistory>>>,
    clock: SharedClock,
}

impl SearchService {
    #[must_use]
    pub fn new(places: PlaceService, journeys: JourneyService, clock: SharedClock) -> Self {
        Self {
            places,
            journeys,
            histories: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    fn local_time(&self, hour: Option<u32>) -> AppResult<NaiveTime> {
        match hour {
            Some(h) => NaiveTime::from_hms_opt(h, 0, 0)
                .ok_or_else(|| AppError::Validation("Hour must be between 0 and 23".to_string())),
            None => {
                let now = self.clock.now().with_timezone(&Kolkata);
                Ok(NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or(NaiveTime::MIN))
            }
        }
    }

    /// Search public places and published journeys.
    ///
    /// Queries shorter than two characters return nothing and touch neither
    /// the store nor the history.
    pub async fn search(&self, client_key: &str, request: SearchRequest) -> AppResult<SearchResults> {
        let query = request.query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(SearchResults::default());
        }
        if let Some(max) = request.filters.max_distance
            && !(max.is_finite() && max > 0.0)
        {
            return Err(AppError::Validation(
                "maxDistance must be a positive number".to_string(),
            ));
        }

        let context = SearchContext {
            user_location: request.user_location,
            local_time: self.local_time(request.hour)?,
        };

        let (places, journeys) = tokio::try_join!(
            self.places.list_public(),
            self.journeys.list_published(JOURNEY_POOL, 0),
        )?;

        let results = SearchResults {
            places: search(&places, query, &request.filters, &context),
            journeys: search(&journeys, query, &request.filters, &context),
        };

        self.record(client_key, query).await;
        tracing::debug!(
            query = %query,
            places = results.places.len(),
            journeys = results.journeys.len(),
            "Search completed"
        );
        Ok(results)
    }

    async fn record(&self, client_key: &str, query: &str) {
        let mut histories = self.histories.write().await;
        if histories.len() >= MAX_HISTORY_CLIENTS && !histories.contains_key(client_key) {
            histories.clear();
        }
        histories
            .entry(client_key.to_string())
            .or_default()
            .record(query);
    }

    /// A client's recent queries, newest first.
    pub async fn history(&self, client_key: &str) -> Vec<String> {
        self.histories
            .read()
            .await
            .get(client_key)
            .map(SearchHistory::entries)
            .unwrap_or_default()
    }

    /// Forget a client's history.
    pub async fn clear_history(&self, client_key: &str) {
        self.histories.write().await.remove(client_key);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use neighborly_common::ManualClock;
    use neighborly_db::repositories::{JourneyRepository, PlaceRepository};
    use neighborly_db::test_utils::{journey_model, mock_db, place_model};
    use sea_orm::DatabaseConnection;

    fn service(db: DatabaseConnection) -> SearchService {
        let db = Arc::new(db);
        SearchService::new(
            PlaceService::new(PlaceRepository::new(db.clone()), vec![]),
            JourneyService::new(JourneyRepository::new(db.clone()), PlaceRepository::new(db)),
            Arc::new(ManualClock::default()),
        )
    }

    fn request(query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            ..SearchRequest::default()
        }
    }

    #[tokio::test]
    async fn test_short_query_skips_store_and_history() {
        // No mock results: any query would fail.
        let svc = service(mock_db().into_connection());

        assert!(svc.search("ip", request("a")).await.unwrap().is_empty());
        assert!(svc.search("ip", request("")).await.unwrap().is_empty());
        assert!(svc.history("ip").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_ranks_and_records_history() {
        let db = mock_db()
            .append_query_results([[
                place_model("p1", "Brew and Bake", "cafe"),
                place_model("p2", "Brewsky", "bar"),
            ]])
            .append_query_results([[journey_model("j1", "brewery-trail")]])
            .into_connection();
        let svc = service(db);

        let results = svc.search("ip", request("Brewsky")).await.unwrap();
        assert_eq!(results.places[0].item.id, "p2");
        assert_eq!(results.places.len(), 1);
        assert!(results.journeys.is_empty());
        assert_eq!(svc.history("ip").await, vec!["Brewsky".to_string()]);

        svc.clear_history("ip").await;
        assert!(svc.history("ip").await.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_bad_hour_and_distance() {
        let svc = service(mock_db().into_connection());

        let mut late = request("cafe");
        late.hour = Some(24);
        assert!(matches!(svc.search("ip", late).await, Err(AppError::Validation(_))));

        let mut far = request("cafe");
        far.filters.max_distance = Some(-1.0);
        assert!(matches!(svc.search("ip", far).await, Err(AppError::Validation(_))));
    }
}
