//! Weather-aware recommendations.

use neighborly_common::{AppError, AppResult};
use neighborly_db::entities::{journey, place};

use super::journey::{JourneyService, journey_suitability};
use super::place::{PlaceService, place_suitability};
use super::weather::WeatherService;
use crate::geo::Coordinate;
use crate::weather::{Scored, WeatherSnapshot, recommend};

/// Default number of places and journeys returned.
pub const DEFAULT_RECOMMENDATIONS: usize = 6;

const MAX_RECOMMENDATIONS: usize = 50;

/// Journeys scored per request.
const JOURNEY_POOL: u64 = 100;

/// Current weather and the best places and journeys for it.
#[derive(Debug, Clone)]
pub struct Recommendations {
    pub weather: WeatherSnapshot,
    pub places: Vec<Scored<place::Model>>,
    pub journeys: Vec<Scored<journey::Model>>,
}

#[derive(Clone)]
pub struct RecommendationService {
    places: PlaceService,
    journeys: JourneyService,
    weather: WeatherService,
}

impl RecommendationService {
    #[must_use]
    pub const fn new(places: PlaceService, journeys: JourneyService, weather: WeatherService) -> Self {
        Self {
            places,
            journeys,
            weather,
        }
    }

    /// Score public places and published journeys against the weather at
    /// `at` and keep the top `limit` of each.
    pub async fn recommend(&self, at: Coordinate, limit: Option<usize>) -> AppResult<Recommendations> {
        let limit = limit.unwrap_or(DEFAULT_RECOMMENDATIONS);
        if limit == 0 || limit > MAX_RECOMMENDATIONS {
            return Err(AppError::Validation(format!(
                "Limit must be between 1 and {MAX_RECOMMENDATIONS}"
            )));
        }

        let weather = self.weather.current(at).await;
        let (places, journeys) = tokio::try_join!(
            self.places.list_public(),
            self.journeys.list_published(JOURNEY_POOL, 0),
        )?;

        let mut places = recommend(places, weather.condition, place_suitability);
        places.truncate(limit);
        let mut journeys = recommend(journeys, weather.condition, journey_suitability);
        journeys.truncate(limit);

        tracing::debug!(
            condition = %weather.condition,
            places = places.len(),
            journeys = journeys.len(),
            "Recommendations computed"
        );

        Ok(Recommendations {
            weather,
            places,
            journeys,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::weather::WeatherCondition;
    use chrono::{TimeZone, Utc};
    use neighborly_common::ManualClock;
    use neighborly_common::config::WeatherConfig;
    use neighborly_db::repositories::{JourneyRepository, PlaceRepository};
    use neighborly_db::test_utils::{journey_model, mock_db, place_model};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rainy_month_prefers_indoor_places() {
        let mut rooftop = place_model("p1", "Rooftop", "bar");
        rooftop.avoid_conditions = json!(["rainy"]);
        let mut cafe = place_model("p2", "Cozy Cafe", "cafe");
        cafe.ideal_conditions = json!(["rainy"]);
        let plain = place_model("p3", "Plain", "shop");

        let db = Arc::new(
            mock_db()
                .append_query_results([[rooftop, cafe, plain]])
                .append_query_results([[journey_model("j1", "walk")]])
                .into_connection(),
        );
        let places = PlaceService::new(PlaceRepository::new(db.clone()), vec![]);
        let journeys = JourneyService::new(JourneyRepository::new(db.clone()), PlaceRepository::new(db));
        // No providers: July's seasonal estimate is rainy.
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 7, 15, 4, 30, 0).unwrap());
        let weather = WeatherService::new(vec![], &WeatherConfig::default(), Arc::new(clock));

        let recs = RecommendationService::new(places, journeys, weather)
            .recommend(Coordinate::new(12.9716, 77.6412), Some(2))
            .await
            .unwrap();

        assert_eq!(recs.weather.condition, WeatherCondition::Rainy);
        let ids: Vec<&str> = recs.places.iter().map(|s| s.item.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p3"]);
        assert_eq!(recs.places[0].weather_score, 2);
        assert_eq!(recs.journeys.len(), 1);
    }
}
