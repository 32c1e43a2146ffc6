//! Weather and recommendation endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use neighborly_common::AppResult;
use neighborly_core::validation::{NEIGHBORHOOD_CENTER, require_coordinate};
use neighborly_core::weather::{Scored, WeatherSnapshot};
use serde::{Deserialize, Serialize};

use super::{
    CoordinateQuery, journeys::JourneyResponse, places::PlaceResponse, require_feature,
};
use crate::{middleware::AppState, response::ApiResponse};

/// Current weather at a coordinate. Never fails once the coordinate is valid.
async fn current(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> AppResult<ApiResponse<WeatherSnapshot>> {
    let (lat, lng) = query.values();
    let snapshot = state.weather_service.current_at(lat, lng).await?;
    Ok(ApiResponse::ok(snapshot))
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// Weather plus the places and journeys that suit it best.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub weather: WeatherSnapshot,
    pub places: Vec<Scored<PlaceResponse>>,
    pub journeys: Vec<Scored<JourneyResponse>>,
}

async fn recommendations(
    State(state): State<AppState>,
    Query(at): Query<CoordinateQuery>,
    Query(limit): Query<LimitQuery>,
) -> AppResult<ApiResponse<RecommendationsResponse>> {
    require_feature(state.features.weather_recommendations, "Weather recommendations")?;

    let at = if at.is_empty() {
        NEIGHBORHOOD_CENTER
    } else {
        let (lat, lng) = at.values();
        require_coordinate(lat, lng)?
    };

    let recs = state.recommendation_service.recommend(at, limit.limit).await?;
    Ok(ApiResponse::ok(RecommendationsResponse {
        weather: recs.weather,
        places: recs
            .places
            .into_iter()
            .map(|s| s.map(PlaceResponse::from))
            .collect(),
        journeys: recs
            .journeys
            .into_iter()
            .map(|s| s.map(JourneyResponse::from))
            .collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(current))
}

pub fn recommendations_router() -> Router<AppState> {
    Router::new().route("/", get(recommendations))
}
