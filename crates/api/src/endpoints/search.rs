//! Search endpoints.

use axum::{
    Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use neighborly_common::{AppError, AppResult};
use neighborly_core::geo::Coordinate;
use neighborly_core::search::{RankedResult, SearchFilters};
use neighborly_core::SearchRequest;
use serde::{Deserialize, Serialize};

use super::{CoordinateQuery, journeys::JourneyResponse, places::PlaceResponse};
use crate::{
    extractors::ClientIp,
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Search query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<String>,
    pub max_distance: Option<f64>,
    #[serde(default)]
    pub open_now: bool,
    pub hour: Option<u32>,
}

/// Ranked matches.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub places: Vec<RankedResult<PlaceResponse>>,
    pub journeys: Vec<RankedResult<JourneyResponse>>,
}

/// The caller's location, if given. Unlike place coordinates it may lie
/// outside the neighborhood.
fn user_location(query: &CoordinateQuery) -> AppResult<Option<Coordinate>> {
    match query.values() {
        (None, None) => Ok(None),
        (Some(lat), Some(lng))
            if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) =>
        {
            Ok(Some(Coordinate::new(lat, lng)))
        }
        _ => Err(AppError::Validation("Invalid user location".to_string())),
    }
}

async fn search(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Query(query): Query<SearchQuery>,
    Query(location): Query<CoordinateQuery>,
) -> AppResult<ApiResponse<SearchResponse>> {
    let request = SearchRequest {
        query: query.q,
        filters: SearchFilters {
            category: query.category.filter(|c| !c.trim().is_empty()),
            max_distance: query.max_distance,
            open_now: query.open_now,
        },
        user_location: user_location(&location)?,
        hour: query.hour,
    };

    let results = state.search_service.search(&ip, request).await?;
    Ok(ApiResponse::ok(SearchResponse {
        places: results
            .places
            .into_iter()
            .map(|r| r.map(PlaceResponse::from))
            .collect(),
        journeys: results
            .journeys
            .into_iter()
            .map(|r| r.map(JourneyResponse::from))
            .collect(),
    }))
}

async fn history(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
) -> ApiResponse<Vec<String>> {
    ApiResponse::ok(state.search_service.history(&ip).await)
}

async fn clear_history(State(state): State<AppState>, ClientIp(ip): ClientIp) -> impl IntoResponse {
    state.search_service.clear_history(&ip).await;
    ok()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(search))
        .route("/history", get(history).delete(clear_history))
}
