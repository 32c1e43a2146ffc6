//! Google Places proxy endpoints.
//!
//! The API key never leaves the server. Callers must come from an
//! allow-listed origin.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use neighborly_common::AppResult;
use neighborly_core::validation::require_coordinate;
use neighborly_core::{PlaceDetails, PlaceSummary, Prediction};
use serde::Deserialize;

use super::CoordinateQuery;
use crate::{extractors::AllowedOrigin, middleware::AppState, response::ApiResponse};

const DEFAULT_RADIUS_METERS: u32 = 1000;
const DEFAULT_PHOTO_WIDTH: u32 = 800;

/// Nearby search options.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub radius: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub input: String,
    pub session_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoQuery {
    #[serde(default)]
    pub reference: String,
    pub max_width: Option<u32>,
}

async fn nearby(
    _origin: AllowedOrigin,
    State(state): State<AppState>,
    Query(at): Query<CoordinateQuery>,
    Query(query): Query<NearbyQuery>,
) -> AppResult<ApiResponse<Vec<PlaceSummary>>> {
    let (lat, lng) = at.values();
    let at = require_coordinate(lat, lng)?;
    let places = state
        .places_client
        .nearby(
            at,
            query.radius.unwrap_or(DEFAULT_RADIUS_METERS),
            query.kind.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(places))
}

async fn details(
    _origin: AllowedOrigin,
    State(state): State<AppState>,
    Path(place_id): Path<String>,
) -> AppResult<ApiResponse<PlaceDetails>> {
    let details = state.places_client.details(&place_id).await?;
    Ok(ApiResponse::ok(details))
}

async fn autocomplete(
    _origin: AllowedOrigin,
    State(state): State<AppState>,
    Query(query): Query<AutocompleteQuery>,
) -> AppResult<ApiResponse<Vec<Prediction>>> {
    let predictions = state
        .places_client
        .autocomplete(&query.input, query.session_token.as_deref())
        .await?;
    Ok(ApiResponse::ok(predictions))
}

/// Photo bytes, streamed back with the upstream content type.
async fn photo(
    _origin: AllowedOrigin,
    State(state): State<AppState>,
    Query(query): Query<PhotoQuery>,
) -> AppResult<Response> {
    let photo = state
        .places_client
        .photo(&query.reference, query.max_width.unwrap_or(DEFAULT_PHOTO_WIDTH))
        .await?;
    Ok((
        [
            (header::CONTENT_TYPE, photo.content_type),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        photo.bytes,
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nearby", get(nearby))
        .route("/details/{place_id}", get(details))
        .route("/autocomplete", get(autocomplete))
        .route("/photo", get(photo))
}
