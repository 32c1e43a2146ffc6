//! Place endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use neighborly_common::AppResult;
use neighborly_core::marker::VisibleMarker;
use neighborly_db::entities::place;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

/// Place response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: Option<f64>,
    pub visited: bool,
    pub photo_url: Option<String>,
    pub opening_hours: Option<String>,
    pub search_keywords: Vec<String>,
    pub brand_name: Option<String>,
    pub ideal_conditions: serde_json::Value,
    pub acceptable_conditions: serde_json::Value,
    pub avoid_conditions: serde_json::Value,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<place::Model> for PlaceResponse {
    fn from(p: place::Model) -> Self {
        let search_keywords = p
            .search_keywords
            .as_ref()
            .and_then(serde_json::Value::as_array)
            .map(|terms| {
                terms
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            category: p.category,
            latitude: p.latitude,
            longitude: p.longitude,
            rating: p.rating,
            visited: p.visited,
            photo_url: p.photo_url,
            opening_hours: p.opening_hours,
            search_keywords,
            brand_name: p.brand_name,
            ideal_conditions: p.ideal_conditions,
            acceptable_conditions: p.acceptable_conditions,
            avoid_conditions: p.avoid_conditions,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Marker query.
#[derive(Debug, Deserialize)]
pub struct MarkersQuery {
    pub zoom: f64,
}

async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<PlaceResponse>>> {
    let places = state.place_service.list_public().await?;
    Ok(ApiResponse::ok(places.into_iter().map(Into::into).collect()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PlaceResponse>> {
    let place = state.place_service.get_public(&id).await?;
    Ok(ApiResponse::ok(place.into()))
}

/// Places worth drawing at `zoom`, highest priority first.
async fn markers(
    State(state): State<AppState>,
    Query(query): Query<MarkersQuery>,
) -> AppResult<ApiResponse<Vec<VisibleMarker<PlaceResponse>>>> {
    let markers = state.place_service.markers(query.zoom).await?;
    Ok(ApiResponse::ok(
        markers
            .into_iter()
            .map(|m| m.map(PlaceResponse::from))
            .collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/markers", get(markers))
        .route("/{id}", get(show))
}
