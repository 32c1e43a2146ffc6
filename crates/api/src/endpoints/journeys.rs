//! Journey endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use neighborly_common::AppResult;
use neighborly_core::JourneyDetail;
use neighborly_core::geo::RouteSummary;
use neighborly_db::entities::{journey, journey_stop};
use serde::Serialize;

use super::{Pagination, places::PlaceResponse};
use crate::{middleware::AppState, response::ApiResponse};

/// Journey response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResponse {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub mood_tags: serde_json::Value,
    pub estimated_duration_minutes: i32,
    pub estimated_distance_meters: i32,
    pub ideal_conditions: serde_json::Value,
    pub acceptable_conditions: serde_json::Value,
    pub avoid_conditions: serde_json::Value,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<journey::Model> for JourneyResponse {
    fn from(j: journey::Model) -> Self {
        Self {
            id: j.id,
            slug: j.slug,
            title: j.title,
            description: j.description,
            mood_tags: j.mood_tags,
            estimated_duration_minutes: j.estimated_duration_minutes,
            estimated_distance_meters: j.estimated_distance_meters,
            ideal_conditions: j.ideal_conditions,
            acceptable_conditions: j.acceptable_conditions,
            avoid_conditions: j.avoid_conditions,
            is_published: j.is_published,
            created_at: j.created_at.to_rfc3339(),
            updated_at: j.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// One stop with its place, if the place still exists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopResponse {
    pub id: String,
    pub place_id: String,
    pub order_index: i32,
    pub notes: Option<String>,
    pub duration_minutes: Option<i32>,
    pub place: Option<PlaceResponse>,
}

impl StopResponse {
    fn new(stop: journey_stop::Model, place: Option<PlaceResponse>) -> Self {
        Self {
            id: stop.id,
            place_id: stop.place_id,
            order_index: stop.order_index,
            notes: stop.notes,
            duration_minutes: stop.duration_minutes,
            place,
        }
    }
}

/// Journey with ordered stops and walking route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyDetailResponse {
    #[serde(flatten)]
    pub journey: JourneyResponse,
    pub stops: Vec<StopResponse>,
    pub route: RouteSummary,
}

impl From<JourneyDetail> for JourneyDetailResponse {
    fn from(detail: JourneyDetail) -> Self {
        Self {
            journey: detail.journey.into(),
            stops: detail
                .stops
                .into_iter()
                .map(|s| StopResponse::new(s.stop, s.place.map(Into::into)))
                .collect(),
            route: detail.route,
        }
    }
}

async fn list(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<JourneyResponse>>> {
    let journeys = state
        .journey_service
        .list_published(page.limit(), page.offset)
        .await?;
    Ok(ApiResponse::ok(journeys.into_iter().map(Into::into).collect()))
}

async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<ApiResponse<JourneyDetailResponse>> {
    let detail = state.journey_service.get_by_slug(&slug).await?;
    Ok(ApiResponse::ok(detail.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{slug}", get(show))
}
