//! Discovered event endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use neighborly_common::AppResult;
use neighborly_db::entities::{ModerationStatus, discovered_event, event_source};
use serde::{Deserialize, Serialize};

use super::require_feature;
use crate::{middleware::AppState, response::ApiResponse};

/// Event response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub venue_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub quality_score: i32,
    pub source_url: Option<String>,
}

impl From<discovered_event::Model> for EventResponse {
    fn from(e: discovered_event::Model) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            start_time: e.start_time.to_rfc3339(),
            end_time: e.end_time.to_rfc3339(),
            venue_name: e.venue_name,
            latitude: e.latitude,
            longitude: e.longitude,
            quality_score: e.quality_score,
            source_url: e.source_url,
        }
    }
}

/// Event with moderation fields, for admins.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEventResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub source_id: Option<String>,
    pub external_id: Option<String>,
    pub status: ModerationStatus,
    pub is_active: bool,
    pub created_at: String,
    pub reviewed_at: Option<String>,
}

impl From<discovered_event::Model> for AdminEventResponse {
    fn from(e: discovered_event::Model) -> Self {
        Self {
            source_id: e.source_id.clone(),
            external_id: e.external_id.clone(),
            status: e.status,
            is_active: e.is_active,
            created_at: e.created_at.to_rfc3339(),
            reviewed_at: e.reviewed_at.map(|dt| dt.to_rfc3339()),
            event: e.into(),
        }
    }
}

/// Event source response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSourceResponse {
    pub id: String,
    pub name: String,
    pub url: String,
    pub source_type: String,
    pub is_active: bool,
    pub last_fetched_at: Option<String>,
    pub created_at: String,
}

impl From<event_source::Model> for EventSourceResponse {
    fn from(s: event_source::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
            url: s.url,
            source_type: s.source_type,
            is_active: s.is_active,
            last_fetched_at: s.last_fetched_at.map(|dt| dt.to_rfc3339()),
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<u64>,
}

/// Approved events that have not ended, soonest first.
async fn upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    require_feature(state.features.event_discovery, "Events")?;
    let events = state.event_service.upcoming(query.limit).await?;
    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(upcoming))
}
