//! Community place suggestion endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use neighborly_common::{AppError, AppResult};
use neighborly_core::CreateSuggestionInput;
use neighborly_db::entities::{ModerationStatus, community_place_suggestion};
use serde::{Deserialize, Serialize};

use super::{Pagination, require_feature};
use crate::{extractors::ClientIp, middleware::AppState, response::ApiResponse};

/// Public view of a suggestion. The submitter's email stays private.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    pub id: String,
    pub place_name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub submitter_name: Option<String>,
    pub status: ModerationStatus,
    pub votes: i32,
    pub created_at: String,
}

impl From<community_place_suggestion::Model> for SuggestionResponse {
    fn from(s: community_place_suggestion::Model) -> Self {
        Self {
            id: s.id,
            place_name: s.place_name,
            description: s.description,
            category: s.category,
            latitude: s.latitude,
            longitude: s.longitude,
            submitter_name: s.submitter_name,
            status: s.status,
            votes: s.votes,
            created_at: s.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// Public listing: pending (open for votes) by default, or approved.
async fn list(
    State(state): State<AppState>,
    Query(filter): Query<StatusQuery>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<SuggestionResponse>>> {
    require_feature(state.features.community_suggestions, "Community suggestions")?;

    let status = match filter.status.as_deref() {
        None | Some("pending") => ModerationStatus::Pending,
        Some("approved") => ModerationStatus::Approved,
        Some(other) => {
            return Err(AppError::Validation(format!("Unknown status: {other}")));
        }
    };
    let suggestions = state
        .suggestion_service
        .list(Some(status), page.limit(), page.offset)
        .await?;
    Ok(ApiResponse::ok(suggestions.into_iter().map(Into::into).collect()))
}

async fn submit(
    State(state): State<AppState>,
    Json(input): Json<CreateSuggestionInput>,
) -> AppResult<ApiResponse<SuggestionResponse>> {
    require_feature(state.features.community_suggestions, "Community suggestions")?;
    let suggestion = state.suggestion_service.submit(input).await?;
    Ok(ApiResponse::created(suggestion.into()))
}

async fn vote(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SuggestionResponse>> {
    require_feature(state.features.community_suggestions, "Community suggestions")?;
    let suggestion = state.suggestion_service.vote(&id, &ip).await?;
    Ok(ApiResponse::ok(suggestion.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(submit))
        .route("/{id}/vote", post(vote))
}
