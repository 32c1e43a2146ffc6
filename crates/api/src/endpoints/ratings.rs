//! Rating endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use neighborly_common::AppResult;
use neighborly_core::{RatingSummary, SubmitRatingInput};

use super::comments::EntityQuery;
use crate::{extractors::ClientIp, middleware::AppState, response::ApiResponse};

async fn summary(
    State(state): State<AppState>,
    Query(query): Query<EntityQuery>,
) -> AppResult<ApiResponse<RatingSummary>> {
    let summary = state.rating_service.summary(query.entity()?).await?;
    Ok(ApiResponse::ok(summary))
}

async fn submit(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(input): Json<SubmitRatingInput>,
) -> AppResult<ApiResponse<RatingSummary>> {
    let summary = state.rating_service.submit(input, &ip).await?;
    Ok(ApiResponse::created(summary))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(summary).post(submit))
}
