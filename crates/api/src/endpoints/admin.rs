//! Admin endpoints. Every handler takes [`AdminAuth`].

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use neighborly_common::AppResult;
use neighborly_core::admin::ListFilters;
use neighborly_core::{
    BulkPlaceInput, CreateEventSourceInput, CreatePlaceInput, IngestEventInput, IngestOutcome,
    JourneyInput, ModerateSuggestionInput, UpdatePlaceInput,
};
use neighborly_db::entities::{ModerationStatus, comment, community_place_suggestion};
use serde::{Deserialize, Serialize};

use super::{
    Pagination,
    comments::CommentResponse,
    events::{AdminEventResponse, EventSourceResponse},
    journeys::{JourneyDetailResponse, JourneyResponse},
    places::PlaceResponse,
    settings::SettingResponse,
    suggestions::SuggestionResponse,
};
use crate::{
    extractors::AdminAuth,
    middleware::AppState,
    response::{ApiResponse, ok},
};

// ==================== Request/Response Types ====================

/// Admin list filters as sent by the dashboard.
#[derive(Debug, Deserialize)]
pub struct PlaceFilterQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Rows touched by a bulk action.
#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub affected: u64,
}

/// Comment with the fields only moderators see.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCommentResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub author_email: Option<String>,
    pub submitter_ip: Option<String>,
    pub is_approved: bool,
}

impl From<comment::Model> for AdminCommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            author_email: c.author_email.clone(),
            submitter_ip: c.submitter_ip.clone(),
            is_approved: c.is_approved,
            comment: c.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetApprovedRequest {
    pub is_approved: bool,
}

/// Suggestion with submitter contact and moderation notes.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSuggestionResponse {
    #[serde(flatten)]
    pub suggestion: SuggestionResponse,
    pub submitter_email: String,
    pub admin_notes: Option<String>,
    pub reviewed_at: Option<String>,
}

impl From<community_place_suggestion::Model> for AdminSuggestionResponse {
    fn from(s: community_place_suggestion::Model) -> Self {
        Self {
            submitter_email: s.submitter_email.clone(),
            admin_notes: s.admin_notes.clone(),
            reviewed_at: s.reviewed_at.map(|dt| dt.to_rfc3339()),
            suggestion: s.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusFilter {
    pub status: Option<ModerationStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub removed: usize,
}

#[derive(Debug, Deserialize)]
pub struct SetSettingRequest {
    pub value: serde_json::Value,
}

// ==================== Places ====================

async fn list_places(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<PlaceFilterQuery>,
) -> AppResult<ApiResponse<Vec<PlaceResponse>>> {
    let mut filters = ListFilters::default();
    filters.set_search(query.search);
    filters.set_category(query.category);
    filters.set_status(query.status);

    let places = state.place_service.list_filtered(&filters).await?;
    Ok(ApiResponse::ok(places.into_iter().map(Into::into).collect()))
}

async fn show_place(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<PlaceResponse>> {
    Ok(ApiResponse::ok(state.place_service.get(&id).await?.into()))
}

async fn create_place(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<CreatePlaceInput>,
) -> AppResult<ApiResponse<PlaceResponse>> {
    let place = state.place_service.create(input).await?;
    Ok(ApiResponse::created(place.into()))
}

async fn update_place(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePlaceInput>,
) -> AppResult<ApiResponse<PlaceResponse>> {
    let place = state.place_service.update(&id, input).await?;
    Ok(ApiResponse::ok(place.into()))
}

async fn delete_place(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.place_service.delete(&id).await?;
    Ok(ok())
}

async fn bulk_places(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<BulkPlaceInput>,
) -> AppResult<ApiResponse<BulkResponse>> {
    let affected = state.place_service.bulk(input).await?;
    Ok(ApiResponse::ok(BulkResponse { affected }))
}

// ==================== Journeys ====================

async fn list_journeys(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<JourneyResponse>>> {
    let journeys = state.journey_service.list_all().await?;
    Ok(ApiResponse::ok(journeys.into_iter().map(Into::into).collect()))
}

async fn create_journey(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<JourneyInput>,
) -> AppResult<ApiResponse<JourneyDetailResponse>> {
    let detail = state.journey_service.create(input).await?;
    Ok(ApiResponse::created(detail.into()))
}

async fn update_journey(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<JourneyInput>,
) -> AppResult<ApiResponse<JourneyDetailResponse>> {
    let detail = state.journey_service.update(&id, input).await?;
    Ok(ApiResponse::ok(detail.into()))
}

async fn delete_journey(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.journey_service.delete(&id).await?;
    Ok(ok())
}

// ==================== Comments ====================

async fn list_comments(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<AdminCommentResponse>>> {
    let comments = state
        .comment_service
        .list_recent(page.limit(), page.offset)
        .await?;
    Ok(ApiResponse::ok(comments.into_iter().map(Into::into).collect()))
}

async fn set_comment_approved(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetApprovedRequest>,
) -> AppResult<impl IntoResponse> {
    state.comment_service.set_approved(&id, req.is_approved).await?;
    Ok(ok())
}

async fn delete_comment(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.comment_service.delete(&id).await?;
    Ok(ok())
}

// ==================== Suggestions ====================

async fn list_suggestions(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<AdminSuggestionResponse>>> {
    let suggestions = state
        .suggestion_service
        .list(filter.status, page.limit(), page.offset)
        .await?;
    Ok(ApiResponse::ok(suggestions.into_iter().map(Into::into).collect()))
}

async fn moderate_suggestion(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ModerateSuggestionInput>,
) -> AppResult<ApiResponse<AdminSuggestionResponse>> {
    let suggestion = state.suggestion_service.moderate(&id, input).await?;
    Ok(ApiResponse::ok(suggestion.into()))
}

async fn delete_suggestion(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.suggestion_service.delete(&id).await?;
    Ok(ok())
}

// ==================== Events ====================

async fn list_events(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
    Query(page): Query<Pagination>,
) -> AppResult<ApiResponse<Vec<AdminEventResponse>>> {
    let events = state
        .event_service
        .list_by_status(
            filter.status.unwrap_or_default(),
            page.limit(),
            page.offset,
        )
        .await?;
    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

/// 201 for a new event, 200 when the source already sent it.
async fn ingest_event(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<IngestEventInput>,
) -> AppResult<ApiResponse<AdminEventResponse>> {
    Ok(match state.event_service.ingest(input).await? {
        IngestOutcome::Created(event) => ApiResponse::created(event.into()),
        IngestOutcome::Duplicate(event) => ApiResponse::ok(event.into()),
    })
}

async fn approve_event(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminEventResponse>> {
    Ok(ApiResponse::ok(state.event_service.approve(&id).await?.into()))
}

async fn reject_event(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AdminEventResponse>> {
    Ok(ApiResponse::ok(state.event_service.reject(&id).await?.into()))
}

async fn list_event_sources(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<EventSourceResponse>>> {
    let sources = state.event_service.list_sources().await?;
    Ok(ApiResponse::ok(sources.into_iter().map(Into::into).collect()))
}

async fn create_event_source(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateEventSourceInput>,
) -> AppResult<ApiResponse<EventSourceResponse>> {
    let source = state.event_service.create_source(input).await?;
    Ok(ApiResponse::created(source.into()))
}

async fn set_event_source_active(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetActiveRequest>,
) -> AppResult<impl IntoResponse> {
    state.event_service.set_source_active(&id, req.is_active).await?;
    Ok(ok())
}

// ==================== Settings ====================

async fn list_settings(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<SettingResponse>>> {
    let settings = state.site_settings_service.list().await?;
    Ok(ApiResponse::ok(settings.into_iter().map(Into::into).collect()))
}

async fn put_setting(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetSettingRequest>,
) -> AppResult<impl IntoResponse> {
    state.site_settings_service.set(&key, req.value).await?;
    Ok(ok())
}

async fn delete_setting(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.site_settings_service.delete(&key).await?;
    Ok(ok())
}

// ==================== Maintenance ====================

/// Drop expired weather cache entries.
async fn purge_weather_cache(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> ApiResponse<PurgeResponse> {
    ApiResponse::ok(PurgeResponse {
        removed: state.weather_service.purge_cache(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/places", get(list_places).post(create_place))
        .route("/places/bulk", post(bulk_places))
        .route(
            "/places/{id}",
            get(show_place).patch(update_place).delete(delete_place),
        )
        .route("/journeys", get(list_journeys).post(create_journey))
        .route("/journeys/{id}", put(update_journey).delete(delete_journey))
        .route("/comments", get(list_comments))
        .route(
            "/comments/{id}",
            patch(set_comment_approved).delete(delete_comment),
        )
        .route("/suggestions", get(list_suggestions))
        .route(
            "/suggestions/{id}",
            patch(moderate_suggestion).delete(delete_suggestion),
        )
        .route("/events", get(list_events).post(ingest_event))
        .route("/events/{id}/approve", post(approve_event))
        .route("/events/{id}/reject", post(reject_event))
        .route(
            "/event-sources",
            get(list_event_sources).post(create_event_source),
        )
        .route("/event-sources/{id}", patch(set_event_source_active))
        .route("/settings", get(list_settings))
        .route("/settings/{key}", put(put_setting).delete(delete_setting))
        .route("/weather/purge", post(purge_weather_cache))
}
