//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use neighborly_common::AppResult;
use neighborly_core::{CommentThread, CreateCommentInput, EntityRef};
use neighborly_db::entities::comment;
use serde::{Deserialize, Serialize};

use super::require_feature;
use crate::{extractors::ClientIp, middleware::AppState, response::ApiResponse};

/// Public view of a comment. The author's email and IP stay private.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub entity_type: String,
    pub entity_id: String,
    pub parent_id: Option<String>,
    pub author_name: String,
    pub content: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            entity_type: c.entity_type.as_str().to_string(),
            entity_id: c.entity_id,
            parent_id: c.parent_id,
            author_name: c.author_name,
            content: c.content,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Top-level comment with its replies.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub replies: Vec<CommentResponse>,
}

impl From<CommentThread> for CommentThreadResponse {
    fn from(t: CommentThread) -> Self {
        Self {
            comment: t.comment.into(),
            replies: t.replies.into_iter().map(Into::into).collect(),
        }
    }
}

/// Entity selector shared by comment and rating reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityQuery {
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: String,
}

impl EntityQuery {
    pub fn entity(&self) -> AppResult<EntityRef> {
        EntityRef::parse(&self.entity_type, &self.entity_id)
    }
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<EntityQuery>,
) -> AppResult<ApiResponse<Vec<CommentThreadResponse>>> {
    require_feature(state.features.comments, "Comments")?;
    let threads = state.comment_service.list_for(&query.entity()?).await?;
    Ok(ApiResponse::ok(threads.into_iter().map(Into::into).collect()))
}

async fn create(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<ApiResponse<CommentResponse>> {
    require_feature(state.features.comments, "Comments")?;
    let comment = state.comment_service.create(input, &ip).await?;
    Ok(ApiResponse::created(comment.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(create))
}
