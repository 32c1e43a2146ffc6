//! Site setting endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use neighborly_common::AppResult;
use neighborly_db::entities::site_setting;
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Setting response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingResponse {
    pub key: String,
    pub value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<site_setting::Model> for SettingResponse {
    fn from(s: site_setting::Model) -> Self {
        Self {
            key: s.key,
            value: s.value,
            updated_at: Some(s.updated_at.to_rfc3339()),
        }
    }
}

async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<SettingResponse>> {
    let value = state.site_settings_service.get(&key).await?;
    Ok(ApiResponse::ok(SettingResponse {
        key,
        value,
        updated_at: None,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{key}", get(show))
}
