//! API endpoints.

mod admin;
mod comments;
mod events;
mod google;
mod journeys;
mod places;
mod ratings;
mod search;
mod settings;
mod suggestions;
mod weather;

use axum::Router;
use neighborly_common::{AppError, AppResult};
use serde::Deserialize;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/places", places::router())
        .nest("/journeys", journeys::router())
        .nest("/weather", weather::router())
        .nest("/recommendations", weather::recommendations_router())
        .nest("/search", search::router())
        .nest("/comments", comments::router())
        .nest("/ratings", ratings::router())
        .nest("/community-suggestions", suggestions::router())
        .nest("/events", events::router())
        .nest("/settings", settings::router())
        .nest("/google", google::router())
        .nest("/admin", admin::router())
}

/// `limit`/`offset` query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub offset: u64,
}

const fn default_limit() -> u64 {
    50
}

const MAX_PAGE: u64 = 200;

impl Pagination {
    /// Limit clamped to `1..=200`.
    pub fn limit(&self) -> u64 {
        self.limit.clamp(1, MAX_PAGE)
    }
}

/// 403 unless the feature is switched on.
pub(crate) fn require_feature(enabled: bool, feature: &str) -> AppResult<()> {
    if enabled {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("{feature} are disabled")))
    }
}

/// Raw `lat`/`lng` query values, parsed by hand so a malformed number gets
/// the JSON 400 body.
#[derive(Debug, Default, Deserialize)]
pub struct CoordinateQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl CoordinateQuery {
    /// Unparseable values become NaN and fail coordinate validation.
    pub fn values(&self) -> (Option<f64>, Option<f64>) {
        let parse = |raw: &Option<String>| {
            raw.as_deref()
                .map(|v| v.trim().parse::<f64>().unwrap_or(f64::NAN))
        };
        (parse(&self.lat), parse(&self.lng))
    }

    pub fn is_empty(&self) -> bool {
        self.lat.is_none() && self.lng.is_none()
    }
}
