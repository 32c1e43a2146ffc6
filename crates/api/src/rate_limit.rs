//! API-wide rate limiting middleware.
//!
//! Every request is counted against [`policies::STANDARD`] per client IP.
//! Endpoint-specific limits (comments, ratings, suggestions, votes) are
//! enforced by the services themselves.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use neighborly_core::rate_limit::{RateDecision, RatePolicy, policies};

use crate::extractors::client_ip;
use crate::middleware::AppState;

/// Rate limit error response.
#[derive(Debug)]
pub struct RateLimitError {
    pub message: &'static str,
    pub limit: u64,
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
            "code": "RATE_LIMITED",
            "retryAfter": self.retry_after,
        });

        let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();
        let headers = response.headers_mut();
        headers.insert("Retry-After", HeaderValue::from(self.retry_after));
        headers.insert("X-RateLimit-Limit", HeaderValue::from(self.limit));
        headers.insert("X-RateLimit-Remaining", HeaderValue::from(0u64));
        headers.insert("X-RateLimit-Reset", HeaderValue::from(self.retry_after));
        response
    }
}

fn apply_headers(response: &mut Response, decision: &RateDecision) {
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(decision.limit));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from(decision.remaining));
    headers.insert("X-RateLimit-Reset", HeaderValue::from(decision.reset_in_secs));
}

/// Rate limiting middleware.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, RateLimitError> {
    rate_limit_with_policy(state, req, next, &policies::STANDARD).await
}

async fn rate_limit_with_policy(
    state: AppState,
    req: Request<Body>,
    next: Next,
    policy: &RatePolicy,
) -> Result<Response, RateLimitError> {
    let key = client_ip(req.headers(), req.extensions())
        .map_or_else(|| "unknown".to_string(), |ip| ip.to_string());

    match state.limiter.check(&key, policy).await {
        Ok(decision) if decision.allowed => {
            let mut response = next.run(req).await;
            apply_headers(&mut response, &decision);
            Ok(response)
        }
        Ok(decision) => Err(RateLimitError {
            message: policy.message,
            limit: decision.limit,
            retry_after: decision.reset_in_secs,
        }),
        Err(e) => {
            // Counter store unavailable: serve the request unthrottled.
            tracing::warn!(error = %e, "Rate limit check failed, allowing request");
            Ok(next.run(req).await)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_carries_retry_headers() {
        let response = RateLimitError {
            message: policies::STANDARD.message,
            limit: 300,
            retry_after: 42,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["Retry-After"], "42");
        assert_eq!(response.headers()["X-RateLimit-Limit"], "300");
        assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");
    }
}
