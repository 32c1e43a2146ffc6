//! Request extractors.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, Extensions, header, request::Parts},
};
use axum_extra::extract::CookieJar;
use neighborly_common::AppError;

use crate::middleware::AppState;

/// Cookie carrying the admin token for browser sessions.
pub const ADMIN_COOKIE: &str = "admin_token";

/// Client IP from `X-Forwarded-For`, `X-Real-IP` or the socket, in that order.
pub fn client_ip(headers: &HeaderMap, extensions: &Extensions) -> Option<IpAddr> {
    if let Some(xff) = headers.get("x-forwarded-for")
        && let Ok(xff) = xff.to_str()
        && let Some(first) = xff.split(',').next()
        && let Ok(ip) = first.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(real_ip) = real_ip.to_str()
        && let Ok(ip) = real_ip.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }

    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
}

/// Client IP as a rate-limit and history key. `"unknown"` when undeterminable.
#[derive(Debug, Clone)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            client_ip(&parts.headers, &parts.extensions)
                .map_or_else(|| "unknown".to_string(), |ip| ip.to_string()),
        ))
    }
}

/// Proof that the request carried the admin secret, as a bearer token or
/// in the `admin_token` cookie.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .map(str::to_string);
        let token = bearer.or_else(|| {
            CookieJar::from_headers(&parts.headers)
                .get(ADMIN_COOKIE)
                .map(|c| c.value().to_string())
        });

        match token {
            Some(token) if state.is_admin_token(&token) => Ok(Self),
            Some(_) => {
                tracing::warn!("Rejected admin request with a wrong token");
                Err(AppError::Unauthorized)
            }
            None => Err(AppError::Unauthorized),
        }
    }
}

/// Origin of the calling page, taken from `Origin` or else `Referer`.
fn request_origin(headers: &HeaderMap) -> Option<String> {
    if let Some(origin) = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()) {
        return Some(origin.to_string());
    }
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let url = url::Url::parse(referer).ok()?;
    Some(url.origin().ascii_serialization())
}

/// The request comes from an allow-listed origin. Guards the vendor proxy.
#[derive(Debug, Clone)]
pub struct AllowedOrigin(pub String);

impl FromRequestParts<AppState> for AllowedOrigin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match request_origin(&parts.headers) {
            Some(origin) if state.is_allowed_origin(&origin) => Ok(Self(origin)),
            origin => {
                tracing::debug!(origin = ?origin, "Vendor proxy call from disallowed origin");
                Err(AppError::Forbidden("Origin not allowed".to_string()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        let ip = client_ip(&headers, &Extensions::new()).unwrap();
        assert_eq!(ip.to_string(), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_socket() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(
            client_ip(&headers, &Extensions::new()).unwrap().to_string(),
            "198.51.100.2"
        );

        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));
        assert_eq!(
            client_ip(&HeaderMap::new(), &extensions).unwrap().to_string(),
            "127.0.0.1"
        );
        assert!(client_ip(&HeaderMap::new(), &Extensions::new()).is_none());
    }

    #[test]
    fn test_request_origin_from_referer() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::REFERER,
            HeaderValue::from_static("https://neighborly.example:8443/map?x=1"),
        );
        assert_eq!(
            request_origin(&headers).as_deref(),
            Some("https://neighborly.example:8443")
        );

        headers.insert(header::ORIGIN, HeaderValue::from_static("https://other.example"));
        assert_eq!(request_origin(&headers).as_deref(), Some("https://other.example"));
    }
}
