//! HTTP API layer for neighborly.
//!
//! - **Endpoints**: public JSON routes plus the `/admin` surface
//! - **Extractors**: client IP, admin token, vendor-proxy origin check
//! - **Middleware**: application state and API-wide rate limiting
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
pub use rate_limit::rate_limit_middleware;
