//! Neighborly server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use fred::prelude::*;
use neighborly_api::{AppState, rate_limit_middleware, router as api_router};
use neighborly_common::{Config, SharedClock, SystemClock};
use neighborly_core::rate_limit::{FixedWindowLimiter, MemoryRateLimitStore, RedisRateLimitStore};
use neighborly_core::weather::{OpenWeatherProvider, WeatherApiProvider, WeatherProvider};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);
const WEATHER_PURGE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Weather providers in the order they are tried. Missing keys skip a provider.
fn weather_providers(config: &Config) -> Vec<Arc<dyn WeatherProvider>> {
    let timeout = Duration::from_secs(config.providers.request_timeout_secs);
    let mut providers: Vec<Arc<dyn WeatherProvider>> = Vec::new();

    if let Some(key) = config.providers.openweather_api_key.clone() {
        providers.push(Arc::new(OpenWeatherProvider::new(key, timeout)));
    }
    if let Some(key) = config.providers.weatherapi_key.clone() {
        providers.push(Arc::new(WeatherApiProvider::new(key, timeout)));
    }

    if providers.is_empty() {
        warn!("No weather provider configured, serving seasonal estimates only");
    }
    providers
}

/// Rate limiter backed by Redis when configured, else by process memory.
async fn rate_limiter(
    config: &Config,
    clock: SharedClock,
) -> Result<FixedWindowLimiter, Box<dyn std::error::Error>> {
    if let Some(redis) = &config.redis {
        info!("Connecting to Redis...");
        let fred_config = fred::types::config::Config::from_url(&redis.url)?;
        let fred_client = fred::clients::Client::new(fred_config, None, None, None);
        fred_client.connect();
        fred_client.wait_for_connect().await?;
        info!("Connected to Redis for distributed rate limiting");

        let store = RedisRateLimitStore::new(Arc::new(fred_client), redis.prefix.clone());
        return Ok(FixedWindowLimiter::new(Arc::new(store)));
    }

    info!("Redis not configured, keeping rate-limit counters in memory");
    let store = MemoryRateLimitStore::new(clock);
    let cleanup_store = store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = cleanup_store.cleanup().await;
            if removed > 0 {
                tracing::debug!(removed, "Dropped expired rate-limit windows");
            }
        }
    });
    Ok(FixedWindowLimiter::new(Arc::new(store)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neighborly=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting neighborly server...");

    let config = Config::load()?;

    let db = neighborly_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    neighborly_db::migrate(&db).await?;
    info!("Migrations completed");

    let clock: SharedClock = Arc::new(SystemClock);
    let limiter = rate_limiter(&config, Arc::clone(&clock)).await?;

    let state = AppState::new(
        Arc::new(db),
        &config,
        limiter,
        weather_providers(&config),
        clock,
    )?;

    let weather_service = state.weather_service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(WEATHER_PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let removed = weather_service.purge_cache();
            if removed > 0 {
                tracing::debug!(removed, "Purged expired weather snapshots");
            }
        }
    });

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
