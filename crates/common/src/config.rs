//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration. Rate-limit counters stay in process memory when absent.
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    /// Admin access configuration.
    pub admin: AdminConfig,
    /// Third-party API credentials.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Weather cache tuning.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Feature flags.
    #[serde(default)]
    pub features: FeatureFlags,
    /// Public place visibility.
    #[serde(default)]
    pub places: PlacesConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this deployment.
    pub url: String,
    /// Origins allowed to call the mapping-vendor proxy endpoints.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix for all Redis keys.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
}

/// Admin configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Shared secret accepted as a bearer token or `admin_token` cookie.
    pub secret: String,
}

/// Vendor API keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvidersConfig {
    /// Google Places API key.
    #[serde(default)]
    pub google_places_api_key: Option<String>,
    /// `OpenWeatherMap` API key (primary weather provider).
    #[serde(default)]
    pub openweather_api_key: Option<String>,
    /// `WeatherAPI.com` key (secondary weather provider).
    #[serde(default)]
    pub weatherapi_key: Option<String>,
    /// Timeout for outbound vendor requests, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Weather cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    /// How long a snapshot is served from cache.
    #[serde(default = "default_weather_ttl")]
    pub cache_ttl_secs: u64,
    /// Decimal places kept when rounding coordinates into a cache key.
    #[serde(default = "default_weather_precision")]
    pub coordinate_precision: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_weather_ttl(),
            coordinate_precision: default_weather_precision(),
        }
    }
}

/// Feature flags, all read once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    /// Serve weather-aware recommendations.
    #[serde(default = "default_true")]
    pub weather_recommendations: bool,
    /// Accept community place suggestions.
    #[serde(default = "default_true")]
    pub community_suggestions: bool,
    /// Accept comments.
    #[serde(default = "default_true")]
    pub comments: bool,
    /// Serve discovered events.
    #[serde(default = "default_true")]
    pub event_discovery: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            weather_recommendations: true,
            community_suggestions: true,
            comments: true,
            event_discovery: true,
        }
    }
}

/// Place visibility configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlacesConfig {
    /// Names of places approved for the public API. Empty means every place is visible.
    #[serde(default)]
    pub whitelist: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_redis_prefix() -> String {
    "neighborly".to_string()
}

const fn default_request_timeout() -> u64 {
    10
}

const fn default_weather_ttl() -> u64 {
    30 * 60
}

const fn default_weather_precision() -> u32 {
    2
}

const fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, exported into the process environment)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `NEIGHBORLY_ENV`)
    /// 4. Environment variables with `NEIGHBORLY__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("NEIGHBORLY_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("NEIGHBORLY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.allowed_origins")
                    .with_list_parse_key("places.whitelist")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("NEIGHBORLY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
