//! Application state shared by every handler.

use std::sync::Arc;
use std::time::Duration;

use neighborly_common::config::FeatureFlags;
use neighborly_common::{AppError, AppResult, Config, SharedClock};
use neighborly_core::rate_limit::FixedWindowLimiter;
use neighborly_core::weather::WeatherProvider;
use neighborly_core::{
    CommentService, EntityDirectory, EventService, JourneyService, PlaceService, PlacesClient, RatingService,
    RecommendationService, SearchService, SiteSettingsService, SuggestionService, WeatherService,
};
use neighborly_db::repositories::{
    CommentRepository, EventRepository, JourneyRepository, PlaceRepository, RatingRepository,
    SiteSettingRepository, SuggestionRepository,
};
use sea_orm::DatabaseConnection;
use sha2::{Digest, Sha256};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub place_service: PlaceService,
    pub journey_service: JourneyService,
    pub comment_service: CommentService,
    pub rating_service: RatingService,
    pub suggestion_service: SuggestionService,
    pub event_service: EventService,
    pub site_settings_service: SiteSettingsService,
    pub weather_service: WeatherService,
    pub recommendation_service: RecommendationService,
    pub search_service: SearchService,
    pub places_client: PlacesClient,
    pub limiter: FixedWindowLimiter,
    pub features: FeatureFlags,
    /// Origins allowed to use the `/google` proxy.
    pub allowed_origins: Arc<Vec<String>>,
    admin_secret_digest: Arc<[u8; 32]>,
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &Config,
        limiter: FixedWindowLimiter,
        weather_providers: Vec<Arc<dyn WeatherProvider>>,
        clock: SharedClock,
    ) -> AppResult<Self> {
        if config.admin.secret.trim().is_empty() {
            return Err(AppError::Config("admin.secret must not be empty".to_string()));
        }

        let place_repo = PlaceRepository::new(Arc::clone(&db));
        let journey_repo = JourneyRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let rating_repo = RatingRepository::new(Arc::clone(&db));
        let suggestion_repo = SuggestionRepository::new(Arc::clone(&db));
        let event_repo = EventRepository::new(Arc::clone(&db));
        let setting_repo = SiteSettingRepository::new(db);

        let place_service = PlaceService::new(place_repo.clone(), config.places.whitelist.clone());
        let entities =
            EntityDirectory::new(place_repo.clone(), journey_repo.clone(), event_repo.clone());
        let journey_service = JourneyService::new(journey_repo, place_repo.clone());
        let weather_service =
            WeatherService::new(weather_providers, &config.weather, clock.clone());
        let recommendation_service = RecommendationService::new(
            place_service.clone(),
            journey_service.clone(),
            weather_service.clone(),
        );
        let search_service =
            SearchService::new(place_service.clone(), journey_service.clone(), clock.clone());

        Ok(Self {
            comment_service: CommentService::new(comment_repo, entities.clone(), limiter.clone()),
            rating_service: RatingService::new(rating_repo, place_repo, entities, limiter.clone()),
            suggestion_service: SuggestionService::new(suggestion_repo, limiter.clone()),
            event_service: EventService::new(event_repo, clock),
            site_settings_service: SiteSettingsService::new(setting_repo),
            places_client: PlacesClient::new(
                config.providers.google_places_api_key.clone(),
                Duration::from_secs(config.providers.request_timeout_secs),
            ),
            place_service,
            journey_service,
            weather_service,
            recommendation_service,
            search_service,
            limiter,
            features: config.features.clone(),
            allowed_origins: Arc::new(
                config
                    .server
                    .allowed_origins
                    .iter()
                    .map(|o| o.trim_end_matches('/').to_string())
                    .collect(),
            ),
            admin_secret_digest: Arc::new(digest(&config.admin.secret)),
        })
    }

    /// Whether `token` is the admin secret.
    ///
    /// Digests are compared so the comparison time does not depend on
    /// how much of the secret matched.
    #[must_use]
    pub fn is_admin_token(&self, token: &str) -> bool {
        digest(token) == *self.admin_secret_digest
    }

    /// Whether `origin` (scheme, host and port) may call the vendor proxy.
    #[must_use]
    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins.iter().any(|o| o == origin)
    }
}
