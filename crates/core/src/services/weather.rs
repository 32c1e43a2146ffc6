//! Weather service: provider chain, seasonal fallback and response cache.

use std::sync::Arc;

use chrono::{Datelike, Duration, Timelike};
use chrono_tz::Asia::Kolkata;
use neighborly_common::config::WeatherConfig;
use neighborly_common::{AppResult, SharedClock};

use crate::cache::TtlCache;
use crate::geo::Coordinate;
use crate::validation::require_coordinate;
use crate::weather::{SeasonalFallback, WeatherProvider, WeatherSnapshot, WeatherSource};

/// Current weather for a coordinate.
///
/// Providers are tried in order; when all fail the seasonal estimate for the
/// current month is returned, so lookups never fail. Live results are cached
/// per rounded coordinate.
#[derive(Clone)]
pub struct WeatherService {
    providers: Vec<Arc<dyn WeatherProvider>>,
    fallback: SeasonalFallback,
    cache: TtlCache<String, WeatherSnapshot>,
    ttl: Duration,
    precision: usize,
    clock: SharedClock,
}

impl WeatherService {
    /// Create a weather service. `providers` are tried first to last.
    #[must_use]
    pub fn new(
        providers: Vec<Arc<dyn WeatherProvider>>,
        config: &WeatherConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            providers,
            fallback: SeasonalFallback,
            cache: TtlCache::new(clock.clone()),
            ttl: Duration::seconds(i64::try_from(config.cache_ttl_secs).unwrap_or(i64::MAX)),
            precision: config.coordinate_precision as usize,
            clock,
        }
    }

    /// Cache key for a coordinate, e.g. `weather:12.97:77.64`.
    #[must_use]
    pub fn cache_key(&self, at: Coordinate) -> String {
        let p = self.precision;
        format!("weather:{:.p$}:{:.p$}", at.lat, at.lng)
    }

    /// Validate raw query values, then look up the weather there.
    pub async fn current_at(&self, lat: Option<f64>, lng: Option<f64>) -> AppResult<WeatherSnapshot> {
        let at = require_coordinate(lat, lng)?;
        Ok(self.current(at).await)
    }

    /// Weather at `at`, from cache when fresh.
    pub async fn current(&self, at: Coordinate) -> WeatherSnapshot {
        let key = self.cache_key(at);
        if let Some(mut cached) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Weather cache hit");
            cached.source = WeatherSource::Cache;
            return cached;
        }
        tracing::debug!(key = %key, "Weather cache miss");

        let now = self.clock.now();
        let local = now.with_timezone(&Kolkata);

        for provider in &self.providers {
            match provider.fetch(at).await {
                Ok(reading) => {
                    let snapshot =
                        WeatherSnapshot::from_reading(reading, local.hour(), provider.source(), now);
                    self.cache.set(key, snapshot.clone(), self.ttl);
                    return snapshot;
                }
                Err(e) => {
                    tracing::warn!(provider = ?provider.source(), error = %e, "Weather provider failed");
                }
            }
        }

        tracing::warn!(month = local.month(), "All weather providers failed, using seasonal estimate");
        WeatherSnapshot::from_reading(
            self.fallback.estimate(local.month()),
            local.hour(),
            WeatherSource::Fallback,
            now,
        )
    }

    /// Drop expired cache entries. Returns how many were removed.
    pub fn purge_cache(&self) -> usize {
        self.cache.purge_expired()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::weather::{WeatherCondition, WeatherReading};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use neighborly_common::{AppError, ManualClock};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Stub {
        source: WeatherSource,
        reading: Option<WeatherReading>,
        calls: AtomicUsize,
    }

    impl Stub {
        fn ok(source: WeatherSource, temperature: f64) -> Arc<Self> {
            Arc::new(Self {
                source,
                reading: Some(WeatherReading {
                    temperature,
                    humidity: 50.0,
                    rain_probability: 10.0,
                    description: "clear sky".to_string(),
                }),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(source: WeatherSource) -> Arc<Self> {
            Arc::new(Self {
                source,
                reading: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl WeatherProvider for Stub {
        fn source(&self) -> WeatherSource {
            self.source
        }

        async fn fetch(&self, _at: Coordinate) -> AppResult<WeatherReading> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reading
                .clone()
                .ok_or_else(|| AppError::ExternalService("down".to_string()))
        }
    }

    fn clock() -> ManualClock {
        // 10:00 IST on 15 July.
        ManualClock::new(Utc.with_ymd_and_hms(2025, 7, 15, 4, 30, 0).unwrap())
    }

    fn service(providers: Vec<Arc<Stub>>, clock: &ManualClock) -> WeatherService {
        let providers = providers
            .into_iter()
            .map(|p| p as Arc<dyn WeatherProvider>)
            .collect();
        WeatherService::new(providers, &WeatherConfig::default(), Arc::new(clock.clone()))
    }

    const HERE: Coordinate = Coordinate::new(12.9716, 77.6412);

    #[tokio::test]
    async fn test_primary_wins() {
        let clock = clock();
        let primary = Stub::ok(WeatherSource::OpenWeather, 26.0);
        let secondary = Stub::ok(WeatherSource::WeatherApi, 35.0);
        let svc = service(vec![primary.clone(), secondary.clone()], &clock);

        let snap = svc.current(HERE).await;
        assert_eq!(snap.source, WeatherSource::OpenWeather);
        assert_eq!(snap.condition, WeatherCondition::Pleasant);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_secondary() {
        let clock = clock();
        let svc = service(
            vec![
                Stub::failing(WeatherSource::OpenWeather),
                Stub::ok(WeatherSource::WeatherApi, 35.0),
            ],
            &clock,
        );

        let snap = svc.current(HERE).await;
        assert_eq!(snap.source, WeatherSource::WeatherApi);
        assert_eq!(snap.condition, WeatherCondition::Hot);
    }

    #[tokio::test]
    async fn test_seasonal_fallback_when_all_fail() {
        let clock = clock();
        let svc = service(
            vec![
                Stub::failing(WeatherSource::OpenWeather),
                Stub::failing(WeatherSource::WeatherApi),
            ],
            &clock,
        );

        let snap = svc.current(HERE).await;
        assert_eq!(snap.source, WeatherSource::Fallback);
        assert_eq!(snap.temperature, SeasonalFallback.estimate(7).temperature);
    }

    #[tokio::test]
    async fn test_cache_hit_then_expiry() {
        let clock = clock();
        let primary = Stub::ok(WeatherSource::OpenWeather, 26.0);
        let svc = service(vec![primary.clone()], &clock);

        let first = svc.current(HERE).await;
        let second = svc.current(Coordinate::new(12.9749, 77.6398)).await;
        assert_eq!(second.source, WeatherSource::Cache);
        assert_eq!(second.temperature, first.temperature);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::minutes(31));
        let third = svc.current(HERE).await;
        assert_eq!(third.source, WeatherSource::OpenWeather);
        assert_eq!(primary.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fallback_is_not_cached() {
        let clock = clock();
        let flaky = Stub::failing(WeatherSource::OpenWeather);
        let svc = service(vec![flaky.clone()], &clock);

        svc.current(HERE).await;
        svc.current(HERE).await;
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_current_at_rejects_outside_bounds() {
        let clock = clock();
        let svc = service(vec![], &clock);
        match svc.current_at(Some(10.0), Some(77.615)).await {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "Coordinates must be within Indiranagar boundaries");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_cache_key_rounds_to_two_decimals() {
        let clock = clock();
        let svc = service(vec![], &clock);
        assert_eq!(svc.cache_key(HERE), "weather:12.97:77.64");
    }
}
