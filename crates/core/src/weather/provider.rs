//! Network weather providers.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{WeatherReading, WeatherSource};
use crate::geo::Coordinate;
use neighborly_common::{AppError, AppResult};

/// A remote source of current weather.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Label stored on snapshots from this provider.
    fn source(&self) -> WeatherSource;

    /// Fetch the current reading at `at`.
    async fn fetch(&self, at: Coordinate) -> AppResult<WeatherReading>;
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// `OpenWeatherMap` 3-hour forecast, first slot.
#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl OpenWeatherProvider {
    #[must_use]
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: "https://api.openweathermap.org".to_string(),
            http_client: http_client(timeout),
        }
    }

    /// Point at a different host.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Deserialize)]
struct OwForecast {
    list: Vec<OwSlot>,
}

#[derive(Deserialize)]
struct OwSlot {
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    /// Probability of precipitation, 0-1.
    #[serde(default)]
    pop: f64,
}

#[derive(Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
}

#[derive(Deserialize)]
struct OwWeather {
    description: String,
}

fn openweather_reading(body: OwForecast) -> AppResult<WeatherReading> {
    let slot = body
        .list
        .into_iter()
        .next()
        .ok_or_else(|| AppError::ExternalService("OpenWeather returned no data".to_string()))?;

    Ok(WeatherReading {
        temperature: slot.main.temp,
        humidity: slot.main.humidity,
        rain_probability: (slot.pop * 100.0).clamp(0.0, 100.0),
        description: slot
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .unwrap_or_default(),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn source(&self) -> WeatherSource {
        WeatherSource::OpenWeather
    }

    async fn fetch(&self, at: Coordinate) -> AppResult<WeatherReading> {
        let response = self
            .http_client
            .get(format!("{}/data/2.5/forecast", self.base_url))
            .query(&[
                ("lat", at.lat.to_string()),
                ("lon", at.lng.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
                ("cnt", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("OpenWeather request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "OpenWeather API error: {}",
                response.status()
            )));
        }

        let body: OwForecast = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("OpenWeather parse failed: {e}")))?;

        openweather_reading(body)
    }
}

/// `WeatherAPI.com` one-day forecast.
#[derive(Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl WeatherApiProvider {
    #[must_use]
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self {
            api_key,
            base_url: "https://api.weatherapi.com".to_string(),
            http_client: http_client(timeout),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Deserialize)]
struct WaResponse {
    current: WaCurrent,
    forecast: Option<WaForecast>,
}

#[derive(Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: f64,
    condition: WaCondition,
}

#[derive(Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Deserialize)]
struct WaForecastDay {
    day: WaDay,
}

#[derive(Deserialize)]
struct WaDay {
    #[serde(default)]
    daily_chance_of_rain: f64,
}

fn weatherapi_reading(body: WaResponse) -> WeatherReading {
    let rain_probability = body
        .forecast
        .and_then(|f| f.forecastday.into_iter().next())
        .map_or(0.0, |d| d.day.daily_chance_of_rain);

    WeatherReading {
        temperature: body.current.temp_c,
        humidity: body.current.humidity,
        rain_probability: rain_probability.clamp(0.0, 100.0),
        description: body.current.condition.text,
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn source(&self) -> WeatherSource {
        WeatherSource::WeatherApi
    }

    async fn fetch(&self, at: Coordinate) -> AppResult<WeatherReading> {
        let response = self
            .http_client
            .get(format!("{}/v1/forecast.json", self.base_url))
            .query(&[
                ("key", self.api_key.clone()),
                ("q", format!("{},{}", at.lat, at.lng)),
                ("days", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("WeatherAPI request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "WeatherAPI error: {}",
                response.status()
            )));
        }

        let body: WaResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("WeatherAPI parse failed: {e}")))?;

        Ok(weatherapi_reading(body))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_openweather_first_slot() {
        let body: OwForecast = serde_json::from_value(json!({
            "list": [
                {"main": {"temp": 31.5, "humidity": 40.0}, "weather": [{"description": "clear sky"}], "pop": 0.25},
                {"main": {"temp": 20.0, "humidity": 90.0}, "weather": [], "pop": 0.9}
            ]
        }))
        .unwrap();

        let reading = openweather_reading(body).unwrap();
        assert_eq!(reading.temperature, 31.5);
        assert_eq!(reading.rain_probability, 25.0);
        assert_eq!(reading.description, "clear sky");
    }

    #[test]
    fn test_openweather_empty_list_is_error() {
        let body: OwForecast = serde_json::from_value(json!({"list": []})).unwrap();
        assert!(matches!(
            openweather_reading(body),
            Err(AppError::ExternalService(_))
        ));
    }

    #[test]
    fn test_weatherapi_without_forecast_has_no_rain() {
        let body: WaResponse = serde_json::from_value(json!({
            "current": {"temp_c": 24.0, "humidity": 70.0, "condition": {"text": "Partly cloudy"}}
        }))
        .unwrap();

        let reading = weatherapi_reading(body);
        assert_eq!(reading.rain_probability, 0.0);
        assert_eq!(reading.description, "Partly cloudy");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_external_error() {
        let provider = OpenWeatherProvider::new("key".to_string(), Duration::from_secs(2))
            .with_base_url("http://127.0.0.1:9");

        let result = provider.fetch(Coordinate::new(12.97, 77.64)).await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }
}
