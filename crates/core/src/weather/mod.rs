//! Weather classification and weather-aware recommendations.

mod fallback;
mod provider;
mod recommend;

pub use fallback::SeasonalFallback;
pub use provider::{OpenWeatherProvider, WeatherApiProvider, WeatherProvider};
pub use recommend::{Scored, Suitability, recommend, score};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse weather label used to match places and journeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Rainy,
    Hot,
    Cloudy,
    Cool,
    Evening,
    Pleasant,
}

impl WeatherCondition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rainy => "rainy",
            Self::Hot => "hot",
            Self::Cloudy => "cloudy",
            Self::Cool => "cool",
            Self::Evening => "evening",
            Self::Pleasant => "pleasant",
        }
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeatherCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rainy" => Ok(Self::Rainy),
            "hot" => Ok(Self::Hot),
            "cloudy" => Ok(Self::Cloudy),
            "cool" => Ok(Self::Cool),
            "evening" => Ok(Self::Evening),
            "pleasant" => Ok(Self::Pleasant),
            other => Err(format!("unknown weather condition: {other}")),
        }
    }
}

/// Raw numbers from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, 0-100.
    pub humidity: f64,
    /// Chance of rain, 0-100.
    pub rain_probability: f64,
    pub description: String,
}

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSource {
    OpenWeather,
    WeatherApi,
    Fallback,
    Cache,
}

/// Classified weather at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub condition: WeatherCondition,
    pub temperature: f64,
    pub humidity: f64,
    pub rain_probability: f64,
    pub description: String,
    pub source: WeatherSource,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Classify `reading` at local `hour`.
    #[must_use]
    pub fn from_reading(
        reading: WeatherReading,
        hour: u32,
        source: WeatherSource,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            condition: classify(&reading, hour),
            temperature: reading.temperature,
            humidity: reading.humidity,
            rain_probability: reading.rain_probability,
            description: reading.description,
            source,
            fetched_at,
        }
    }
}

/// Label a reading. The first matching check wins:
/// rain >= 60%, then > 30 °C, then humidity >= 85%, then < 20 °C, then
/// 18:00-05:59, otherwise pleasant.
#[must_use]
pub fn classify(reading: &WeatherReading, hour: u32) -> WeatherCondition {
    if reading.rain_probability >= 60.0 {
        WeatherCondition::Rainy
    } else if reading.temperature > 30.0 {
        WeatherCondition::Hot
    } else if reading.humidity >= 85.0 {
        WeatherCondition::Cloudy
    } else if reading.temperature < 20.0 {
        WeatherCondition::Cool
    } else if !(6..18).contains(&hour) {
        WeatherCondition::Evening
    } else {
        WeatherCondition::Pleasant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f64, humidity: f64, rain_probability: f64) -> WeatherReading {
        WeatherReading {
            temperature,
            humidity,
            rain_probability,
            description: String::new(),
        }
    }

    #[test]
    fn test_rain_wins_over_heat() {
        assert_eq!(classify(&reading(34.0, 90.0, 80.0), 13), WeatherCondition::Rainy);
    }

    #[test]
    fn test_heat_checked_before_humidity() {
        assert_eq!(classify(&reading(33.0, 92.0, 10.0), 13), WeatherCondition::Hot);
    }

    #[test]
    fn test_cloudy_and_cool() {
        assert_eq!(classify(&reading(24.0, 88.0, 20.0), 13), WeatherCondition::Cloudy);
        assert_eq!(classify(&reading(17.0, 60.0, 20.0), 13), WeatherCondition::Cool);
    }

    #[test]
    fn test_evening_and_pleasant() {
        let mild = reading(24.0, 60.0, 10.0);
        assert_eq!(classify(&mild, 19), WeatherCondition::Evening);
        assert_eq!(classify(&mild, 5), WeatherCondition::Evening);
        assert_eq!(classify(&mild, 6), WeatherCondition::Pleasant);
        assert_eq!(classify(&mild, 17), WeatherCondition::Pleasant);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(classify(&reading(30.0, 60.0, 59.9), 12), WeatherCondition::Pleasant);
        assert_eq!(classify(&reading(25.0, 60.0, 60.0), 12), WeatherCondition::Rainy);
        assert_eq!(classify(&reading(20.0, 84.9, 0.0), 12), WeatherCondition::Pleasant);
    }

    #[test]
    fn test_condition_round_trips_through_text() {
        for c in [
            WeatherCondition::Rainy,
            WeatherCondition::Hot,
            WeatherCondition::Cloudy,
            WeatherCondition::Cool,
            WeatherCondition::Evening,
            WeatherCondition::Pleasant,
        ] {
            assert_eq!(c.as_str().parse::<WeatherCondition>(), Ok(c));
        }
        assert!("snowy".parse::<WeatherCondition>().is_err());
    }
}
