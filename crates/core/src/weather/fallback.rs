//! Seasonal estimate used when every provider fails.

use chrono::Month;

use super::WeatherReading;

/// Typical Bangalore conditions per calendar month:
/// (temperature °C, humidity %, rain probability %, description).
const MONTHLY: [(f64, f64, f64, &str); 12] = [
    (21.0, 60.0, 5.0, "Clear winter skies"),
    (23.0, 50.0, 5.0, "Dry and sunny"),
    (26.0, 45.0, 10.0, "Warm and dry"),
    (28.0, 55.0, 25.0, "Warm with occasional showers"),
    (27.0, 65.0, 45.0, "Pre-monsoon thunderstorms"),
    (24.0, 78.0, 60.0, "Monsoon showers"),
    (23.0, 82.0, 65.0, "Monsoon showers"),
    (23.0, 82.0, 65.0, "Monsoon showers"),
    (23.0, 80.0, 70.0, "Heavy monsoon rain"),
    (23.0, 78.0, 60.0, "Retreating monsoon"),
    (22.0, 72.0, 30.0, "Cool with light showers"),
    (21.0, 68.0, 10.0, "Cool and clear"),
];

/// Month-keyed estimate. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeasonalFallback;

impl SeasonalFallback {
    /// Estimate for a 1-based month number. Out-of-range months wrap.
    #[must_use]
    pub fn estimate(self, month: u32) -> WeatherReading {
        let index = (month.max(1) - 1) as usize % MONTHLY.len();
        let (temperature, humidity, rain_probability, description) = MONTHLY[index];
        WeatherReading {
            temperature,
            humidity,
            rain_probability,
            description: description.to_string(),
        }
    }

    #[must_use]
    pub fn for_month(self, month: Month) -> WeatherReading {
        self.estimate(month.number_from_month())
    }
}
