//! Great-circle distance and walking estimates.
//!
//! Everything here is a pure function of its inputs. Coordinates are not
//! validated: NaN in gives NaN out, so callers check bounds first (see
//! [`crate::validation`]).

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Assumed walking speed.
pub const WALKING_SPEED_KMH: f64 = 5.0;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine distance in meters.
#[must_use]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

/// Minutes needed to walk `meters`, rounded up to a whole minute.
#[must_use]
pub fn walking_minutes(meters: f64) -> u32 {
    if meters <= 0.0 || meters.is_nan() {
        return 0;
    }
    let meters_per_minute = WALKING_SPEED_KMH * 1000.0 / 60.0;
    (meters / meters_per_minute).ceil() as u32
}

/// Per-leg and total distance of a walk through `stops` in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub legs: Vec<f64>,
    pub total_meters: f64,
    pub total_minutes: u32,
}

/// Sum consecutive legs. Zero or one stop is a zero-length route.
#[must_use]
pub fn route_distance(stops: &[Coordinate]) -> RouteSummary {
    let legs: Vec<f64> = stops
        .windows(2)
        .map(|pair| distance_meters(pair[0], pair[1]))
        .collect();
    let total_meters: f64 = legs.iter().sum();

    RouteSummary {
        total_minutes: walking_minutes(total_meters),
        legs,
        total_meters,
    }
}
