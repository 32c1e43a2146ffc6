//! Domain validators applied before anything reaches the store.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::geo::Coordinate;
use neighborly_common::{AppError, AppResult};

/// Message returned for coordinates outside the neighborhood.
pub const OUT_OF_BOUNDS_MESSAGE: &str = "Coordinates must be within Indiranagar boundaries";

/// Centre of the neighborhood, used when a caller gives no location.
pub const NEIGHBORHOOD_CENTER: Coordinate = Coordinate::new(12.9719, 77.6412);

/// Bounding box of the neighborhood, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndiranagarBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl IndiranagarBounds {
    pub const DEFAULT: Self = Self {
        min_lat: 12.95,
        max_lat: 13.00,
        min_lng: 77.58,
        max_lng: 77.65,
    };

    #[must_use]
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

/// Whether a point lies inside the neighborhood.
#[must_use]
pub fn validate_indiranagar(lat: f64, lng: f64) -> bool {
    IndiranagarBounds::DEFAULT.contains(lat, lng)
}

/// Parse and bounds-check raw query values.
pub fn require_coordinate(lat: Option<f64>, lng: Option<f64>) -> AppResult<Coordinate> {
    let (Some(lat), Some(lng)) = (lat, lng) else {
        return Err(AppError::Validation(
            "Latitude and longitude are required".to_string(),
        ));
    };
    if !lat.is_finite() || !lng.is_finite() {
        return Err(AppError::Validation("Invalid coordinates".to_string()));
    }
    if !validate_indiranagar(lat, lng) {
        return Err(AppError::Validation(OUT_OF_BOUNDS_MESSAGE.to_string()));
    }
    Ok(Coordinate::new(lat, lng))
}

/// Whether `rating` is one of 1.0, 1.1, ..., 5.0.
#[must_use]
pub fn is_valid_rating(rating: f64) -> bool {
    if !(1.0..=5.0).contains(&rating) {
        return false;
    }
    let tenths = rating * 10.0;
    (tenths - tenths.round()).abs() < 1e-6
}

/// Reject ratings outside 1.0-5.0 or finer than one decimal.
pub fn require_rating(rating: f64) -> AppResult<f64> {
    if is_valid_rating(rating) {
        Ok((rating * 10.0).round() / 10.0)
    } else {
        Err(AppError::Validation(
            "Rating must be between 1 and 5 in steps of 0.1".to_string(),
        ))
    }
}

static SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Lowercase words joined by single hyphens.
#[must_use]
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= 128 && SLUG.is_match(slug)
}

/// Stop indices must be exactly `0..n` with no gaps or repeats.
pub fn require_dense_order(indices: &[i32]) -> AppResult<()> {
    let mut sorted = indices.to_vec();
    sorted.sort_unstable();
    for (expected, actual) in sorted.iter().enumerate() {
        if *actual != expected as i32 {
            return Err(AppError::Validation(
                "Stop order indices must be unique and start at 0 without gaps".to_string(),
            ));
        }
    }
    Ok(())
}

/// Trimmed, non-empty, at most `max` characters.
pub fn require_text(field: &str, value: &str, max: usize) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(validate_indiranagar(12.97, 77.64));
        assert!(!validate_indiranagar(12.94, 77.64));
        assert!(!validate_indiranagar(12.97, 77.57));
        // Edges are inclusive.
        assert!(validate_indiranagar(12.95, 77.58));
        assert!(validate_indiranagar(13.00, 77.65));
    }

    #[test]
    fn test_require_coordinate_messages() {
        match require_coordinate(Some(10.0), Some(77.615)) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, OUT_OF_BOUNDS_MESSAGE),
            other => panic!("unexpected {other:?}"),
        }
        assert!(require_coordinate(None, Some(77.6)).is_err());
        assert!(require_coordinate(Some(f64::NAN), Some(77.6)).is_err());
        assert!(require_coordinate(Some(12.97), Some(77.64)).is_ok());
    }

    #[test]
    fn test_every_tenth_is_accepted() {
        for tenths in 10..=50 {
            let rating = f64::from(tenths) / 10.0;
            assert!(is_valid_rating(rating), "{rating} rejected");
        }
    }

    #[test]
    fn test_rejected_ratings() {
        for rating in [0.9, 5.1, 4.35, 0.0, -1.0, f64::NAN] {
            assert!(!is_valid_rating(rating), "{rating} accepted");
        }
    }

    #[test]
    fn test_slug() {
        assert!(is_valid_slug("coffee-crawl"));
        assert!(is_valid_slug("day1"));
        assert!(!is_valid_slug("Coffee Crawl"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn test_dense_order() {
        assert!(require_dense_order(&[]).is_ok());
        assert!(require_dense_order(&[2, 0, 1]).is_ok());
        assert!(require_dense_order(&[0, 0, 1]).is_err());
        assert!(require_dense_order(&[1, 2]).is_err());
        assert!(require_dense_order(&[0, 2]).is_err());
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("Name", "  Toit ", 10).unwrap(), "Toit");
        assert!(require_text("Name", "   ", 10).is_err());
        assert!(require_text("Name", "abcdefghijk", 10).is_err());
    }
}
