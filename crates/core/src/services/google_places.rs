//! Google Places API client used by the map proxy endpoints.

use std::time::Duration;

use bytes::Bytes;
use neighborly_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::validation::{IndiranagarBounds, NEIGHBORHOOD_CENTER};

/// Shortest autocomplete input sent upstream.
pub const MIN_AUTOCOMPLETE_CHARS: usize = 2;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Autocomplete bias radius around the neighborhood centre.
const AUTOCOMPLETE_RADIUS_METERS: u32 = 3000;

const MAX_NEARBY_RADIUS_METERS: u32 = 5000;
const MAX_PHOTO_WIDTH: u32 = 1600;

/// A nearby-search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSummary {
    pub place_id: String,
    pub name: String,
    pub vicinity: Option<String>,
    pub location: Coordinate,
    pub rating: Option<f64>,
    pub types: Vec<String>,
    pub photo_reference: Option<String>,
}

/// Details of a single place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    pub phone_number: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub location: Coordinate,
    pub opening_hours: Vec<String>,
    pub photo_references: Vec<String>,
}

/// An autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub place_id: String,
    pub description: String,
}

/// Raw photo bytes.
#[derive(Debug, Clone)]
pub struct Photo {
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Deserialize)]
struct Envelope<T> {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(flatten)]
    body: T,
}

#[derive(Deserialize)]
struct NearbyBody {
    #[serde(default)]
    results: Vec<GPlace>,
}

#[derive(Deserialize)]
struct DetailsBody {
    result: Option<GPlace>,
}

#[derive(Deserialize)]
struct AutocompleteBody {
    #[serde(default)]
    predictions: Vec<GPrediction>,
}

#[derive(Deserialize)]
struct GPlace {
    place_id: String,
    name: String,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    formatted_phone_number: Option<String>,
    website: Option<String>,
    rating: Option<f64>,
    geometry: GGeometry,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<GPhoto>,
    opening_hours: Option<GOpeningHours>,
}

#[derive(Deserialize)]
struct GGeometry {
    location: GLatLng,
}

#[derive(Deserialize)]
struct GLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct GPhoto {
    photo_reference: String,
}

#[derive(Deserialize)]
struct GOpeningHours {
    #[serde(default)]
    weekday_text: Vec<String>,
}

#[derive(Deserialize)]
struct GPrediction {
    place_id: String,
    description: String,
}

impl From<GPlace> for PlaceSummary {
    fn from(p: GPlace) -> Self {
        Self {
            place_id: p.place_id,
            name: p.name,
            vicinity: p.vicinity,
            location: Coordinate::new(p.geometry.location.lat, p.geometry.location.lng),
            rating: p.rating,
            types: p.types,
            photo_reference: p.photos.into_iter().next().map(|ph| ph.photo_reference),
        }
    }
}

impl From<GPlace> for PlaceDetails {
    fn from(p: GPlace) -> Self {
        Self {
            place_id: p.place_id,
            name: p.name,
            formatted_address: p.formatted_address,
            phone_number: p.formatted_phone_number,
            website: p.website,
            rating: p.rating,
            location: Coordinate::new(p.geometry.location.lat, p.geometry.location.lng),
            opening_hours: p.opening_hours.map(|h| h.weekday_text).unwrap_or_default(),
            photo_references: p.photos.into_iter().map(|ph| ph.photo_reference).collect(),
        }
    }
}

/// Fail unless Google answered `OK` (or `ZERO_RESULTS` where allowed).
fn check_status<T>(envelope: Envelope<T>, allow_empty: bool) -> AppResult<T> {
    match envelope.status.as_str() {
        "OK" => Ok(envelope.body),
        "ZERO_RESULTS" if allow_empty => Ok(envelope.body),
        "NOT_FOUND" | "INVALID_REQUEST" if !allow_empty => {
            Err(AppError::NotFound("Place not found".to_string()))
        }
        status => Err(AppError::ExternalService(format!(
            "Google Places returned {status}: {}",
            envelope.error_message.unwrap_or_default()
        ))),
    }
}

/// Google Places client. No retries: a failed call fails the request.
#[derive(Clone)]
pub struct PlacesClient {
    api_key: Option<String>,
    base_url: String,
    http_client: reqwest::Client,
}

impl PlacesClient {
    /// Create a client. Without a key every call fails with a config error.
    #[must_use]
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("Google Places API key is not configured".to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<Envelope<T>> {
        let key = self.key()?;
        let response = self
            .http_client
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Google Places request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Google Places API error: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Google Places parse failed: {e}")))
    }

    /// Places around `at` within `radius` meters, optionally of one type.
    pub async fn nearby(
        &self,
        at: Coordinate,
        radius: u32,
        kind: Option<&str>,
    ) -> AppResult<Vec<PlaceSummary>> {
        if !IndiranagarBounds::DEFAULT.contains(at.lat, at.lng) {
            return Err(AppError::Validation(
                crate::validation::OUT_OF_BOUNDS_MESSAGE.to_string(),
            ));
        }
        let radius = radius.clamp(1, MAX_NEARBY_RADIUS_METERS);

        let mut query = vec![
            ("location", format!("{},{}", at.lat, at.lng)),
            ("radius", radius.to_string()),
        ];
        if let Some(kind) = kind.filter(|k| !k.is_empty()) {
            query.push(("type", kind.to_string()));
        }

        let body: NearbyBody = check_status(self.get_json("nearbysearch/json", &query).await?, true)?;
        Ok(body.results.into_iter().map(PlaceSummary::from).collect())
    }

    /// Details of one place.
    pub async fn details(&self, place_id: &str) -> AppResult<PlaceDetails> {
        let place_id = place_id.trim();
        if place_id.is_empty() {
            return Err(AppError::Validation("placeId is required".to_string()));
        }

        let query = [
            ("place_id", place_id.to_string()),
            (
                "fields",
                "place_id,name,formatted_address,formatted_phone_number,website,rating,geometry,opening_hours,photos"
                    .to_string(),
            ),
        ];
        let body: DetailsBody = check_status(self.get_json("details/json", &query).await?, false)?;
        body.result
            .map(PlaceDetails::from)
            .ok_or_else(|| AppError::NotFound(format!("Place not found: {place_id}")))
    }

    /// Suggestions for a partial input, biased to the neighborhood.
    ///
    /// Inputs shorter than two characters return nothing without calling out.
    pub async fn autocomplete(&self, input: &str, session_token: Option<&str>) -> AppResult<Vec<Prediction>> {
        let input = input.trim();
        if input.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Ok(Vec::new());
        }

        let mut query = vec![
            ("input", input.to_string()),
            (
                "location",
                format!("{},{}", NEIGHBORHOOD_CENTER.lat, NEIGHBORHOOD_CENTER.lng),
            ),
            ("radius", AUTOCOMPLETE_RADIUS_METERS.to_string()),
            ("strictbounds", "true".to_string()),
        ];
        if let Some(token) = session_token {
            query.push(("sessiontoken", token.to_string()));
        }

        let body: AutocompleteBody =
            check_status(self.get_json("autocomplete/json", &query).await?, true)?;
        Ok(body
            .predictions
            .into_iter()
            .map(|p| Prediction {
                place_id: p.place_id,
                description: p.description,
            })
            .collect())
    }

    /// Upstream URL of a photo. Carries the API key, so it is only used
    /// server-side.
    pub fn photo_url(&self, reference: &str, max_width: u32) -> AppResult<String> {
        let key = self.key()?;
        let mut url = url::Url::parse(&format!("{}/photo", self.base_url))
            .map_err(|e| AppError::Config(format!("Invalid Google Places base URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("maxwidth", &max_width.clamp(1, MAX_PHOTO_WIDTH).to_string())
            .append_pair("photo_reference", reference)
            .append_pair("key", key);
        Ok(url.into())
    }

    /// Fetch a photo's bytes.
    pub async fn photo(&self, reference: &str, max_width: u32) -> AppResult<Photo> {
        if reference.trim().is_empty() {
            return Err(AppError::Validation("Photo reference is required".to_string()));
        }
        let url = self.photo_url(reference.trim(), max_width)?;

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Google photo request failed: {e}")))?;
        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Google photo error: {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::ExternalService(format!("Google photo read failed: {e}")))?;

        Ok(Photo {
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> PlacesClient {
        PlacesClient::new(Some("k3y".to_string()), Duration::from_secs(1))
            .with_base_url("http://127.0.0.1:9")
    }

    #[tokio::test]
    async fn test_short_autocomplete_does_not_call_out() {
        // The base URL is unreachable, so any request would error.
        assert!(client().autocomplete("a", None).await.unwrap().is_empty());
        assert!(client().autocomplete("  ", None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error() {
        let client = PlacesClient::new(None, Duration::from_secs(1));
        assert!(matches!(
            client.details("abc").await,
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_nearby_outside_bounds() {
        let result = client().nearby(Coordinate::new(13.1, 77.6), 500, None).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_photo_url() {
        let url = client().photo_url("ref 1", 5000).unwrap();
        assert_eq!(
            url,
            "http://127.0.0.1:9/photo?maxwidth=1600&photo_reference=ref+1&key=k3y"
        );
    }

    #[test]
    fn test_status_handling() {
        let ok: Envelope<NearbyBody> = serde_json::from_str(
            r#"{"status":"OK","results":[{"place_id":"g1","name":"Toit","geometry":{"location":{"lat":12.97,"lng":77.64}},"photos":[{"photo_reference":"r1"}]}]}"#,
        )
        .unwrap();
        let body = check_status(ok, true).unwrap();
        let summary = PlaceSummary::from(body.results.into_iter().next().unwrap());
        assert_eq!(summary.photo_reference.as_deref(), Some("r1"));

        let empty: Envelope<NearbyBody> =
            serde_json::from_str(r#"{"status":"ZERO_RESULTS","results":[]}"#).unwrap();
        assert!(check_status(empty, true).unwrap().results.is_empty());

        let denied: Envelope<NearbyBody> = serde_json::from_str(
            r#"{"status":"REQUEST_DENIED","error_message":"bad key"}"#,
        )
        .unwrap();
        assert!(matches!(
            check_status(denied, true),
            Err(AppError::ExternalService(_))
        ));
    }
}
