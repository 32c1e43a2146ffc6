//! Place service.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use neighborly_common::{AppError, AppResult, id::IdGenerator};
use neighborly_db::entities::place;
use neighborly_db::repositories::PlaceRepository;
use sea_orm::Set;
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::admin::{ListFilters, SelectionState};
use crate::geo::Coordinate;
use crate::marker::{MarkerSubject, VisibleMarker, visible_markers};
use crate::search::{Searchable, parse_opening_hours};
use crate::validation::{OUT_OF_BOUNDS_MESSAGE, require_rating, validate_indiranagar};
use crate::weather::{Suitability, WeatherCondition};

impl Searchable for place::Model {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn labels(&self) -> Vec<&str> {
        vec![self.category.as_str()]
    }

    fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self
            .search_keywords
            .as_ref()
            .and_then(serde_json::Value::as_array)
            .map(|items| items.iter().filter_map(serde_json::Value::as_str).collect())
            .unwrap_or_default();
        if let Some(brand) = self.brand_name.as_deref() {
            keywords.push(brand);
        }
        keywords
    }

    fn coordinate(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude, self.longitude))
    }

    fn rating(&self) -> Option<f64> {
        self.rating
    }

    fn opening_hours(&self) -> Option<&str> {
        self.opening_hours.as_deref()
    }
}

impl MarkerSubject for place::Model {
    fn rating(&self) -> Option<f64> {
        self.rating
    }

    fn has_photo(&self) -> bool {
        self.photo_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Weather suitability stored on a place.
#[must_use]
pub fn place_suitability(place: &place::Model) -> Suitability {
    Suitability::from_json(
        &place.ideal_conditions,
        &place.acceptable_conditions,
        &place.avoid_conditions,
    )
}

fn conditions_json(conditions: &[WeatherCondition]) -> serde_json::Value {
    json!(conditions.iter().map(|c| c.as_str()).collect::<Vec<_>>())
}

/// Input for creating a place.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlaceInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub category: String,
    pub latitude: f64,
    pub longitude: f64,
    pub rating: Option<f64>,
    #[serde(default)]
    pub visited: bool,
    #[validate(url)]
    pub photo_url: Option<String>,
    pub opening_hours: Option<String>,
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[validate(length(max = 200))]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub ideal_conditions: Vec<WeatherCondition>,
    #[serde(default)]
    pub acceptable_conditions: Vec<WeatherCondition>,
    #[serde(default)]
    pub avoid_conditions: Vec<WeatherCondition>,
}

/// Input for updating a place. Absent fields are left alone.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaceInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<Option<String>>,
    #[validate(length(min = 1, max = 64))]
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<Option<f64>>,
    pub visited: Option<bool>,
    pub photo_url: Option<Option<String>>,
    pub opening_hours: Option<Option<String>>,
    pub search_keywords: Option<Vec<String>>,
    pub brand_name: Option<Option<String>>,
    pub ideal_conditions: Option<Vec<WeatherCondition>>,
    pub acceptable_conditions: Option<Vec<WeatherCondition>>,
    pub avoid_conditions: Option<Vec<WeatherCondition>>,
}

/// What to do with the selected places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BulkAction {
    Delete,
    MarkVisited,
    MarkUnvisited,
}

/// Admin bulk request over a selection of place IDs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPlaceInput {
    pub ids: Vec<String>,
    pub action: BulkAction,
}

fn require_location(latitude: f64, longitude: f64) -> AppResult<()> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(AppError::Validation("Invalid coordinates".to_string()));
    }
    if !validate_indiranagar(latitude, longitude) {
        return Err(AppError::Validation(OUT_OF_BOUNDS_MESSAGE.to_string()));
    }
    Ok(())
}

fn require_hours(hours: Option<&str>) -> AppResult<()> {
    match hours {
        Some(raw) if parse_opening_hours(raw).is_none() => Err(AppError::Validation(
            "Opening hours must look like HH:MM-HH:MM".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Service for places.
#[derive(Clone)]
pub struct PlaceService {
    place_repo: PlaceRepository,
    whitelist: Arc<HashSet<String>>,
    id_gen: IdGenerator,
}

impl PlaceService {
    /// Create a new place service. An empty whitelist makes every place public.
    #[must_use]
    pub fn new(place_repo: PlaceRepository, whitelist: Vec<String>) -> Self {
        Self {
            place_repo,
            whitelist: Arc::new(whitelist.into_iter().collect()),
            id_gen: IdGenerator::new(),
        }
    }

    fn is_public(&self, place: &place::Model) -> bool {
        self.whitelist.is_empty() || self.whitelist.contains(&place.name)
    }

    /// Places visible on the public API, by name.
    pub async fn list_public(&self) -> AppResult<Vec<place::Model>> {
        if self.whitelist.is_empty() {
            return self.place_repo.find_all().await;
        }
        let names: Vec<String> = self.whitelist.iter().cloned().collect();
        self.place_repo.find_by_names(&names).await
    }

    /// Every place, whitelisted or not.
    pub async fn list_all(&self) -> AppResult<Vec<place::Model>> {
        self.place_repo.find_all().await
    }

    /// Admin list narrowed by `filters`.
    ///
    /// `search` matches name or brand (case-insensitive substring), `category`
    /// is case-insensitive equality and `status` is `visited` or `unvisited`.
    pub async fn list_filtered(&self, filters: &ListFilters) -> AppResult<Vec<place::Model>> {
        let visited = match filters.status.as_deref() {
            None => None,
            Some("visited") => Some(true),
            Some("unvisited") => Some(false),
            Some(other) => {
                return Err(AppError::Validation(format!("Unknown status: {other}")));
            }
        };
        let search = filters.search.as_deref().map(str::to_lowercase);

        let places = self.place_repo.find_all().await?;
        Ok(places
            .into_iter()
            .filter(|p| {
                search.as_deref().is_none_or(|q| {
                    p.name.to_lowercase().contains(q)
                        || p.brand_name
                            .as_deref()
                            .is_some_and(|b| b.to_lowercase().contains(q))
                })
            })
            .filter(|p| {
                filters
                    .category
                    .as_deref()
                    .is_none_or(|c| p.category.eq_ignore_ascii_case(c))
            })
            .filter(|p| visited.is_none_or(|v| p.visited == v))
            .collect())
    }

    /// A public place. Places outside the whitelist are reported as missing.
    pub async fn get_public(&self, id: &str) -> AppResult<place::Model> {
        let place = self.place_repo.get_by_id(id).await?;
        if !self.is_public(&place) {
            return Err(AppError::NotFound(format!("Place not found: {id}")));
        }
        Ok(place)
    }

    /// Any place by ID.
    pub async fn get(&self, id: &str) -> AppResult<place::Model> {
        self.place_repo.get_by_id(id).await
    }

    /// Public places to draw at `zoom`, highest priority first.
    pub async fn markers(&self, zoom: f64) -> AppResult<Vec<VisibleMarker<place::Model>>> {
        if !zoom.is_finite() || !(0.0..=22.0).contains(&zoom) {
            return Err(AppError::Validation(
                "Zoom must be between 0 and 22".to_string(),
            ));
        }
        let places = self.list_public().await?;
        Ok(visible_markers(places, zoom))
    }

    /// Create a place.
    pub async fn create(&self, input: CreatePlaceInput) -> AppResult<place::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        require_location(input.latitude, input.longitude)?;
        let rating = input.rating.map(require_rating).transpose()?;
        require_hours(input.opening_hours.as_deref())?;

        let model = place::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            category: Set(input.category.trim().to_lowercase()),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            rating: Set(rating),
            visited: Set(input.visited),
            photo_url: Set(input.photo_url),
            opening_hours: Set(input.opening_hours),
            search_keywords: Set(
                (!input.search_keywords.is_empty()).then(|| json!(input.search_keywords)),
            ),
            brand_name: Set(input.brand_name),
            ideal_conditions: Set(conditions_json(&input.ideal_conditions)),
            acceptable_conditions: Set(conditions_json(&input.acceptable_conditions)),
            avoid_conditions: Set(conditions_json(&input.avoid_conditions)),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.place_repo.create(model).await?;
        tracing::info!(place_id = %created.id, name = %created.name, "Place created");
        Ok(created)
    }

    /// Apply a partial update.
    pub async fn update(&self, id: &str, input: UpdatePlaceInput) -> AppResult<place::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let existing = self.place_repo.get_by_id(id).await?;
        let latitude = input.latitude.unwrap_or(existing.latitude);
        let longitude = input.longitude.unwrap_or(existing.longitude);
        require_location(latitude, longitude)?;

        let rating = match input.rating {
            Some(Some(value)) => Some(Some(require_rating(value)?)),
            other => other,
        };
        if let Some(hours) = &input.opening_hours {
            require_hours(hours.as_deref())?;
        }

        self.place_repo
            .patch(id, |active| {
                if let Some(name) = input.name {
                    active.name = Set(name.trim().to_string());
                }
                if let Some(description) = input.description {
                    active.description = Set(description);
                }
                if let Some(category) = input.category {
                    active.category = Set(category.trim().to_lowercase());
                }
                active.latitude = Set(latitude);
                active.longitude = Set(longitude);
                if let Some(rating) = rating {
                    active.rating = Set(rating);
                }
                if let Some(visited) = input.visited {
                    active.visited = Set(visited);
                }
                if let Some(photo_url) = input.photo_url {
                    active.photo_url = Set(photo_url);
                }
                if let Some(hours) = input.opening_hours {
                    active.opening_hours = Set(hours);
                }
                if let Some(keywords) = input.search_keywords {
                    active.search_keywords = Set((!keywords.is_empty()).then(|| json!(keywords)));
                }
                if let Some(brand) = input.brand_name {
                    active.brand_name = Set(brand);
                }
                if let Some(ideal) = input.ideal_conditions {
                    active.ideal_conditions = Set(conditions_json(&ideal));
                }
                if let Some(acceptable) = input.acceptable_conditions {
                    active.acceptable_conditions = Set(conditions_json(&acceptable));
                }
                if let Some(avoid) = input.avoid_conditions {
                    active.avoid_conditions = Set(conditions_json(&avoid));
                }
            })
            .await
    }

    /// Delete a place.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.place_repo.delete(id).await?;
        tracing::info!(place_id = %id, "Place deleted");
        Ok(())
    }

    /// Run `action` over a selection of places. Returns the rows affected.
    pub async fn bulk(&self, input: BulkPlaceInput) -> AppResult<u64> {
        let mut selection = SelectionState::new();
        selection.select_all(input.ids);
        if selection.is_empty() {
            return Err(AppError::Validation("No places selected".to_string()));
        }
        let ids = selection.selected();

        let affected = match input.action {
            BulkAction::Delete => self.place_repo.delete_many(&ids).await?,
            BulkAction::MarkVisited => self.place_repo.set_visited_many(&ids, true).await?,
            BulkAction::MarkUnvisited => self.place_repo.set_visited_many(&ids, false).await?,
        };

        tracing::info!(
            action = ?input.action,
            selected = selection.count(),
            affected,
            "Bulk place action"
        );
        Ok(affected)
    }
}
