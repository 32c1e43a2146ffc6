//! Model fixtures for mock-database tests.
//!
//! Every builder returns a fully populated model with sensible defaults so
//! tests only spell out the fields they care about.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::json;

use crate::entities::{
    EntityType, ModerationStatus, comment, community_place_suggestion, discovered_event,
    event_source, journey, journey_stop, place, rating, site_setting, suggestion_vote,
};

/// Fixed timestamp used by all fixtures.
#[must_use]
pub fn fixed_time() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2025-06-01T10:00:00+05:30").unwrap_or_else(|_| Utc::now().into())
}

/// An empty Postgres mock database.
#[must_use]
pub fn mock_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

/// A place inside the neighborhood bounds.
#[must_use]
pub fn place_model(id: &str, name: &str, category: &str) -> place::Model {
    place::Model {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(format!("{name} on 100 Feet Road")),
        category: category.to_string(),
        latitude: 12.9716,
        longitude: 77.6412,
        rating: Some(4.2),
        visited: false,
        photo_url: None,
        opening_hours: Some("09:00-22:00".to_string()),
        search_keywords: None,
        brand_name: None,
        ideal_conditions: json!([]),
        acceptable_conditions: json!([]),
        avoid_conditions: json!([]),
        created_at: fixed_time(),
        updated_at: None,
    }
}

/// A published journey without stops.
#[must_use]
pub fn journey_model(id: &str, slug: &str) -> journey::Model {
    journey::Model {
        id: id.to_string(),
        slug: slug.to_string(),
        title: format!("Journey {slug}"),
        description: None,
        mood_tags: json!(["chill"]),
        estimated_duration_minutes: 60,
        estimated_distance_meters: 1500,
        ideal_conditions: json!([]),
        acceptable_conditions: json!([]),
        avoid_conditions: json!([]),
        is_published: true,
        created_at: fixed_time(),
        updated_at: None,
    }
}

/// A stop of `journey_id` at `order_index`.
#[must_use]
pub fn journey_stop_model(
    id: &str,
    journey_id: &str,
    place_id: &str,
    order_index: i32,
) -> journey_stop::Model {
    journey_stop::Model {
        id: id.to_string(),
        journey_id: journey_id.to_string(),
        place_id: place_id.to_string(),
        order_index,
        notes: None,
        duration_minutes: Some(20),
    }
}

/// An approved top-level comment.
#[must_use]
pub fn comment_model(id: &str, entity_type: EntityType, entity_id: &str) -> comment::Model {
    comment::Model {
        id: id.to_string(),
        entity_type,
        entity_id: entity_id.to_string(),
        parent_id: None,
        author_name: "Asha".to_string(),
        author_email: None,
        content: "Lovely spot".to_string(),
        is_approved: true,
        submitter_ip: Some("10.0.0.1".to_string()),
        created_at: fixed_time(),
    }
}

/// A rating row.
#[must_use]
pub fn rating_model(id: &str, entity_type: EntityType, entity_id: &str, value: f64) -> rating::Model {
    rating::Model {
        id: id.to_string(),
        entity_type,
        entity_id: entity_id.to_string(),
        rating: value,
        submitter_ip: Some("10.0.0.1".to_string()),
        created_at: fixed_time(),
    }
}

/// A pending community suggestion.
#[must_use]
pub fn suggestion_model(id: &str, email: &str) -> community_place_suggestion::Model {
    community_place_suggestion::Model {
        id: id.to_string(),
        place_name: "Corner Bakery".to_string(),
        description: Some("Fresh bread every morning".to_string()),
        category: Some("bakery".to_string()),
        latitude: Some(12.975),
        longitude: Some(77.64),
        submitter_email: email.to_string(),
        submitter_name: None,
        status: ModerationStatus::Pending,
        votes: 0,
        admin_notes: None,
        created_at: fixed_time(),
        reviewed_at: None,
    }
}

/// A vote on a suggestion.
#[must_use]
pub fn suggestion_vote_model(id: &str, suggestion_id: &str, voter_key: &str) -> suggestion_vote::Model {
    suggestion_vote::Model {
        id: id.to_string(),
        suggestion_id: suggestion_id.to_string(),
        voter_key: voter_key.to_string(),
        created_at: fixed_time(),
    }
}

/// A discovered event in the given moderation state, lasting two hours.
#[must_use]
pub fn event_model(id: &str, status: ModerationStatus) -> discovered_event::Model {
    let start = fixed_time();
    discovered_event::Model {
        id: id.to_string(),
        source_id: None,
        external_id: None,
        title: "Open mic night".to_string(),
        description: None,
        start_time: start,
        end_time: start + chrono::Duration::hours(2),
        venue_name: Some("Toit".to_string()),
        latitude: None,
        longitude: None,
        status,
        quality_score: 70,
        source_url: None,
        is_active: true,
        created_at: start,
        reviewed_at: None,
    }
}

/// An active event source.
#[must_use]
pub fn event_source_model(id: &str, name: &str) -> event_source::Model {
    event_source::Model {
        id: id.to_string(),
        name: name.to_string(),
        url: format!("https://{name}.example/feed"),
        source_type: "rss".to_string(),
        is_active: true,
        last_fetched_at: None,
        created_at: fixed_time(),
    }
}

/// A site setting row.
#[must_use]
pub fn site_setting_model(key: &str, value: serde_json::Value) -> site_setting::Model {
    site_setting::Model {
        key: key.to_string(),
        value,
        updated_at: fixed_time(),
    }
}
