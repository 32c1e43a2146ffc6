//! Domain services.
//!
//! Each service owns its repositories and validates input before anything
//! reaches the store.

#![allow(missing_docs)]

pub mod comment;
pub mod event;
pub mod google_places;
pub mod journey;
pub mod place;
pub mod rating;
pub mod recommendation;
pub mod search;
pub mod site_settings;
pub mod suggestion;
pub mod weather;

pub use comment::{CommentService, CommentThread, CreateCommentInput, MAX_COMMENT_CHARS};
pub use event::{CreateEventSourceInput, EventService, IngestEventInput, IngestOutcome};
pub use google_places::{PlaceDetails, PlaceSummary, PlacesClient, Photo, Prediction};
pub use journey::{JourneyDetail, JourneyInput, JourneyService, JourneyStopInput, StopDetail};
pub use place::{BulkAction, BulkPlaceInput, CreatePlaceInput, PlaceService, UpdatePlaceInput};
pub use rating::{RatingService, RatingSummary, SubmitRatingInput};
pub use recommendation::{RecommendationService, Recommendations};
pub use search::{SearchRequest, SearchResults, SearchService};
pub use site_settings::SiteSettingsService;
pub use suggestion::{CreateSuggestionInput, ModerateSuggestionInput, SuggestionService};
pub use weather::WeatherService;
