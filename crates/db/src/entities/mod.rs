//! Database entities.

pub mod comment;
pub mod community_place_suggestion;
pub mod discovered_event;
pub mod event_source;
pub mod journey;
pub mod journey_stop;
pub mod kinds;
pub mod place;
pub mod rating;
pub mod site_setting;
pub mod suggestion_vote;

pub use comment::Entity as Comment;
pub use community_place_suggestion::Entity as CommunityPlaceSuggestion;
pub use discovered_event::Entity as DiscoveredEvent;
pub use event_source::Entity as EventSource;
pub use journey::Entity as Journey;
pub use journey_stop::Entity as JourneyStop;
pub use kinds::{EntityType, ModerationStatus};
pub use place::Entity as Place;
pub use rating::Entity as Rating;
pub use site_setting::Entity as SiteSetting;
pub use suggestion_vote::Entity as SuggestionVote;
