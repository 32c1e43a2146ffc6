//! Repositories: one per aggregate, each wrapping a shared connection.

mod comment;
mod event;
mod journey;
mod place;
mod rating;
mod site_setting;
mod suggestion;

pub use comment::CommentRepository;
pub use event::EventRepository;
pub use journey::JourneyRepository;
pub use place::PlaceRepository;
pub use rating::{RatingAggregate, RatingRepository};
pub use site_setting::SiteSettingRepository;
pub use suggestion::SuggestionRepository;
