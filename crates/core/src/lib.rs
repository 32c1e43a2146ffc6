//! Core business logic for neighborly.
//!
//! Pure engines (geo, weather, search, markers, caching, rate limiting,
//! admin selection) live at the crate root; [`services`] wires them to the
//! repositories.

pub mod admin;
pub mod cache;
pub mod entity_ref;
pub mod geo;
pub mod marker;
pub mod rate_limit;
pub mod search;
pub mod services;
pub mod validation;
pub mod weather;

pub use entity_ref::{EntityDirectory, EntityRef};
pub use services::*;
