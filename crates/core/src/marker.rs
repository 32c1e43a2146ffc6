//! Map marker sizing and zoom-based culling.

use serde::Serialize;

/// Rating at or above which a place counts as featured.
pub const FEATURED_RATING: f64 = 4.5;

/// Rendered marker size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSize {
    Small,
    Medium,
    Large,
}

/// Marker size for a zoom level.
#[must_use]
pub fn marker_size(zoom: f64) -> MarkerSize {
    if zoom >= 16.0 {
        MarkerSize::Large
    } else if zoom >= 14.0 {
        MarkerSize::Medium
    } else {
        MarkerSize::Small
    }
}

/// Minimum rating per zoom bucket, keyed by the bucket's lowest zoom.
///
/// A place is visible at `zoom` if its rating meets the smallest threshold
/// among all buckets starting at or below `zoom`. Taking the minimum keeps
/// visibility monotonic in zoom whatever the table says.
const VISIBILITY: [(f64, f64); 4] = [
    (f64::NEG_INFINITY, 4.8),
    (11.0, 4.0),
    (13.0, FEATURED_RATING),
    (15.0, 0.0),
];

fn rating_threshold(zoom: f64) -> f64 {
    VISIBILITY
        .iter()
        .filter(|(min_zoom, _)| zoom >= *min_zoom)
        .map(|(_, threshold)| *threshold)
        .fold(f64::INFINITY, f64::min)
}

/// Attributes a marker decision depends on.
pub trait MarkerSubject {
    fn rating(&self) -> Option<f64>;
    fn has_photo(&self) -> bool;
}

/// Whether to draw `place` at `zoom`. At zoom 15 and above everything is drawn.
#[must_use]
pub fn should_render<P: MarkerSubject + ?Sized>(place: &P, zoom: f64) -> bool {
    if zoom >= 15.0 {
        return true;
    }
    place
        .rating()
        .is_some_and(|rating| rating >= rating_threshold(zoom))
}

/// Draw order and clustering weight. Higher draws on top.
#[must_use]
pub fn priority<P: MarkerSubject + ?Sized>(place: &P) -> f64 {
    let rating = place.rating().unwrap_or(0.0);
    let mut score = rating * 10.0;
    if rating >= FEATURED_RATING {
        score += 20.0;
    }
    if place.has_photo() {
        score += 15.0;
    }
    score
}

/// A place that survived culling, with its marker attributes.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleMarker<T> {
    #[serde(flatten)]
    pub item: T,
    pub size: MarkerSize,
    pub priority: f64,
}

impl<T> VisibleMarker<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> VisibleMarker<U> {
        VisibleMarker {
            item: f(self.item),
            size: self.size,
            priority: self.priority,
        }
    }
}

/// Cull `places` for `zoom` and order them by priority, highest first.
/// Equal priorities keep input order.
#[must_use]
pub fn visible_markers<T: MarkerSubject>(places: Vec<T>, zoom: f64) -> Vec<VisibleMarker<T>> {
    let size = marker_size(zoom);
    let mut visible: Vec<VisibleMarker<T>> = places
        .into_iter()
        .filter(|p| should_render(p, zoom))
        .map(|p| VisibleMarker {
            priority: priority(&p),
            item: p,
            size,
        })
        .collect();
    visible.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    visible
}
