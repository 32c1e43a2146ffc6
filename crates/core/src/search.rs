//! Keyword search and ranking over an in-memory list.
//!
//! A result's score is the sum of three parts:
//!
//! * text match tier: exact name 100, name prefix 75, name substring 50,
//!   category or tag 30, description or keyword 20
//! * distance bonus `20 * 1000 / (1000 + meters)` when the caller's location
//!   is known
//! * rating bonus `rating * 4`
//!
//! Queries shorter than two characters match nothing.

use std::collections::VecDeque;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::geo::{Coordinate, distance_meters};

/// Shortest query that is actually searched.
pub const MIN_QUERY_CHARS: usize = 2;

/// How the query matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchKind {
    ExactName,
    NamePrefix,
    NameSubstring,
    Category,
    Description,
}

impl MatchKind {
    /// Score contributed by the text match. Bonuses add up to 40 more, so a
    /// close, well-rated item can outrank a better text match.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::ExactName => 100.0,
            Self::NamePrefix => 75.0,
            Self::NameSubstring => 50.0,
            Self::Category => 30.0,
            Self::Description => 20.0,
        }
    }
}

/// Fields search looks at.
pub trait Searchable {
    fn name(&self) -> &str;
    fn description(&self) -> Option<&str>;
    /// Category and tag labels, matched at the category tier.
    fn labels(&self) -> Vec<&str>;
    /// Extra terms matched at the description tier.
    fn keywords(&self) -> Vec<&str> {
        Vec::new()
    }
    fn coordinate(&self) -> Option<Coordinate> {
        None
    }
    fn rating(&self) -> Option<f64> {
        None
    }
    fn opening_hours(&self) -> Option<&str> {
        None
    }
}

/// Optional narrowing applied after matching.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Case-insensitive category equality.
    pub category: Option<String>,
    /// Only applied when the caller's location is known.
    pub max_distance: Option<f64>,
    /// Keep only items open at the context time. Items without hours are dropped.
    #[serde(default)]
    pub open_now: bool,
}

/// Caller context.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext {
    pub user_location: Option<Coordinate>,
    /// Local wall-clock time used by the open-now filter.
    pub local_time: NaiveTime,
}

/// A matched item and how it scored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult<T> {
    #[serde(flatten)]
    pub item: T,
    pub score: f64,
    pub match_kind: MatchKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

impl<T> RankedResult<T> {
    /// Swap the item for another representation, keeping the score.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RankedResult<U> {
        RankedResult {
            item: f(self.item),
            score: self.score,
            match_kind: self.match_kind,
            distance_meters: self.distance_meters,
        }
    }
}

/// Best text match of `query` (already lowercased) against `item`.
#[must_use]
pub fn text_match<T: Searchable + ?Sized>(item: &T, query: &str) -> Option<MatchKind> {
    let name = item.name().to_lowercase();
    if name == query {
        return Some(MatchKind::ExactName);
    }
    if name.starts_with(query) {
        return Some(MatchKind::NamePrefix);
    }
    if name.contains(query) {
        return Some(MatchKind::NameSubstring);
    }
    if item
        .labels()
        .iter()
        .any(|label| label.to_lowercase().contains(query))
    {
        return Some(MatchKind::Category);
    }
    let in_description = item
        .description()
        .is_some_and(|d| d.to_lowercase().contains(query));
    let in_keywords = item
        .keywords()
        .iter()
        .any(|k| k.to_lowercase().contains(query));
    (in_description || in_keywords).then_some(MatchKind::Description)
}

/// Parse `"HH:MM-HH:MM"`.
#[must_use]
pub fn parse_opening_hours(raw: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (open, close) = raw.split_once('-')?;
    let open = NaiveTime::parse_from_str(open.trim(), "%H:%M").ok()?;
    let close = NaiveTime::parse_from_str(close.trim(), "%H:%M").ok()?;
    Some((open, close))
}

/// Whether `at` falls in the window. Windows may wrap past midnight; equal
/// open and close means open all day.
#[must_use]
pub fn is_open_at(raw: &str, at: NaiveTime) -> bool {
    let Some((open, close)) = parse_opening_hours(raw) else {
        return false;
    };
    match open.cmp(&close) {
        std::cmp::Ordering::Less => open <= at && at < close,
        std::cmp::Ordering::Greater => at >= open || at < close,
        std::cmp::Ordering::Equal => true,
    }
}

/// Match, filter and rank `items`. Ties keep input order.
#[must_use]
pub fn search<T: Searchable + Clone>(
    items: &[T],
    query: &str,
    filters: &SearchFilters,
    context: &SearchContext,
) -> Vec<RankedResult<T>> {
    let query = query.trim().to_lowercase();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Vec::new();
    }

    let category = filters.category.as_deref().map(str::to_lowercase);

    let mut results: Vec<RankedResult<T>> = items
        .iter()
        .filter_map(|item| {
            let match_kind = text_match(item, &query)?;

            if let Some(category) = &category
                && !item.labels().iter().any(|l| l.to_lowercase() == *category)
            {
                return None;
            }

            let distance = context
                .user_location
                .zip(item.coordinate())
                .map(|(from, to)| distance_meters(from, to));

            if let (Some(max), Some(d)) = (filters.max_distance, distance)
                && d > max
            {
                return None;
            }

            if filters.open_now
                && !item
                    .opening_hours()
                    .is_some_and(|hours| is_open_at(hours, context.local_time))
            {
                return None;
            }

            let distance_bonus = distance.map_or(0.0, |d| 20.0 * 1000.0 / (1000.0 + d));
            let rating_bonus = item.rating().unwrap_or(0.0) * 4.0;

            Some(RankedResult {
                item: item.clone(),
                score: match_kind.score() + distance_bonus + rating_bonus,
                match_kind,
                distance_meters: distance,
            })
        })
        .collect();

    // `sort_by` is stable.
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results
}

/// Recent queries, newest first, without duplicates.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl SearchHistory {
    pub const DEFAULT_CAPACITY: usize = 50;

    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Move `query` to the front, dropping the oldest entry past capacity.
    pub fn record(&mut self, query: &str) {
        if let Some(pos) = self.entries.iter().position(|q| q == query) {
            self.entries.remove(pos);
        }
        self.entries.push_front(query.to_string());
        self.entries.truncate(self.capacity);
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Spot {
        name: &'static str,
        category: &'static str,
        description: Option<&'static str>,
        at: Option<Coordinate>,
        rating: Option<f64>,
        hours: Option<&'static str>,
    }

    impl Searchable for Spot {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> Option<&str> {
            self.description
        }
        fn labels(&self) -> Vec<&str> {
            vec![self.category]
        }
        fn coordinate(&self) -> Option<Coordinate> {
            self.at
        }
        fn rating(&self) -> Option<f64> {
            self.rating
        }
        fn opening_hours(&self) -> Option<&str> {
            self.hours
        }
    }

    fn spot(name: &'static str, category: &'static str) -> Spot {
        Spot {
            name,
            category,
            description: None,
            at: None,
            rating: None,
            hours: None,
        }
    }

    fn ctx() -> SearchContext {
        SearchContext {
            user_location: None,
            local_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
        }
    }

    fn names<T: Searchable>(results: &[RankedResult<T>]) -> Vec<String> {
        results.iter().map(|r| r.item.name().to_string()).collect()
    }

    #[test]
    fn test_short_queries_return_nothing() {
        let corpus = vec![spot("a", "cafe"), spot("ab", "cafe")];
        assert!(search(&corpus, "", &SearchFilters::default(), &ctx()).is_empty());
        assert!(search(&corpus, "a", &SearchFilters::default(), &ctx()).is_empty());
        assert!(search(&corpus, " a ", &SearchFilters::default(), &ctx()).is_empty());
        assert_eq!(
            search(&corpus, "ab", &SearchFilters::default(), &ctx()).len(),
            1
        );
    }

    #[test]
    fn test_tiers_order() {
        let mut described = spot("Quiet Corner", "park");
        described.description = Some("great coffee under trees");
        let corpus = vec![
            described,
            spot("Third Wave Coffee", "cafe"),
            spot("Coffee", "cafe"),
            spot("Coffee Brewers", "cafe"),
            spot("Beans", "coffee"),
        ];

        let results = search(&corpus, "COFFEE", &SearchFilters::default(), &ctx());
        assert_eq!(
            names(&results),
            vec![
                "Coffee",
                "Coffee Brewers",
                "Third Wave Coffee",
                "Beans",
                "Quiet Corner"
            ]
        );
        assert_eq!(results[0].match_kind, MatchKind::ExactName);
        assert_eq!(results[4].match_kind, MatchKind::Description);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let corpus = vec![
            spot("Toit One", "pub"),
            spot("Toit Two", "pub"),
            spot("Toit Three", "pub"),
        ];
        let results = search(&corpus, "toit", &SearchFilters::default(), &ctx());
        assert_eq!(names(&results), vec!["Toit One", "Toit Two", "Toit Three"]);
    }

    #[test]
    fn test_distance_and_rating_bonus() {
        let here = Coordinate::new(12.9784, 77.6408);
        let mut near = spot("Brew Near", "cafe");
        near.at = Some(here);
        let mut far = spot("Brew Far", "cafe");
        far.at = Some(Coordinate::new(12.99, 77.60));
        far.rating = Some(1.0);

        let context = SearchContext {
            user_location: Some(here),
            ..ctx()
        };
        let results = search(&[far, near], "brew", &SearchFilters::default(), &context);
        assert_eq!(names(&results), vec!["Brew Near", "Brew Far"]);
        // Prefix tier plus full distance bonus.
        assert!((results[0].score - 95.0).abs() < 1e-9);
        assert_eq!(results[0].distance_meters, Some(0.0));
    }

    #[test]
    fn test_bonuses_can_lift_a_lower_tier() {
        let here = Coordinate::new(12.9784, 77.6408);
        let mut nearby = spot("Third Wave Coffee", "cafe");
        nearby.at = Some(here);
        nearby.rating = Some(5.0);
        let prefix = spot("Coffee Brewers", "cafe");

        let context = SearchContext {
            user_location: Some(here),
            ..ctx()
        };
        let results = search(&[prefix, nearby], "coffee", &SearchFilters::default(), &context);
        assert_eq!(names(&results), vec!["Third Wave Coffee", "Coffee Brewers"]);
        assert_eq!(results[0].match_kind, MatchKind::NameSubstring);
        // Substring 50 + distance 20 + rating 20 against a bare prefix 75.
        assert!((results[0].score - 90.0).abs() < 1e-9);
        assert!((results[1].score - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_filters() {
        let here = Coordinate::new(12.9784, 77.6408);
        let mut cafe = spot("Green Cafe", "cafe");
        cafe.at = Some(here);
        cafe.hours = Some("08:00-20:00");
        let mut bar = spot("Green Bar", "bar");
        bar.at = Some(Coordinate::new(12.99, 77.60));
        bar.hours = Some("18:00-01:00");
        let corpus = vec![cafe, bar];

        let by_category = SearchFilters {
            category: Some("BAR".to_string()),
            ..SearchFilters::default()
        };
        assert_eq!(names(&search(&corpus, "green", &by_category, &ctx())), vec!["Green Bar"]);

        let nearby = SearchFilters {
            max_distance: Some(500.0),
            ..SearchFilters::default()
        };
        let located = SearchContext {
            user_location: Some(here),
            ..ctx()
        };
        assert_eq!(names(&search(&corpus, "green", &nearby, &located)), vec!["Green Cafe"]);
        // Without a location the distance filter does nothing.
        assert_eq!(search(&corpus, "green", &nearby, &ctx()).len(), 2);

        let open = SearchFilters {
            open_now: true,
            ..SearchFilters::default()
        };
        let late = SearchContext {
            local_time: NaiveTime::from_hms_opt(23, 30, 0).unwrap_or_default(),
            ..ctx()
        };
        assert_eq!(names(&search(&corpus, "green", &open, &late)), vec!["Green Bar"]);
        assert_eq!(names(&search(&corpus, "green", &open, &ctx())), vec!["Green Cafe"]);
    }

    #[test]
    fn test_opening_hours() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
        assert!(is_open_at("09:00-17:00", t(9, 0)));
        assert!(!is_open_at("09:00-17:00", t(17, 0)));
        assert!(is_open_at("18:00-02:00", t(1, 59)));
        assert!(!is_open_at("18:00-02:00", t(12, 0)));
        assert!(is_open_at("00:00-00:00", t(4, 0)));
        assert!(!is_open_at("garbage", t(4, 0)));
    }

    #[test]
    fn test_history_dedupes_and_caps() {
        let mut history = SearchHistory::new(3);
        history.record("coffee");
        history.record("pubs");
        history.record("coffee");
        assert_eq!(history.entries(), vec!["coffee", "pubs"]);

        history.record("parks");
        history.record("books");
        assert_eq!(history.entries(), vec!["books", "parks", "coffee"]);
    }

    #[test]
    fn test_history_default_capacity() {
        let mut history = SearchHistory::default();
        for i in 0..60 {
            history.record(&format!("q{i}"));
        }
        assert_eq!(history.len(), 50);
        assert_eq!(history.entries()[0], "q59");
    }
}
