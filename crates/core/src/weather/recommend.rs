//! Scoring candidates against the current weather.

use serde::Serialize;

use super::WeatherCondition;

/// Conditions a place or journey is suited to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suitability {
    pub ideal: Vec<WeatherCondition>,
    pub acceptable: Vec<WeatherCondition>,
    pub avoid: Vec<WeatherCondition>,
}

impl Suitability {
    /// Build from stored JSON arrays, skipping labels that are not conditions.
    #[must_use]
    pub fn from_json(
        ideal: &serde_json::Value,
        acceptable: &serde_json::Value,
        avoid: &serde_json::Value,
    ) -> Self {
        fn labels(value: &serde_json::Value) -> Vec<WeatherCondition> {
            value
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(serde_json::Value::as_str)
                        .filter_map(|s| s.parse().ok())
                        .collect()
                })
                .unwrap_or_default()
        }

        Self {
            ideal: labels(ideal),
            acceptable: labels(acceptable),
            avoid: labels(avoid),
        }
    }
}

/// +2 ideal, -2 avoid, 0 acceptable or unlisted.
#[must_use]
pub fn score(suitability: &Suitability, condition: WeatherCondition) -> i32 {
    if suitability.ideal.contains(&condition) {
        2
    } else if suitability.avoid.contains(&condition) {
        -2
    } else {
        0
    }
}

/// A candidate with its weather score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scored<T> {
    #[serde(flatten)]
    pub item: T,
    pub weather_score: i32,
}

impl<T> Scored<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Scored<U> {
        Scored {
            item: f(self.item),
            weather_score: self.weather_score,
        }
    }
}

/// Score every candidate and sort best first. Equal scores keep input order.
pub fn recommend<T, F>(candidates: Vec<T>, condition: WeatherCondition, suitability: F) -> Vec<Scored<T>>
where
    F: Fn(&T) -> Suitability,
{
    let mut scored: Vec<Scored<T>> = candidates
        .into_iter()
        .map(|item| Scored {
            weather_score: score(&suitability(&item), condition),
            item,
        })
        .collect();
    scored.sort_by(|a, b| b.weather_score.cmp(&a.weather_score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn suited(ideal: &[WeatherCondition], avoid: &[WeatherCondition]) -> Suitability {
        Suitability {
            ideal: ideal.to_vec(),
            acceptable: vec![],
            avoid: avoid.to_vec(),
        }
    }

    #[test]
    fn test_scores() {
        use WeatherCondition::{Hot, Pleasant, Rainy};
        let s = Suitability {
            ideal: vec![Rainy],
            acceptable: vec![Pleasant],
            avoid: vec![Hot],
        };
        assert_eq!(score(&s, Rainy), 2);
        assert_eq!(score(&s, Pleasant), 0);
        assert_eq!(score(&s, Hot), -2);
        assert_eq!(score(&s, WeatherCondition::Cool), 0);
    }

    #[test]
    fn test_recommend_is_stable() {
        use WeatherCondition::Rainy;
        let candidates = vec![
            ("park", suited(&[], &[Rainy])),
            ("cafe-a", suited(&[], &[])),
            ("museum", suited(&[Rainy], &[])),
            ("cafe-b", suited(&[], &[])),
            ("cafe-c", suited(&[], &[])),
        ];
        let ranked = recommend(candidates, Rainy, |(_, s)| s.clone());
        let order: Vec<_> = ranked.iter().map(|r| r.item.0).collect();
        assert_eq!(order, vec!["museum", "cafe-a", "cafe-b", "cafe-c", "park"]);
        assert_eq!(ranked[0].weather_score, 2);
        assert_eq!(ranked[4].weather_score, -2);
    }

    #[test]
    fn test_from_json_skips_unknown_labels() {
        let s = Suitability::from_json(&json!(["rainy", "snowy"]), &json!(null), &json!(["hot"]));
        assert_eq!(s.ideal, vec![WeatherCondition::Rainy]);
        assert!(s.acceptable.is_empty());
        assert_eq!(s.avoid, vec![WeatherCondition::Hot]);
    }
}
