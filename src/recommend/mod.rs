//! Relevance ranking over the in-memory listings.
//!
//! Everything here is a pure function of its inputs; callers re-run
//! [`recommend`] whenever listings, likes or filters change.

pub mod types;

use crate::models::Property;

pub use types::FilterCriteria;

const RATING_WEIGHT: f64 = 2.0;
const CITY_BONUS: f64 = 5.0;
const TYPE_BONUS: f64 = 3.0;
const RENT_BONUS: f64 = 2.0;
const SIMILAR_RENT_WINDOW: f64 = 500.0;

/// Relevance of `candidate` given the listings a user already liked
pub fn score(candidate: &Property, liked: &[&Property]) -> f64 {
    let mut score = candidate.rating * RATING_WEIGHT;

    if liked.is_empty() {
        return score;
    }

    if liked.iter().any(|lp| lp.city == candidate.city) {
        score += CITY_BONUS;
    }
    if liked.iter().any(|lp| lp.property_type == candidate.property_type) {
        score += TYPE_BONUS;
    }
    if liked
        .iter()
        .any(|lp| (lp.rent - candidate.rent).abs() < SIMILAR_RENT_WINDOW)
    {
        score += RENT_BONUS;
    }

    score
}

/// Filter `all` by `criteria`, then rank by descending score.
///
/// The sort is stable, so equal scores keep their store order.
pub fn recommend<'a>(
    all: &'a [Property],
    liked: &[&Property],
    criteria: &FilterCriteria,
) -> Vec<&'a Property> {
    let mut scored: Vec<(f64, &'a Property)> = all
        .iter()
        .filter(|p| criteria.matches(p))
        .map(|p| (score(p, liked), p))
        .collect();

    scored.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    scored.into_iter().map(|(_, p)| p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{seed_properties, PropertyType};

    fn ids(ranked: &[&Property]) -> Vec<String> {
        ranked.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn base_score_is_twice_the_rating() {
        let seed = seed_properties();
        assert_eq!(score(&seed[0], &[]), 9.0);
        assert_eq!(score(&seed[3], &[]), 7.0);
    }

    #[test]
    fn similarity_bonuses_add_up() {
        let seed = seed_properties();
        let liked = [&seed[0]];

        // same listing: city + type + rent
        assert_eq!(score(&seed[0], &liked), 9.0 + 5.0 + 3.0 + 2.0);
        // 700 apart, different city and type
        assert_eq!(score(&seed[1], &liked), 8.0);
    }

    #[test]
    fn rent_window_is_strict() {
        let seed = seed_properties();
        let mut candidate = seed[3].clone();
        candidate.city = "Elsewhere".to_string();
        candidate.property_type = PropertyType::Other("Loft".to_string());

        candidate.rent = seed[0].rent + 500.0;
        assert_eq!(score(&candidate, &[&seed[0]]), 7.0);

        candidate.rent = seed[0].rent + 499.0;
        assert_eq!(score(&candidate, &[&seed[0]]), 9.0);
    }

    #[test]
    fn city_match_is_case_sensitive() {
        let seed = seed_properties();
        let mut candidate = seed[3].clone();
        candidate.city = "new york".to_string();
        assert_eq!(score(&candidate, &[&seed[0]]), 7.0);
    }

    #[test]
    fn higher_rating_never_scores_lower() {
        let seed = seed_properties();
        let liked = [&seed[1]];
        let mut low = seed[2].clone();
        let mut high = seed[2].clone();
        low.rating = 3.0;
        high.rating = 3.1;
        assert!(score(&high, &liked) >= score(&low, &liked));
    }

    #[test]
    fn rent_band_without_likes_ranks_by_rating() {
        let seed = seed_properties();
        let criteria = FilterCriteria {
            min_rent: Some(1500.0),
            max_rent: Some(3000.0),
            ..Default::default()
        };

        let ranked = recommend(&seed, &[], &criteria);
        assert_eq!(ids(&ranked), ["1", "2"]);
    }

    #[test]
    fn likes_pull_similar_listings_up() {
        let seed = seed_properties();
        let liked = [&seed[0]];

        let ranked = recommend(&seed, &liked, &FilterCriteria::default());
        let pos = |id: &str| ranked.iter().position(|p| p.id == id).unwrap();

        assert_eq!(ranked.len(), seed.len());
        assert_eq!(pos("1"), 0);
        assert!(pos("1") < pos("4"));
        assert_eq!(ids(&ranked), ["1", "3", "2", "4"]);
    }

    #[test]
    fn no_filters_returns_every_listing() {
        let seed = seed_properties();
        let ranked = recommend(&seed, &[], &FilterCriteria::default());
        let mut got = ids(&ranked);
        got.sort();
        assert_eq!(got, ["1", "2", "3", "4"]);
    }

    #[test]
    fn ties_keep_store_order() {
        let seed = seed_properties();
        let mut twins = vec![seed[1].clone(), seed[1].clone(), seed[1].clone()];
        twins[0].id = "a".to_string();
        twins[1].id = "b".to_string();
        twins[2].id = "c".to_string();

        let ranked = recommend(&twins, &[], &FilterCriteria::default());
        assert_eq!(ids(&ranked), ["a", "b", "c"]);
    }

    #[test]
    fn repeated_calls_agree() {
        let seed = seed_properties();
        let liked = [&seed[2]];
        let criteria = FilterCriteria {
            min_rating: Some(3.0),
            ..Default::default()
        };

        let first = ids(&recommend(&seed, &liked, &criteria));
        let second = ids(&recommend(&seed, &liked, &criteria));
        assert_eq!(first, second);
    }
}
