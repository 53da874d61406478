//! Composite score used by [`SortKey::Composite`](crate::SortKey::Composite).
//!
//! Blends the rating dimensions, social engagement and a price-sanity factor
//! into one number. The weights are fixed:
//!
//! | Component    | Weight |
//! |--------------|--------|
//! | ratings      | 0.50   |
//! | engagement   | 0.25   |
//! | price factor | 0.15   |
//!
//! A record whose tags contain the caller's preferred cuisine gets a 10 %
//! boost on top.

use crate::place::PlaceRecord;

const RATING_WEIGHT: f64 = 0.5;
const SOCIAL_WEIGHT: f64 = 0.25;
const PRICE_WEIGHT: f64 = 0.15;
const CUISINE_BOOST: f64 = 1.1;

/// Per-person price band considered good value.
const FAIR_PRICE: std::ops::RangeInclusive<f64> = 50.0..=200.0;
const EXPENSIVE_PRICE: f64 = 500.0;

/// Rating component: the overall rating alone, or a weighted blend when any
/// sub-rating is known.
#[must_use]
pub fn rating_component(record: &PlaceRecord) -> f64 {
    let r = &record.ratings;
    let overall = r.overall.unwrap_or(0.0);
    let taste = r.taste.unwrap_or(0.0);
    let service = r.service.unwrap_or(0.0);
    let environment = r.environment.unwrap_or(0.0);

    if taste > 0.0 || service > 0.0 || environment > 0.0 {
        taste * 0.3 + service * 0.2 + environment * 0.2 + overall * 0.3
    } else {
        overall
    }
}

/// Engagement component in `[0, 1]`.
#[must_use]
pub fn social_component(record: &PlaceRecord) -> f64 {
    let e = &record.engagement;
    let weighted = e
        .comments
        .saturating_add(e.favorites.saturating_mul(2))
        .saturating_add(e.checkins);
    #[allow(clippy::cast_precision_loss)]
    let scaled = weighted as f64 / 100.0;
    scaled.min(10.0) / 10.0
}

#[must_use]
pub fn price_factor(record: &PlaceRecord) -> f64 {
    match record.price_lower_bound() {
        Some(p) if p > 0.0 && FAIR_PRICE.contains(&p) => 1.1,
        Some(p) if p > EXPENSIVE_PRICE => 0.9,
        _ => 1.0,
    }
}

/// The full composite score.
#[must_use]
pub fn composite_score(record: &PlaceRecord, preferred_cuisine: Option<&str>) -> f64 {
    let score = rating_component(record) * RATING_WEIGHT
        + social_component(record) * SOCIAL_WEIGHT
        + price_factor(record) * PRICE_WEIGHT;

    match preferred_cuisine.map(str::trim) {
        Some(cuisine) if !cuisine.is_empty() && record.tags.iter().any(|t| t.contains(cuisine)) => {
            score * CUISINE_BOOST
        }
        _ => score,
    }
}
