//! Normalized place records.
//!
//! Everything the ranking pipeline touches is expressed through these types.
//! Provider-specific JSON never crosses this boundary: the places crate maps
//! raw responses into [`PlaceRecord`] and the rest of the system only ever
//! sees optional, typed fields.

use serde::{Deserialize, Serialize};

/// A WGS-style coordinate pair in floating point degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` when both components are finite and inside the
    /// latitude/longitude domain.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Price information for a place.
///
/// The provider usually reports a single per-person figure. When it does
/// supply an explicit range, both bounds are kept; filtering and sorting
/// use [`PriceLevel::lower_bound`] as the representative value either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceLevel {
    Single { value: f64 },
    Range { low: f64, high: f64 },
}

impl PriceLevel {
    #[must_use]
    pub fn lower_bound(&self) -> f64 {
        match *self {
            PriceLevel::Single { value } => value,
            PriceLevel::Range { low, .. } => low,
        }
    }
}

/// Rating dimensions reported by the provider, each on a 0.0–5.0 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub overall: Option<f64>,
    pub taste: Option<f64>,
    pub service: Option<f64>,
    pub environment: Option<f64>,
}

/// Social engagement counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub comments: u64,
    pub favorites: u64,
    pub checkins: u64,
}

/// Promotion flags. Absent provider data means `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotions {
    pub has_group_deal: bool,
    pub has_discount: bool,
}

/// One point of interest, normalized from a provider response.
///
/// Records are replaced wholesale on re-fetch; nothing merges fields from an
/// older copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub uid: String,
    pub name: String,
    pub address: Option<String>,
    pub location: Option<Coordinates>,
    pub ratings: Ratings,
    pub price: Option<PriceLevel>,
    /// Great-circle distance from the request origin in meters. Always
    /// computed locally, never taken from the provider.
    pub distance_m: Option<f64>,
    pub telephone: Option<String>,
    pub promotions: Promotions,
    /// Category and cuisine tags, e.g. `["美食", "火锅"]`.
    pub tags: Vec<String>,
    pub engagement: Engagement,
    pub hours: Option<String>,
    pub description: Option<String>,
}

impl PlaceRecord {
    /// A record with only the identifying fields populated.
    #[must_use]
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            address: None,
            location: None,
            ratings: Ratings::default(),
            price: None,
            distance_m: None,
            telephone: None,
            promotions: Promotions::default(),
            tags: Vec::new(),
            engagement: Engagement::default(),
            hours: None,
            description: None,
        }
    }

    #[must_use]
    pub fn rating(&self) -> Option<f64> {
        self.ratings.overall
    }

    #[must_use]
    pub fn price_lower_bound(&self) -> Option<f64> {
        self.price.as_ref().map(PriceLevel::lower_bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_validity_checks_domain() {
        assert!(Coordinates::new(39.9042, 116.4074).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn price_lower_bound_uses_low_end_of_range() {
        assert!((PriceLevel::Single { value: 80.0 }.lower_bound() - 80.0).abs() < f64::EPSILON);
        assert!(
            (PriceLevel::Range {
                low: 50.0,
                high: 120.0
            }
            .lower_bound()
                - 50.0)
                .abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn price_level_serializes_with_kind_tag() {
        let json = serde_json::to_value(PriceLevel::Single { value: 42.0 }).expect("serialize");
        assert_eq!(json["kind"], "single");
        assert_eq!(json["value"], 42.0);
    }

    #[test]
    fn new_record_defaults_promotions_to_false() {
        let record = PlaceRecord::new("uid-1", "Noodle Bar");
        assert!(!record.promotions.has_group_deal);
        assert!(!record.promotions.has_discount);
        assert!(record.rating().is_none());
        assert!(record.price_lower_bound().is_none());
    }
}
