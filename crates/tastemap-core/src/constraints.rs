//! Caller-supplied filter, sort and limit parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::place::Coordinates;

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Highest rating first; unrated places last; ties by distance.
    Rating,
    /// Nearest first.
    Distance,
    /// Cheapest first by the lower price bound; unpriced places last.
    Price,
    /// Weighted blend of ratings, engagement and price; ties by distance.
    #[default]
    Composite,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Rating => "rating",
            SortKey::Distance => "distance",
            SortKey::Price => "price",
            SortKey::Composite => "composite",
        }
    }

    /// Parses an optional caller value; absent or blank means the default.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnsupportedSortKey`] for unknown names.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, ValidationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(SortKey::default()),
            Some(s) => s.parse(),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rating" => Ok(SortKey::Rating),
            "distance" => Ok(SortKey::Distance),
            "price" => Ok(SortKey::Price),
            "composite" | "score" => Ok(SortKey::Composite),
            _ => Err(ValidationError::UnsupportedSortKey(s.to_string())),
        }
    }
}

/// Inclusive per-person price bounds. `max == None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: Option<f64>,
}

impl PriceRange {
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && self.max.is_none_or(|max| value <= max)
    }

    /// Parses `"lo-hi"` or `"lo+"`, e.g. `"50-100"` or `"400+"`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPriceRange`] when the bounds are not
    /// numbers, are negative, or are inverted.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidPriceRange {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        let parse_bound = |s: &str| -> Result<f64, ValidationError> {
            let v = s
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid("bounds must be numbers"))?;
            if !v.is_finite() || v < 0.0 {
                return Err(invalid("bounds must be non-negative"));
            }
            Ok(v)
        };

        let trimmed = input.trim();
        if let Some(lo) = trimmed.strip_suffix('+') {
            return Ok(Self {
                min: parse_bound(lo)?,
                max: None,
            });
        }

        let (lo, hi) = trimmed
            .split_once('-')
            .ok_or_else(|| invalid("expected \"lo-hi\" or \"lo+\""))?;
        let min = parse_bound(lo)?;
        let max = parse_bound(hi)?;
        if min > max {
            return Err(invalid("lower bound exceeds upper bound"));
        }
        Ok(Self {
            min,
            max: Some(max),
        })
    }

    /// Parses an optional caller value; absent or blank means no filter.
    ///
    /// # Errors
    ///
    /// See [`PriceRange::parse`].
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, ValidationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Self::parse(s).map(Some),
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

/// The full constraint set for one ranking pass.
///
/// Every field is optional in effect: with the default value the filtering
/// stage keeps everything and only sorting applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchConstraints {
    pub origin: Option<Coordinates>,
    pub radius_m: Option<f64>,
    pub keyword: Option<String>,
    pub price_range: Option<PriceRange>,
    pub sort_by: SortKey,
    pub groupon_only: bool,
    pub discount_only: bool,
    pub limit: Option<usize>,
    pub fuzzy: bool,
    /// Cuisine the caller prefers; boosts the composite score.
    pub preferred_cuisine: Option<String>,
}

impl SearchConstraints {
    /// Checks the constraint set for values that can never be satisfied.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NonPositiveRadius`] for a zero, negative or
    ///   non-finite radius.
    /// - [`ValidationError::ZeroLimit`] for `limit == Some(0)`.
    /// - [`ValidationError::InvalidCoordinates`] for an origin off the globe.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(radius) = self.radius_m {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(ValidationError::NonPositiveRadius(radius));
            }
        }
        if self.limit == Some(0) {
            return Err(ValidationError::ZeroLimit);
        }
        if let Some(origin) = self.origin {
            if !origin.is_valid() {
                return Err(ValidationError::InvalidCoordinates {
                    lat: origin.lat,
                    lng: origin.lng,
                });
            }
        }
        Ok(())
    }
}
