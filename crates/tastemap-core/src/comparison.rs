//! Side-by-side comparison of several places.
//!
//! Output order is exactly the caller's id order. An id the lookup cannot
//! resolve becomes a [`ComparisonEntry::NotFound`] placeholder in its slot;
//! one bad id never fails the batch.

use serde::Serialize;

use crate::error::ValidationError;
use crate::place::{PlaceRecord, PriceLevel};
use crate::scoring::composite_score;

/// Upper bound on ids accepted by batch operations.
pub const MAX_BATCH_IDS: usize = 10;

/// The subset of a [`PlaceRecord`] shown in a comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub uid: String,
    pub name: String,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub taste_rating: Option<f64>,
    pub service_rating: Option<f64>,
    pub environment_rating: Option<f64>,
    pub price: Option<PriceLevel>,
    pub comment_num: u64,
    pub favorite_num: u64,
    pub checkin_num: u64,
    pub tags: Vec<String>,
    pub hours: Option<String>,
    pub has_group_deal: bool,
    pub has_discount: bool,
    pub composite_score: f64,
}

impl From<&PlaceRecord> for ComparisonRow {
    fn from(r: &PlaceRecord) -> Self {
        Self {
            uid: r.uid.clone(),
            name: r.name.clone(),
            address: r.address.clone(),
            rating: r.ratings.overall,
            taste_rating: r.ratings.taste,
            service_rating: r.ratings.service,
            environment_rating: r.ratings.environment,
            price: r.price,
            comment_num: r.engagement.comments,
            favorite_num: r.engagement.favorites,
            checkin_num: r.engagement.checkins,
            tags: r.tags.clone(),
            hours: r.hours.clone(),
            has_group_deal: r.promotions.has_group_deal,
            has_discount: r.promotions.has_discount,
            composite_score: composite_score(r, None),
        }
    }
}

/// One slot of a comparison: either the projected row or a miss marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonEntry {
    Found(ComparisonRow),
    NotFound { uid: String },
}

impl ComparisonEntry {
    #[must_use]
    pub fn uid(&self) -> &str {
        match self {
            ComparisonEntry::Found(row) => &row.uid,
            ComparisonEntry::NotFound { uid } => uid,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, ComparisonEntry::Found(_))
    }
}

/// Builds a comparison in caller order, resolving each id through `lookup`.
pub fn build<F>(ids: &[String], mut lookup: F) -> Vec<ComparisonEntry>
where
    F: FnMut(&str) -> Option<PlaceRecord>,
{
    ids.iter()
        .map(|id| match lookup(id) {
            Some(record) => ComparisonEntry::Found(ComparisonRow::from(&record)),
            None => ComparisonEntry::NotFound { uid: id.clone() },
        })
        .collect()
}

/// Trims and checks a caller-supplied id list.
///
/// # Errors
///
/// - [`ValidationError::Empty`] when no non-blank id remains.
/// - [`ValidationError::TooManyIds`] when more than `max` ids are given.
pub fn validate_ids(ids: &[String], max: usize) -> Result<Vec<String>, ValidationError> {
    let cleaned: Vec<String> = ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    if cleaned.is_empty() {
        return Err(ValidationError::Empty { field: "uids" });
    }
    if cleaned.len() > max {
        return Err(ValidationError::TooManyIds {
            max,
            got: cleaned.len(),
        });
    }
    Ok(cleaned)
}
