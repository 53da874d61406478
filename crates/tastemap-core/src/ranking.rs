//! Filter, sort and truncate a candidate list into a recommendation set.
//!
//! [`rank`] is total and deterministic: the same input always yields the same
//! output sequence. All comparisons use `f64::total_cmp` and the sort is
//! stable, so ties keep their input order once every tie-break is exhausted.

use std::cmp::Ordering;

use crate::constraints::{SearchConstraints, SortKey};
use crate::geo::haversine_m;
use crate::keyword;
use crate::place::PlaceRecord;
use crate::scoring::composite_score;

/// Runs the full pipeline: distance annotation, filtering, sorting and
/// truncation.
///
/// When the constraints carry an origin, every record's `distance_m` is
/// recomputed from it (records without coordinates get `None`). Without an
/// origin, whatever distance the record already has is used as-is.
#[must_use]
pub fn rank(records: Vec<PlaceRecord>, constraints: &SearchConstraints) -> Vec<PlaceRecord> {
    let mut ranked: Vec<PlaceRecord> = records
        .into_iter()
        .map(|mut r| {
            if let Some(origin) = constraints.origin {
                r.distance_m = r.location.map(|loc| haversine_m(origin, loc));
            }
            r
        })
        .filter(|r| passes_filters(r, constraints))
        .collect();

    sort_records(&mut ranked, constraints);

    if let Some(limit) = constraints.limit {
        ranked.truncate(limit);
    }
    ranked
}

/// Whether a record survives the filtering stage.
///
/// A record with unknown distance is dropped when a radius is set. A record
/// with no price is dropped when a price range is set.
#[must_use]
pub fn passes_filters(record: &PlaceRecord, c: &SearchConstraints) -> bool {
    if let Some(radius) = c.radius_m {
        match record.distance_m {
            Some(d) if d <= radius => {}
            _ => return false,
        }
    }

    if let Some(range) = c.price_range {
        match record.price_lower_bound() {
            Some(p) if range.contains(p) => {}
            _ => return false,
        }
    }

    if c.groupon_only && !record.promotions.has_group_deal {
        return false;
    }
    if c.discount_only && !record.promotions.has_discount {
        return false;
    }

    match c.keyword.as_deref() {
        Some(k) => keyword::matches(record, k, c.fuzzy),
        None => true,
    }
}

/// Stable sort by the requested key.
pub fn sort_records(records: &mut [PlaceRecord], c: &SearchConstraints) {
    match c.sort_by {
        SortKey::Rating => records.sort_by(|a, b| {
            desc_nulls_last(a.rating(), b.rating())
                .then_with(|| asc_nulls_last(a.distance_m, b.distance_m))
        }),
        SortKey::Distance => records.sort_by(|a, b| asc_nulls_last(a.distance_m, b.distance_m)),
        SortKey::Price => {
            records.sort_by(|a, b| asc_nulls_last(a.price_lower_bound(), b.price_lower_bound()));
        }
        SortKey::Composite => {
            let preferred = c.preferred_cuisine.as_deref();
            records.sort_by_cached_key(|r| CompositeKey {
                score: composite_score(r, preferred),
                distance: r.distance_m,
            });
        }
    }
}

/// Descending, `None` after every `Some`.
fn desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending, `None` after every `Some`.
fn asc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort key for composite ordering: higher score first, then nearer first.
#[derive(Debug, Clone, Copy)]
struct CompositeKey {
    score: f64,
    distance: Option<f64>,
}

impl PartialEq for CompositeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CompositeKey {}

impl PartialOrd for CompositeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompositeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| asc_nulls_last(self.distance, other.distance))
    }
}

#[cfg(test)]
#[path = "ranking_test.rs"]
mod tests;
