//! Great-circle distance helpers.
//!
//! Every distance reported anywhere in the system comes from
//! [`haversine_m`], so numbers from different tools are directly comparable.

use crate::place::Coordinates;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points in meters.
#[must_use]
pub fn haversine_m(a: Coordinates, b: Coordinates) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Arithmetic mean of a set of points. A single point is its own center.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn centroid(points: &[Coordinates]) -> Option<Coordinates> {
    if points.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(Coordinates::new(lat_sum / n, lng_sum / n))
}

/// Moves `origin` due north by `meters`. Used to build fixtures at known
/// distances.
#[must_use]
pub fn offset_north(origin: Coordinates, meters: f64) -> Coordinates {
    let d_lat = (meters / EARTH_RADIUS_M).to_degrees();
    Coordinates::new(origin.lat + d_lat, origin.lng)
}
