//! Normalization of Baidu Maps place payloads into [`PlaceRecord`]s.

use tastemap_core::geo::haversine_m;
use tastemap_core::{Coordinates, Engagement, PlaceRecord, PriceLevel, Promotions, Ratings};

use crate::types::{RawDetailInfo, RawLocation, RawPlace};

/// Separator the provider uses inside `detail_info.tag`.
const TAG_SEPARATOR: char = ';';

impl From<RawLocation> for Coordinates {
    fn from(raw: RawLocation) -> Self {
        Coordinates::new(raw.lat, raw.lng)
    }
}

/// Parses the provider's price text.
///
/// `"88"` becomes a single value and `"50-120"` a range. Zero, negative and
/// unparseable prices are treated as absent.
#[must_use]
pub fn parse_price(raw: &str) -> Option<PriceLevel> {
    let raw = raw.trim();
    if let Some((lo, hi)) = raw.split_once('-') {
        let low = lo.trim().parse::<f64>().ok()?;
        let high = hi.trim().parse::<f64>().ok()?;
        if low.is_finite() && high.is_finite() && low >= 0.0 && high >= low && high > 0.0 {
            return Some(PriceLevel::Range { low, high });
        }
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|value| PriceLevel::Single { value })
}

/// Splits `"美食;火锅"` into trimmed, non-empty tags.
#[must_use]
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Converts a raw place into a [`PlaceRecord`].
///
/// Returns `None` when the payload carries no uid, since nothing downstream
/// can address such a record. When `origin` is given the distance is
/// computed locally; the provider's own distance figure is never used.
#[must_use]
pub fn normalize_place(raw: RawPlace, origin: Option<Coordinates>) -> Option<PlaceRecord> {
    let uid = non_blank(raw.uid)?;
    let name = non_blank(raw.name).unwrap_or_default();
    let info = raw.detail_info.unwrap_or_default();
    let location = raw
        .location
        .map(Coordinates::from)
        .filter(Coordinates::is_valid);

    let RawDetailInfo {
        tag,
        overall_rating,
        taste_rating,
        service_rating,
        environment_rating,
        price,
        comment_num,
        favorite_num,
        checkin_num,
        groupon_num,
        discount_num,
        shop_hours,
        hours,
        description,
    } = info;

    Some(PlaceRecord {
        uid,
        name,
        address: non_blank(raw.address),
        location,
        ratings: Ratings {
            overall: overall_rating,
            taste: taste_rating,
            service: service_rating,
            environment: environment_rating,
        },
        price: price.as_deref().and_then(parse_price),
        distance_m: origin.zip(location).map(|(o, l)| haversine_m(o, l)),
        telephone: non_blank(raw.telephone),
        promotions: Promotions {
            has_group_deal: groupon_num.is_some_and(|n| n > 0),
            has_discount: discount_num.is_some_and(|n| n > 0),
        },
        tags: tag.as_deref().map(split_tags).unwrap_or_default(),
        engagement: Engagement {
            comments: comment_num.unwrap_or(0),
            favorites: favorite_num.unwrap_or(0),
            checkins: checkin_num.unwrap_or(0),
        },
        hours: non_blank(shop_hours).or_else(|| non_blank(hours)),
        description: non_blank(description),
    })
}
