//! Baidu Maps API response types.
//!
//! Every endpoint wraps its payload in a `{"status": 0, "message": "ok", ...}`
//! envelope. Numeric fields inside `detail_info` arrive as JSON numbers on
//! some records and as strings (sometimes empty) on others, so they go
//! through the lenient deserializers at the bottom of this file.

use serde::{Deserialize, Deserializer};

/// Common envelope fields. `status == 0` means success.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub status: i64,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// geocoding/v3
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub result: Option<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub location: RawLocation,
    #[serde(default)]
    pub precise: Option<i64>,
    #[serde(default)]
    pub confidence: Option<i64>,
    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawLocation {
    pub lat: f64,
    pub lng: f64,
}

// ---------------------------------------------------------------------------
// place/v2/search and place/v2/detail
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<RawPlace>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `place/v2/detail` returns a single place under `result`. A uid the
/// provider does not know yields an empty object or no `result` at all.
#[derive(Debug, Deserialize)]
pub struct DetailResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
}

/// One place in the provider's native shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlace {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub detail_info: Option<RawDetailInfo>,
}

/// The `scope=2` block with ratings, price and engagement counters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDetailInfo {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub overall_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub taste_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub service_rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub environment_rating: Option<f64>,
    /// Kept as text: usually a per-person figure, occasionally `"lo-hi"`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub comment_num: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub favorite_num: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub checkin_num: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub groupon_num: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub discount_num: Option<u64>,
    #[serde(default)]
    pub shop_hours: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite()))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.and_then(|s| {
        s.parse::<u64>().ok().or_else(|| {
            // Some counters come back as "12.0".
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| v as u64)
        })
    }))
}
