//! JSON shapes returned by the tools.

use serde::Serialize;
use tastemap_core::scoring::composite_score;
use tastemap_core::{ComparisonEntry, Coordinates, PlaceRecord, SortKey};

/// A place plus the composite score it was ranked with.
#[derive(Debug, Clone, Serialize)]
pub struct RankedPlace {
    #[serde(flatten)]
    pub place: PlaceRecord,
    pub composite_score: f64,
}

pub(crate) fn score_all(records: Vec<PlaceRecord>, preferred: Option<&str>) -> Vec<RankedPlace> {
    records
        .into_iter()
        .map(|place| {
            let composite_score = composite_score(&place, preferred);
            RankedPlace {
                place,
                composite_score,
            }
        })
        .collect()
}

/// The resolved query, echoed so callers can see what was actually searched.
#[derive(Debug, Clone, Serialize)]
pub struct QueryEcho {
    pub address: String,
    pub location: Coordinates,
    pub keyword: String,
    pub radius: f64,
    pub limit: usize,
    pub price_range: Option<String>,
    pub sort_by: SortKey,
    pub groupon_only: bool,
    pub discount_only: bool,
    pub fuzzy_search: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendOutput {
    pub query: QueryEcho,
    pub count: usize,
    pub recommendations: Vec<RankedPlace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutput {
    pub query: QueryEcho,
    pub expanded_keywords: Vec<String>,
    pub count: usize,
    pub results: Vec<RankedPlace>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompareOutput {
    pub count: usize,
    pub comparison: Vec<ComparisonEntry>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapPlace {
    pub uid: String,
    pub name: String,
    pub address: Option<String>,
    pub location: Coordinates,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MapOutput {
    pub map_url: String,
    pub center: Coordinates,
    pub size: ImageSize,
    pub zoom: u8,
    pub places: Vec<MapPlace>,
    /// Ids that could not be looked up or have no coordinates.
    pub skipped: Vec<String>,
}
