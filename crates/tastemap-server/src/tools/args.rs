use rmcp::schemars;
use serde::Deserialize;

pub(crate) const DEFAULT_KEYWORD: &str = "餐厅";

fn default_keyword() -> String {
    DEFAULT_KEYWORD.to_string()
}

fn default_radius() -> f64 {
    1000.0
}

fn default_num_recommend() -> usize {
    5
}

fn default_max_results() -> usize {
    10
}

fn default_width() -> u32 {
    400
}

fn default_height() -> u32 {
    300
}

fn default_zoom() -> u8 {
    15
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct RecommendFoodArgs {
    #[schemars(description = "Address or landmark to search around, e.g. 北京市海淀区中关村")]
    pub address: String,
    #[serde(default = "default_keyword")]
    #[schemars(description = "Cuisine to look for, e.g. 火锅 or 川菜. Defaults to 餐厅 (any)")]
    pub cuisine_type: String,
    #[serde(default = "default_radius")]
    #[schemars(description = "Search radius in meters (default 1000)")]
    pub radius: f64,
    #[serde(default = "default_num_recommend")]
    #[schemars(description = "Number of recommendations to return (default 5, at most 20)")]
    pub num_recommend: usize,
    #[serde(default)]
    #[schemars(description = "Per-person price bucket such as 50-100 or 400+")]
    pub price_range: Option<String>,
    #[serde(default)]
    #[schemars(description = "One of rating, distance, price, composite (default composite)")]
    pub sort_by: Option<String>,
    #[serde(default)]
    #[schemars(description = "Only places with a group-buying deal")]
    pub groupon_only: bool,
    #[serde(default)]
    #[schemars(description = "Only places with a discount")]
    pub discount_only: bool,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct SearchNearbyArgs {
    #[schemars(description = "Address or landmark to search around")]
    pub address: String,
    #[serde(default = "default_keyword")]
    #[schemars(description = "Search keyword (default 餐厅)")]
    pub keyword: String,
    #[serde(default = "default_radius")]
    #[schemars(description = "Search radius in meters (default 1000)")]
    pub radius: f64,
    #[serde(default = "default_max_results")]
    #[schemars(description = "Maximum number of results (default 10, at most 20)")]
    pub max_results: usize,
    #[serde(default)]
    #[schemars(description = "Per-person price bucket such as 0-50 or 200-400")]
    pub price_range: Option<String>,
    #[serde(default)]
    #[schemars(description = "One of rating, distance, price, composite (default composite)")]
    pub sort_by: Option<String>,
    #[serde(default)]
    #[schemars(description = "Expand the keyword to related cuisines and search those too")]
    pub fuzzy_search: bool,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct DetailsArgs {
    #[schemars(description = "Place uid as returned by a search")]
    pub uid: String,
    #[serde(default)]
    #[schemars(description = "Bypass the cache and fetch fresh details")]
    pub refresh: bool,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct CompareArgs {
    #[schemars(description = "Place uids to compare (1 to 10)")]
    pub uids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct MapArgs {
    #[schemars(description = "Place uids to plot (1 to 10)")]
    pub uids: Vec<String>,
    #[serde(default = "default_width")]
    #[schemars(description = "Image width in pixels (default 400, at most 1024)")]
    pub width: u32,
    #[serde(default = "default_height")]
    #[schemars(description = "Image height in pixels (default 300, at most 1024)")]
    pub height: u32,
    #[serde(default = "default_zoom")]
    #[schemars(description = "Zoom level 3 to 19 (default 15)")]
    pub zoom: u8,
}
