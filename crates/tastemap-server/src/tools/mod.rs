//! The five restaurant tools, independent of the transport that invokes
//! them. Every argument is validated before the first upstream call.

pub mod args;
pub mod output;

#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tastemap_core::geo::centroid;
use tastemap_core::{
    comparison, keyword, rank, AppConfig, Coordinates, PlaceRecord, PriceRange, SearchConstraints,
    SortKey, ValidationError, MAX_BATCH_IDS,
};
use tastemap_places::map::check_frame;
use tastemap_places::{
    BaiduMapsClient, PlaceCache, PlaceLookup, PlacesError, SearchRequest, StaticMapRenderer,
    MAX_PAGE_SIZE, MAX_UPSTREAM_RADIUS_M,
};

use crate::error::ToolError;
use args::{CompareArgs, DetailsArgs, MapArgs, RecommendFoodArgs, SearchNearbyArgs, DEFAULT_KEYWORD};
use output::{
    score_all, CompareOutput, ImageSize, MapOutput, MapPlace, QueryEcho, RecommendOutput,
    SearchOutput,
};

/// Largest number of results a single tool call returns.
pub const MAX_RESULTS: usize = 20;
const RECOMMENDED_MIN_RADIUS_M: f64 = 50.0;
const RECOMMENDED_MAX_RADIUS_M: f64 = 3000.0;
const OVER_FETCH_FACTOR: usize = 3;

/// Tool names as exposed over both transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    RecommendFood,
    SearchNearbyRestaurants,
    GetRestaurantDetails,
    CompareRestaurants,
    GenerateRestaurantMap,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::RecommendFood,
        ToolName::SearchNearbyRestaurants,
        ToolName::GetRestaurantDetails,
        ToolName::CompareRestaurants,
        ToolName::GenerateRestaurantMap,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::RecommendFood => "recommend_food",
            ToolName::SearchNearbyRestaurants => "search_nearby_restaurants",
            ToolName::GetRestaurantDetails => "get_restaurant_details",
            ToolName::CompareRestaurants => "compare_restaurants",
            ToolName::GenerateRestaurantMap => "generate_restaurant_map",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

#[derive(Debug, Clone)]
pub struct FoodTools {
    lookup: PlaceLookup,
    maps: StaticMapRenderer,
}

impl FoodTools {
    #[must_use]
    pub fn new(lookup: PlaceLookup, maps: StaticMapRenderer) -> Self {
        Self { lookup, maps }
    }

    /// Wires the provider client, cache and map renderer from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] if the HTTP client cannot be built or the
    /// provider base URL is unusable.
    pub fn from_config(config: &AppConfig) -> Result<Self, PlacesError> {
        let client = BaiduMapsClient::with_base_url(
            &config.baidu_api_key,
            config.request_timeout_secs,
            &config.provider_base_url,
        )?
        .with_retry(config.max_retries, config.retry_backoff_base_ms);
        let maps = StaticMapRenderer::new(client.api_key(), client.base_url())?;
        let lookup = PlaceLookup::new(
            client,
            PlaceCache::from_ttl_secs(config.cache_ttl_secs),
            Duration::from_secs(config.lookup_timeout_secs),
        );
        Ok(Self::new(lookup, maps))
    }

    #[must_use]
    pub fn cache(&self) -> &PlaceCache {
        self.lookup.cache()
    }

    /// Runs the named tool with raw JSON arguments. Used by the HTTP
    /// transport; the MCP transport calls the typed methods directly.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidArguments`] when `arguments` do not fit the
    /// tool's input type, otherwise whatever the tool returns.
    pub async fn call(&self, tool: ToolName, arguments: Value) -> Result<Value, ToolError> {
        match tool {
            ToolName::RecommendFood => to_value(self.recommend_food(parse_args(arguments)?).await?),
            ToolName::SearchNearbyRestaurants => {
                to_value(self.search_nearby_restaurants(parse_args(arguments)?).await?)
            }
            ToolName::GetRestaurantDetails => {
                to_value(self.get_restaurant_details(parse_args(arguments)?).await?)
            }
            ToolName::CompareRestaurants => {
                to_value(self.compare_restaurants(parse_args(arguments)?).await?)
            }
            ToolName::GenerateRestaurantMap => {
                to_value(self.generate_restaurant_map(parse_args(arguments)?).await?)
            }
        }
    }

    /// Searches around an address, enriches candidates with full details
    /// and returns the best `num_recommend`.
    ///
    /// # Errors
    ///
    /// Validation errors for bad arguments; provider errors when geocoding
    /// or the search itself fails. Individual detail misses are not errors.
    pub async fn recommend_food(&self, args: RecommendFoodArgs) -> Result<RecommendOutput, ToolError> {
        let address = require_text(&args.address, "address")?;
        let cuisine = text_or_default(&args.cuisine_type);
        let sort_by = SortKey::parse_optional(args.sort_by.as_deref())?;
        let price_range = PriceRange::parse_optional(args.price_range.as_deref())?;
        let limit = clamp_limit(args.num_recommend, "num_recommend");
        let specific = (!keyword::is_generic(&cuisine)).then(|| cuisine.clone());

        let mut constraints = SearchConstraints {
            radius_m: Some(args.radius),
            keyword: specific.clone(),
            price_range,
            sort_by,
            groupon_only: args.groupon_only,
            discount_only: args.discount_only,
            limit: Some(limit),
            preferred_cuisine: specific,
            ..SearchConstraints::default()
        };
        constraints.validate()?;
        warn_on_unusual_radius(args.radius);
        tracing::info!(tool = "recommend_food", %address, %cuisine, limit, "tool call started");

        let origin = self.lookup.geocode(&address).await?;
        constraints.origin = Some(origin);

        let mut request = SearchRequest::new(cuisine.clone(), origin, upstream_radius(args.radius));
        request.page_size = page_size(limit.saturating_mul(OVER_FETCH_FACTOR));
        request.sort = sort_by;
        request.price_range = price_range;
        request.tag.clone_from(&constraints.preferred_cuisine);
        request.groupon_only = args.groupon_only;
        request.discount_only = args.discount_only;
        let candidates = self.lookup.search(&request).await?;

        let uids: Vec<String> = candidates.iter().map(|c| c.uid.clone()).collect();
        let details = self.lookup.details_many(&uids, true).await;
        let enriched: Vec<PlaceRecord> = candidates
            .into_iter()
            .zip(details)
            .map(|(candidate, detail)| match detail {
                Some(detail) => merge_detail(candidate, detail),
                None => candidate,
            })
            .collect();

        let ranked = rank(enriched, &constraints);
        let recommendations = score_all(ranked, constraints.preferred_cuisine.as_deref());
        tracing::info!(tool = "recommend_food", count = recommendations.len(), "tool call finished");

        Ok(RecommendOutput {
            query: QueryEcho {
                address,
                location: origin,
                keyword: cuisine,
                radius: args.radius,
                limit,
                price_range: price_range.map(|r| r.to_string()),
                sort_by,
                groupon_only: args.groupon_only,
                discount_only: args.discount_only,
                fuzzy_search: false,
            },
            count: recommendations.len(),
            recommendations,
        })
    }

    /// Keyword search around an address, optionally fanned out over related
    /// cuisines.
    ///
    /// # Errors
    ///
    /// Validation errors for bad arguments; provider errors when geocoding
    /// or the primary keyword search fails. A failed expansion search is
    /// logged and skipped.
    pub async fn search_nearby_restaurants(
        &self,
        args: SearchNearbyArgs,
    ) -> Result<SearchOutput, ToolError> {
        let address = require_text(&args.address, "address")?;
        let term = text_or_default(&args.keyword);
        let sort_by = SortKey::parse_optional(args.sort_by.as_deref())?;
        let price_range = PriceRange::parse_optional(args.price_range.as_deref())?;
        let limit = clamp_limit(args.max_results, "max_results");
        let generic = keyword::is_generic(&term);
        let expanded_keywords = if args.fuzzy_search && !generic {
            keyword::expand_cuisine(&term)
        } else {
            Vec::new()
        };

        let local_keyword = if generic {
            None
        } else if expanded_keywords.is_empty() {
            Some(term.clone())
        } else {
            let mut tokens = vec![term.clone()];
            tokens.extend(expanded_keywords.iter().cloned());
            Some(tokens.join(" "))
        };
        let mut constraints = SearchConstraints {
            radius_m: Some(args.radius),
            keyword: local_keyword,
            price_range,
            sort_by,
            limit: Some(limit),
            fuzzy: args.fuzzy_search,
            ..SearchConstraints::default()
        };
        constraints.validate()?;
        warn_on_unusual_radius(args.radius);
        tracing::info!(
            tool = "search_nearby_restaurants",
            %address,
            keyword = %term,
            fuzzy = args.fuzzy_search,
            "tool call started"
        );

        let origin = self.lookup.geocode(&address).await?;
        constraints.origin = Some(origin);

        let requests: Vec<SearchRequest> = std::iter::once(term.clone())
            .chain(expanded_keywords.iter().cloned())
            .map(|query| {
                let mut request = SearchRequest::new(query, origin, upstream_radius(args.radius));
                request.page_size = page_size(limit);
                request.sort = sort_by;
                request.price_range = price_range;
                request
            })
            .collect();
        let mut outcomes = join_all(requests.iter().map(|r| self.lookup.search(r))).await.into_iter();

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let primary = outcomes.next().unwrap_or_else(|| Ok(Vec::new()))?;
        for record in primary {
            if seen.insert(record.uid.clone()) {
                merged.push(record);
            }
        }
        for (request, outcome) in requests.iter().skip(1).zip(outcomes) {
            match outcome {
                Ok(records) => {
                    for record in records {
                        if seen.insert(record.uid.clone()) {
                            merged.push(record);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(query = %request.query, error = %err, "expansion search failed");
                }
            }
        }

        let ranked = rank(merged, &constraints);
        let results = score_all(ranked, None);
        tracing::info!(tool = "search_nearby_restaurants", count = results.len(), "tool call finished");

        Ok(SearchOutput {
            query: QueryEcho {
                address,
                location: origin,
                keyword: term,
                radius: args.radius,
                limit,
                price_range: price_range.map(|r| r.to_string()),
                sort_by,
                groupon_only: false,
                discount_only: false,
                fuzzy_search: args.fuzzy_search,
            },
            expanded_keywords,
            count: results.len(),
            results,
        })
    }

    /// Full record for one place, served from the cache unless `refresh`.
    ///
    /// # Errors
    ///
    /// [`ToolError::NotFound`] for an unknown uid, provider errors otherwise.
    pub async fn get_restaurant_details(&self, args: DetailsArgs) -> Result<PlaceRecord, ToolError> {
        let uid = require_text(&args.uid, "uid")?;
        tracing::info!(tool = "get_restaurant_details", %uid, refresh = args.refresh, "tool call started");
        let record = self.lookup.detail(&uid, args.refresh).await?;
        tracing::info!(tool = "get_restaurant_details", %uid, "tool call finished");
        Ok(record)
    }

    /// Side-by-side rows for up to ten places, in the order given.
    ///
    /// # Errors
    ///
    /// Only validation errors; lookup misses become `not_found` entries.
    pub async fn compare_restaurants(&self, args: CompareArgs) -> Result<CompareOutput, ToolError> {
        let uids = comparison::validate_ids(&args.uids, MAX_BATCH_IDS)?;
        tracing::info!(tool = "compare_restaurants", count = uids.len(), "tool call started");

        let details = self.lookup.details_many(&uids, false).await;
        let found: HashMap<&str, PlaceRecord> = uids
            .iter()
            .map(String::as_str)
            .zip(details)
            .filter_map(|(uid, record)| record.map(|r| (uid, r)))
            .collect();
        let entries = comparison::build(&uids, |uid| found.get(uid).cloned());
        let missing: Vec<String> = entries
            .iter()
            .filter(|e| !e.is_found())
            .map(|e| e.uid().to_string())
            .collect();

        tracing::info!(
            tool = "compare_restaurants",
            found = entries.len() - missing.len(),
            missing = missing.len(),
            "tool call finished"
        );
        Ok(CompareOutput {
            count: entries.len(),
            comparison: entries,
            missing,
        })
    }

    /// Static map URL with one marker per locatable place.
    ///
    /// # Errors
    ///
    /// Validation errors for bad ids, size or zoom; [`ToolError::NotFound`]
    /// when none of the places can be located.
    pub async fn generate_restaurant_map(&self, args: MapArgs) -> Result<MapOutput, ToolError> {
        let uids = comparison::validate_ids(&args.uids, MAX_BATCH_IDS)?;
        check_frame(args.width, args.height, args.zoom)?;
        tracing::info!(tool = "generate_restaurant_map", count = uids.len(), "tool call started");

        let details = self.lookup.details_many(&uids, false).await;
        let mut places = Vec::new();
        let mut skipped = Vec::new();
        for (uid, record) in uids.into_iter().zip(details) {
            let located = record.and_then(|r| {
                let location = r.location.filter(Coordinates::is_valid)?;
                Some((r, location))
            });
            match located {
                Some((record, location)) => places.push(MapPlace {
                    uid,
                    name: record.name,
                    address: record.address,
                    location,
                }),
                None => skipped.push(uid),
            }
        }

        let points: Vec<Coordinates> = places.iter().map(|p| p.location).collect();
        let center = centroid(&points).ok_or_else(|| {
            ToolError::NotFound("none of the requested places could be located".to_string())
        })?;
        let map_url = self
            .maps
            .build_map_request(&points, args.width, args.height, args.zoom)?;

        tracing::info!(
            tool = "generate_restaurant_map",
            plotted = places.len(),
            skipped = skipped.len(),
            "tool call finished"
        );
        Ok(MapOutput {
            map_url: map_url.to_string(),
            center,
            size: ImageSize {
                width: args.width,
                height: args.height,
            },
            zoom: args.zoom,
            places,
            skipped,
        })
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    let arguments = if arguments.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn to_value<T: Serialize>(output: T) -> Result<Value, ToolError> {
    serde_json::to_value(output).map_err(|e| ToolError::Upstream(format!("failed to encode output: {e}")))
}

fn require_text(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

fn text_or_default(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        DEFAULT_KEYWORD.to_string()
    } else {
        trimmed.to_string()
    }
}

fn clamp_limit(requested: usize, field: &str) -> usize {
    if requested > MAX_RESULTS {
        tracing::warn!(field, requested, max = MAX_RESULTS, "result limit clamped");
        MAX_RESULTS
    } else {
        requested
    }
}

fn warn_on_unusual_radius(radius: f64) {
    if !(RECOMMENDED_MIN_RADIUS_M..=RECOMMENDED_MAX_RADIUS_M).contains(&radius) {
        tracing::warn!(
            radius,
            min = RECOMMENDED_MIN_RADIUS_M,
            max = RECOMMENDED_MAX_RADIUS_M,
            "radius outside the recommended range"
        );
    }
}

/// Radius sent upstream, rounded up to whole meters and capped.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn upstream_radius(radius: f64) -> u32 {
    radius.ceil().min(f64::from(MAX_UPSTREAM_RADIUS_M)) as u32
}

fn page_size(wanted: usize) -> u32 {
    u32::try_from(wanted).unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// The detail payload is authoritative, but it carries no distance and
/// sometimes no location; those come from the search record.
fn merge_detail(candidate: PlaceRecord, mut detail: PlaceRecord) -> PlaceRecord {
    if detail.location.is_none() {
        detail.location = candidate.location;
    }
    if detail.distance_m.is_none() {
        detail.distance_m = candidate.distance_m;
    }
    detail
}
