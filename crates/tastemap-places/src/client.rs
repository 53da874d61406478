//! HTTP client for the Baidu Maps web service API.
//!
//! Wraps `reqwest` with API key management, envelope status checking, retry
//! with back-off and typed response deserialization. Every endpoint checks
//! the numeric `"status"` field of the JSON envelope; quota and permission
//! rejections surface as [`PlacesError::RateLimited`], everything else
//! non-zero as [`PlacesError::Api`].

use std::time::Duration;

use reqwest::{Client, Url};
use tastemap_core::{Coordinates, PriceRange, SortKey};

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{DetailResponse, Envelope, GeocodeResponse, RawPlace, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.map.baidu.com/";

/// Largest page the place search endpoint will return.
pub const MAX_PAGE_SIZE: u32 = 20;

/// Largest radius the place search endpoint accepts, in meters.
pub const MAX_UPSTREAM_RADIUS_M: u32 = 50_000;

/// Envelope statuses that mean "slow down or fix the key", not "bad request".
const RATE_LIMIT_STATUSES: &[i64] = &[4, 301, 302, 401, 402];

/// Parameters for one `place/v2/search` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub origin: Coordinates,
    pub radius_m: u32,
    pub page_size: u32,
    pub sort: SortKey,
    pub price_range: Option<PriceRange>,
    /// Category tag such as `火锅`, sent as the `tag` parameter.
    pub tag: Option<String>,
    pub groupon_only: bool,
    pub discount_only: bool,
}

impl SearchRequest {
    #[must_use]
    pub fn new(query: impl Into<String>, origin: Coordinates, radius_m: u32) -> Self {
        Self {
            query: query.into(),
            origin,
            radius_m,
            page_size: MAX_PAGE_SIZE,
            sort: SortKey::default(),
            price_range: None,
            tag: None,
            groupon_only: false,
            discount_only: false,
        }
    }

    /// The `filter` parameter: always restricted to catering, plus whatever
    /// sort, price and promotion hints apply.
    ///
    /// The hints only narrow what the provider sends back; the ranking
    /// pipeline enforces every constraint again on the normalized records.
    #[must_use]
    pub fn filter_param(&self) -> String {
        let mut parts = vec!["industry_type:cater".to_string()];
        let sort_hint = match self.sort {
            SortKey::Rating => Some(("overall_rating", 0)),
            SortKey::Distance => Some(("distance", 1)),
            SortKey::Price => Some(("price", 1)),
            SortKey::Composite => None,
        };
        if let Some((name, rule)) = sort_hint {
            parts.push(format!("sort_name:{name}"));
            parts.push(format!("sort_rule:{rule}"));
        }
        if let Some(PriceRange {
            min,
            max: Some(max),
        }) = self.price_range
        {
            parts.push(format!("price_section:{min},{max}"));
        }
        if self.groupon_only {
            parts.push("groupon:1".to_string());
        }
        if self.discount_only {
            parts.push("discount:1".to_string());
        }
        parts.join("|")
    }
}

/// Client for the Baidu Maps REST API.
///
/// Manages the HTTP client, API key, base URL and retry policy. Use
/// [`BaiduMapsClient::new`] for production or
/// [`BaiduMapsClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct BaiduMapsClient {
    client: Client,
    api_key: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl BaiduMapsClient {
    /// Creates a new client pointed at the production Baidu Maps API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("tastemap/0.1 (restaurant-recommendation)")
            .build()?;

        // Exactly one trailing slash, so endpoint paths join under the base
        // rather than replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| PlacesError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
            max_retries: 2,
            backoff_base_ms: 1_000,
        })
    }

    /// Overrides the retry policy for transient failures.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Resolves a free-form address to coordinates.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NotFound`] if the provider has no match.
    /// - [`PlacesError::RateLimited`] / [`PlacesError::Api`] on a non-zero
    ///   envelope status.
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] on an unexpected response shape.
    pub async fn geocode(&self, address: &str) -> Result<Coordinates, PlacesError> {
        let url = self.build_url("geocoding/v3/", &[("address", address)])?;
        let context = format!("geocode(address={address})");

        let response: GeocodeResponse = self.fetch_with_retry(&url, &context).await?;

        let location = response
            .result
            .map(|r| Coordinates::from(r.location))
            .filter(Coordinates::is_valid)
            .ok_or_else(|| PlacesError::NotFound(format!("no location for address \"{address}\"")))?;

        tracing::debug!(address, lat = location.lat, lng = location.lng, "geocoded address");
        Ok(location)
    }

    /// Searches for catering places around `request.origin`.
    ///
    /// A zero-result response is a valid, empty `Vec`, whether the provider
    /// reports it as an empty page or as a "no results" status.
    ///
    /// # Errors
    ///
    /// Same as [`BaiduMapsClient::geocode`], minus `NotFound`.
    pub async fn search_nearby(&self, request: &SearchRequest) -> Result<Vec<RawPlace>, PlacesError> {
        let location = format!("{},{}", request.origin.lat, request.origin.lng);
        let radius = request.radius_m.min(MAX_UPSTREAM_RADIUS_M).to_string();
        let page_size = request.page_size.clamp(1, MAX_PAGE_SIZE).to_string();
        let filter = request.filter_param();
        let mut params: Vec<(&str, &str)> = vec![
            ("query", request.query.as_str()),
            ("location", location.as_str()),
            ("radius", radius.as_str()),
            ("scope", "2"),
            ("page_size", page_size.as_str()),
            ("page_num", "0"),
            ("filter", filter.as_str()),
        ];
        if let Some(tag) = request.tag.as_deref().filter(|t| !t.trim().is_empty()) {
            params.push(("tag", tag));
        }
        let url = self.build_url("place/v2/search", &params)?;
        let context = format!("search(query={})", request.query);

        let response: SearchResponse = match self.fetch_with_retry(&url, &context).await {
            Ok(response) => response,
            Err(PlacesError::NotFound(message)) => {
                tracing::debug!(query = %request.query, %message, "place search found nothing");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(
            query = %request.query,
            radius_m = request.radius_m,
            returned = response.results.len(),
            total = ?response.total,
            "place search complete"
        );
        Ok(response.results)
    }

    /// Fetches the full detail record for one place.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::NotFound`] if the uid resolves to nothing.
    /// - Otherwise as [`BaiduMapsClient::geocode`].
    pub async fn place_detail(&self, uid: &str) -> Result<RawPlace, PlacesError> {
        let url = self.build_url("place/v2/detail", &[("uid", uid), ("scope", "2")])?;
        let context = format!("detail(uid={uid})");

        let response: DetailResponse = self.fetch_with_retry(&url, &context).await?;

        let result = response
            .result
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
            .ok_or_else(|| PlacesError::NotFound(format!("no place with uid \"{uid}\"")))?;

        let place: RawPlace =
            serde_json::from_value(result).map_err(|e| PlacesError::Deserialize {
                context: context.clone(),
                source: e,
            })?;
        if place.uid.as_deref().is_none_or(|u| u.trim().is_empty()) {
            return Err(PlacesError::NotFound(format!("no place with uid \"{uid}\"")));
        }
        Ok(place)
    }

    /// Builds the full request URL with properly percent-encoded query parameters.
    ///
    /// Joins `path` onto the base URL and appends `ak`, `output=json` and any
    /// extra parameters via [`Url::query_pairs_mut`].
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Result<Url, PlacesError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ak", &self.api_key);
            pairs.append_pair("output", "json");
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn fetch_with_retry<T>(&self, url: &Url, context: &str) -> Result<T, PlacesError>
    where
        T: serde::de::DeserializeOwned,
    {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, move || {
            self.fetch(url, context)
        })
        .await
    }

    /// One attempt: GET, status check, typed decode.
    async fn fetch<T>(&self, url: &Url, context: &str) -> Result<T, PlacesError>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = self.request_json(url, context).await?;
        Self::check_status(&body)?;
        serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the response
    /// body as JSON.
    async fn request_json(&self, url: &Url, context: &str) -> Result<serde_json::Value, PlacesError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    /// Checks the envelope `"status"` and maps failures onto error variants.
    fn check_status(body: &serde_json::Value) -> Result<(), PlacesError> {
        let envelope: Envelope =
            serde_json::from_value(body.clone()).map_err(|e| PlacesError::Deserialize {
                context: "response envelope".to_string(),
                source: e,
            })?;
        if envelope.status == 0 {
            return Ok(());
        }

        let message = envelope
            .message
            .unwrap_or_else(|| "unknown error".to_string());
        if RATE_LIMIT_STATUSES.contains(&envelope.status) {
            return Err(PlacesError::RateLimited {
                status: envelope.status,
                message,
            });
        }
        if message.contains("无相关结果") {
            return Err(PlacesError::NotFound(message));
        }
        Err(PlacesError::Api {
            status: envelope.status,
            message,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
