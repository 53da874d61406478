//! Cache-aware place lookups on top of [`BaiduMapsClient`].

use std::time::Duration;

use futures::future::join_all;
use tastemap_core::{Coordinates, PlaceRecord};

use crate::cache::PlaceCache;
use crate::client::{BaiduMapsClient, SearchRequest};
use crate::error::PlacesError;
use crate::normalize::normalize_place;

/// Couples the provider client with the shared detail cache.
///
/// Single lookups consult the cache first and fetch only on a miss; a
/// refresh invalidates the entry before re-fetching. Batch lookups run
/// concurrently, each bounded by `lookup_timeout`, and come back in input
/// order.
#[derive(Debug, Clone)]
pub struct PlaceLookup {
    client: BaiduMapsClient,
    cache: PlaceCache,
    lookup_timeout: Duration,
}

impl PlaceLookup {
    #[must_use]
    pub fn new(client: BaiduMapsClient, cache: PlaceCache, lookup_timeout: Duration) -> Self {
        Self {
            client,
            cache,
            lookup_timeout,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &PlaceCache {
        &self.cache
    }

    /// Geocodes `address`.
    ///
    /// # Errors
    ///
    /// See [`BaiduMapsClient::geocode`].
    pub async fn geocode(&self, address: &str) -> Result<Coordinates, PlacesError> {
        self.client.geocode(address).await
    }

    /// Runs a place search and normalizes the results, computing distances
    /// from the request origin. Payloads without a uid are dropped.
    ///
    /// # Errors
    ///
    /// See [`BaiduMapsClient::search_nearby`].
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<PlaceRecord>, PlacesError> {
        let raw = self.client.search_nearby(request).await?;
        let total = raw.len();
        let records: Vec<PlaceRecord> = raw
            .into_iter()
            .filter_map(|place| normalize_place(place, Some(request.origin)))
            .collect();
        if records.len() < total {
            tracing::debug!(
                dropped = total - records.len(),
                "search results without uid dropped"
            );
        }
        Ok(records)
    }

    /// Detail record for `uid`, from the cache unless `refresh` is set.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Timeout`] if the fetch exceeds the lookup timeout.
    /// - [`PlacesError::NotFound`] if the provider has no such place.
    /// - Anything [`BaiduMapsClient::place_detail`] returns.
    pub async fn detail(&self, uid: &str, refresh: bool) -> Result<PlaceRecord, PlacesError> {
        if refresh {
            self.cache.invalidate(uid);
        } else if let Some(record) = self.cache.get(uid) {
            tracing::debug!(uid, "place cache hit");
            return Ok(record);
        }

        let raw = tokio::time::timeout(self.lookup_timeout, self.client.place_detail(uid))
            .await
            .map_err(|_| {
                PlacesError::Timeout(format!(
                    "detail lookup for \"{uid}\" exceeded {}s",
                    self.lookup_timeout.as_secs_f64()
                ))
            })??;

        let record = normalize_place(raw, None)
            .ok_or_else(|| PlacesError::NotFound(format!("no place with uid \"{uid}\"")))?;
        self.cache.put(uid, record.clone());
        Ok(record)
    }

    /// Looks up every uid concurrently. The result has one slot per input,
    /// in input order; a failed or timed-out lookup is a `None` slot.
    pub async fn details_many(&self, uids: &[String], refresh: bool) -> Vec<Option<PlaceRecord>> {
        let lookups = uids.iter().map(move |uid| async move {
            match self.detail(uid, refresh).await {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(uid = %uid, error = %err, "place lookup missed");
                    None
                }
            }
        });
        join_all(lookups).await
    }
}
