//! Baidu Maps boundary: REST client, response normalization, detail cache,
//! concurrent lookups and static-map URLs.

pub mod cache;
pub mod client;
pub mod error;
pub mod lookup;
pub mod map;
pub mod normalize;
pub(crate) mod retry;
pub mod types;

pub use cache::PlaceCache;
pub use client::{BaiduMapsClient, SearchRequest, MAX_PAGE_SIZE, MAX_UPSTREAM_RADIUS_M};
pub use error::PlacesError;
pub use lookup::PlaceLookup;
pub use map::StaticMapRenderer;
pub use normalize::normalize_place;
