//! Static map image URLs (`staticimage/v2`).

use reqwest::Url;
use tastemap_core::geo::centroid;
use tastemap_core::{Coordinates, ValidationError};

use crate::error::PlacesError;

/// Largest width or height the static image endpoint renders, in pixels.
pub const MAX_IMAGE_DIMENSION: u32 = 1024;
pub const MIN_ZOOM: u8 = 3;
pub const MAX_ZOOM: u8 = 19;

/// Checks image dimensions and zoom without building anything, so callers
/// can reject a request before doing any lookups.
///
/// # Errors
///
/// [`ValidationError::ImageSize`] or [`ValidationError::ZoomOutOfRange`].
pub fn check_frame(width: u32, height: u32, zoom: u8) -> Result<(), ValidationError> {
    for (dimension, got) in [("width", width), ("height", height)] {
        if got == 0 || got > MAX_IMAGE_DIMENSION {
            return Err(ValidationError::ImageSize {
                dimension,
                max: MAX_IMAGE_DIMENSION,
                got,
            });
        }
    }
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
        return Err(ValidationError::ZoomOutOfRange {
            min: MIN_ZOOM,
            max: MAX_ZOOM,
            got: zoom,
        });
    }
    Ok(())
}

/// Builds static-map URLs. Pure string construction, no I/O.
#[derive(Debug, Clone)]
pub struct StaticMapRenderer {
    endpoint: Url,
    api_key: String,
}

impl StaticMapRenderer {
    /// `base_url` is the provider root, as given to the API client.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::InvalidBaseUrl`] when `base_url` cannot be
    /// joined with the endpoint path.
    pub fn new(api_key: &str, base_url: &Url) -> Result<Self, PlacesError> {
        let endpoint = base_url
            .join("staticimage/v2")
            .map_err(|e| PlacesError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            endpoint,
            api_key: api_key.to_owned(),
        })
    }

    /// URL of a `width`×`height` image at `zoom`, centered on the mean of
    /// `points` with one marker per point.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NoPoints`] for an empty point list.
    /// - [`ValidationError::ImageSize`] for a zero or oversized dimension.
    /// - [`ValidationError::ZoomOutOfRange`] outside `3..=19`.
    /// - [`ValidationError::InvalidCoordinates`] for a point off the globe.
    pub fn build_map_request(
        &self,
        points: &[Coordinates],
        width: u32,
        height: u32,
        zoom: u8,
    ) -> Result<Url, ValidationError> {
        check_frame(width, height, zoom)?;
        if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
            return Err(ValidationError::InvalidCoordinates {
                lat: bad.lat,
                lng: bad.lng,
            });
        }
        let center = centroid(points).ok_or(ValidationError::NoPoints)?;

        let markers = points
            .iter()
            .map(|p| format!("{},{}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join("|");

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("ak", &self.api_key)
            .append_pair("center", &format!("{},{}", center.lng, center.lat))
            .append_pair("width", &width.to_string())
            .append_pair("height", &height.to_string())
            .append_pair("zoom", &zoom.to_string())
            .append_pair("markers", &markers)
            .append_pair("markerStyles", "l,A");
        Ok(url)
    }
}
