use thiserror::Error;

/// Startup configuration failures. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Malformed request arguments, detected before anything is sent upstream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("radius must be a positive number of meters, got {0}")]
    NonPositiveRadius(f64),

    #[error("result limit must be at least 1")]
    ZeroLimit,

    #[error("unsupported sort key \"{0}\"; expected one of: rating, distance, price, composite")]
    UnsupportedSortKey(String),

    #[error("invalid price range \"{input}\": {reason}")]
    InvalidPriceRange { input: String, reason: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("at most {max} ids may be given, got {got}")]
    TooManyIds { max: usize, got: usize },

    #[error("image {dimension} must be between 1 and {max} pixels, got {got}")]
    ImageSize {
        dimension: &'static str,
        max: u32,
        got: u32,
    },

    #[error("zoom must be between {min} and {max}, got {got}")]
    ZoomOutOfRange { min: u8, max: u8, got: u8 },

    #[error("at least one point is required to render a map")]
    NoPoints,

    #[error("coordinates out of range: ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },
}
