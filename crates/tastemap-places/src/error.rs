use thiserror::Error;

/// Errors returned by the Baidu Maps client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-zero `status` in the JSON envelope.
    #[error("Baidu Maps API error (status {status}): {message}")]
    Api { status: i64, message: String },

    /// Quota, concurrency or key-permission rejection from the provider.
    #[error("Baidu Maps rate limit (status {status}): {message}")]
    RateLimited { status: i64, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Geocoding found no match, or a place id resolved to nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// A bounded lookup did not finish in time.
    #[error("timed out: {0}")]
    Timeout(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
