use serde::Serialize;
use tastemap_core::ValidationError;
use tastemap_places::PlacesError;
use thiserror::Error;

/// Failure of one tool call. Never fatal to the server process.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Arguments that do not deserialize into the tool's input type.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    NotFound(String),

    #[error("upstream provider error: {0}")]
    Upstream(String),

    #[error("upstream provider is rate limiting: {0}")]
    RateLimited(String),
}

impl ToolError {
    /// Stable machine-readable code for clients.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::Validation(_) | ToolError::InvalidArguments(_) => "validation_error",
            ToolError::NotFound(_) => "not_found",
            ToolError::Upstream(_) => "upstream_error",
            ToolError::RateLimited(_) => "rate_limited",
        }
    }

    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

impl From<PlacesError> for ToolError {
    fn from(err: PlacesError) -> Self {
        match err {
            PlacesError::NotFound(msg) => ToolError::NotFound(msg),
            PlacesError::RateLimited { .. } => ToolError::RateLimited(err.to_string()),
            PlacesError::Http(_)
            | PlacesError::Api { .. }
            | PlacesError::Deserialize { .. }
            | PlacesError::Timeout(_)
            | PlacesError::InvalidBaseUrl { .. } => ToolError::Upstream(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// `{"error": {"code": ..., "message": ...}}`, the body of a failed MCP
/// tool result.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

impl From<&ToolError> for ErrorEnvelope {
    fn from(err: &ToolError) -> Self {
        Self {
            error: err.to_body(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            ToolError::from(ValidationError::ZeroLimit).code(),
            "validation_error"
        );
        assert_eq!(ToolError::NotFound("x".into()).code(), "not_found");
        assert_eq!(ToolError::Upstream("x".into()).code(), "upstream_error");
        assert_eq!(ToolError::RateLimited("x".into()).code(), "rate_limited");
    }

    #[test]
    fn places_errors_map_onto_tool_errors() {
        let not_found = ToolError::from(PlacesError::NotFound("no such uid".into()));
        assert!(matches!(not_found, ToolError::NotFound(ref m) if m == "no such uid"));

        let limited = ToolError::from(PlacesError::RateLimited {
            status: 302,
            message: "quota".into(),
        });
        assert_eq!(limited.code(), "rate_limited");

        let timeout = ToolError::from(PlacesError::Timeout("slow".into()));
        assert_eq!(timeout.code(), "upstream_error");
    }

    #[test]
    fn envelope_serializes_code_and_message() {
        let err = ToolError::from(ValidationError::NoPoints);
        let json = serde_json::to_value(ErrorEnvelope::from(&err)).unwrap();
        assert_eq!(json["error"]["code"], "validation_error");
        assert_eq!(
            json["error"]["message"],
            "at least one point is required to render a map"
        );
    }
}
