//! Request plumbing shared by the REST routes and the MCP HTTP endpoint:
//! request ids, bearer tokens and the inbound call budget.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::{Choice, ConstantTimeEq};
use uuid::Uuid;

use crate::error::{ErrorBody, ErrorEnvelope};

const API_KEYS_VAR: &str = "TASTEMAP_HTTP_API_KEYS";
const REQUEST_ID: &str = "x-request-id";

/// Correlation id for one HTTP request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    /// The caller's `x-request-id` if it is printable, otherwise a fresh
    /// `UUIDv4`.
    fn from_headers(headers: &HeaderMap) -> Self {
        let id = headers
            .get(REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned);
        Self(id)
    }
}

/// Bearer tokens accepted by the HTTP transport. `None` means the
/// transport is open, which only development allows.
#[derive(Debug, Clone)]
pub struct AuthState {
    tokens: Option<Arc<[String]>>,
}

impl AuthState {
    /// Reads comma-separated bearer tokens from `TASTEMAP_HTTP_API_KEYS`.
    ///
    /// # Errors
    ///
    /// Fails outside development when no token is configured.
    pub fn from_env(is_development: bool) -> anyhow::Result<Self> {
        let raw = std::env::var(API_KEYS_VAR).unwrap_or_default();
        Self::from_keys(&raw, is_development)
    }

    /// # Errors
    ///
    /// Fails when `raw` holds no token and `is_development` is false.
    pub fn from_keys(raw: &str, is_development: bool) -> anyhow::Result<Self> {
        let mut tokens: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        tokens.sort_unstable();
        tokens.dedup();

        match (tokens.is_empty(), is_development) {
            (false, _) => Ok(Self {
                tokens: Some(tokens.into()),
            }),
            (true, true) => {
                tracing::warn!("{API_KEYS_VAR} not set; HTTP transport is open in development");
                Ok(Self { tokens: None })
            }
            (true, false) => anyhow::bail!(
                "{API_KEYS_VAR} must list at least one bearer token to serve HTTP outside development"
            ),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.tokens.is_none()
    }

    /// Compares against every configured token so the time taken does not
    /// depend on which one matched.
    fn admits(&self, headers: &HeaderMap) -> bool {
        let Some(tokens) = &self.tokens else {
            return true;
        };
        let Some(presented) = bearer_token(headers) else {
            return false;
        };
        let matched = tokens.iter().fold(Choice::from(0), |acc, token| {
            acc | token.as_bytes().ct_eq(presented.as_bytes())
        });
        bool::from(matched)
    }
}

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    used: usize,
}

/// Fixed-window budget on inbound tool traffic, shared by every clone.
/// Each admitted request may fan out into several provider calls, so this
/// keeps the provider's daily quota from draining in a burst.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    capacity: usize,
    period: Duration,
    window: Arc<Mutex<Window>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(capacity: usize, period: Duration) -> Self {
        Self {
            capacity,
            period,
            window: Arc::new(Mutex::new(Window {
                opened_at: Instant::now(),
                used: 0,
            })),
        }
    }

    /// Takes one slot, or reports how long until the window reopens.
    fn try_acquire(&self) -> Result<(), Duration> {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        let elapsed = window.opened_at.elapsed();
        if elapsed >= self.period {
            window.opened_at = Instant::now();
            window.used = 0;
        }
        if window.used >= self.capacity {
            return Err(self.period.saturating_sub(elapsed));
        }
        window.used += 1;
        Ok(())
    }
}

fn rejection(status: StatusCode, code: &str, message: &str) -> Response {
    let envelope = ErrorEnvelope {
        error: ErrorBody {
            code: code.to_owned(),
            message: message.to_owned(),
        },
    };
    (status, Json(envelope)).into_response()
}

/// Attaches a [`RequestId`] extension and echoes it on the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    let echoed = HeaderValue::from_str(&id.0).ok();
    req.extensions_mut().insert(id);

    let mut res = next.run(req).await;
    if let Some(value) = echoed {
        res.headers_mut().insert(REQUEST_ID, value);
    }
    res
}

pub async fn require_bearer_auth(
    State(auth): State<AuthState>,
    req: Request,
    next: Next,
) -> Response {
    if auth.admits(req.headers()) {
        return next.run(req).await;
    }
    tracing::debug!(path = %req.uri().path(), "rejected request without a valid bearer token");
    let mut res = rejection(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        "missing or invalid bearer token",
    );
    res.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    res
}

pub async fn enforce_rate_limit(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    match limiter.try_acquire() {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            tracing::warn!(
                capacity = limiter.capacity,
                retry_after_secs = retry_after.as_secs(),
                "inbound rate limit exceeded"
            );
            let mut res = rejection(
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "too many tool calls; retry later",
            );
            // Round up so clients never retry before the window reopens.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            res.headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            res
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
