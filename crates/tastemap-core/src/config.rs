use crate::app_config::{AppConfig, Environment, Transport};
use crate::ConfigError;

/// Values shipped in sample `.env` files that are not real keys.
const PLACEHOLDER_API_KEYS: &[&str] = &[
    "your_actual_baidu_maps_api_key_here",
    "your_actual_api_key_here",
    "BAIDU_MAPS_API_KEY",
];

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let baidu_api_key = require("BAIDU_MAPS_API_KEY")?;
    if PLACEHOLDER_API_KEYS.contains(&baidu_api_key.as_str()) {
        return Err(invalid(
            "BAIDU_MAPS_API_KEY",
            "placeholder value; set a real Baidu Maps API key".to_string(),
        ));
    }

    let env = parse_environment(&or_default("TASTEMAP_ENV", "development"))?;
    let transport = parse_transport(&or_default("TASTEMAP_TRANSPORT", "stdio"))?;

    let mut bind_addr = or_default("TASTEMAP_BIND_ADDR", "0.0.0.0:9000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("TASTEMAP_BIND_ADDR", e.to_string()))?;
    for var in ["PORT", "MCP_PORT"] {
        if let Ok(raw) = lookup(var) {
            let port = raw
                .trim()
                .parse::<u16>()
                .map_err(|e| invalid(var, e.to_string()))?;
            bind_addr.set_port(port);
        }
    }

    let log_level = or_default("TASTEMAP_LOG_LEVEL", "info");
    let provider_base_url = or_default("TASTEMAP_PROVIDER_BASE_URL", "https://api.map.baidu.com");

    let request_timeout_secs = parse_u64("TASTEMAP_REQUEST_TIMEOUT_SECS", "30")?;
    let lookup_timeout_secs = parse_u64("TASTEMAP_LOOKUP_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 || lookup_timeout_secs == 0 {
        let var = if request_timeout_secs == 0 {
            "TASTEMAP_REQUEST_TIMEOUT_SECS"
        } else {
            "TASTEMAP_LOOKUP_TIMEOUT_SECS"
        };
        return Err(invalid(var, "timeout must be at least 1 second".to_string()));
    }
    let max_retries = parse_u32("TASTEMAP_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("TASTEMAP_RETRY_BACKOFF_BASE_MS", "1000")?;
    let cache_ttl_secs = parse_u64("TASTEMAP_CACHE_TTL_SECS", "300")?;

    Ok(AppConfig {
        baidu_api_key,
        env,
        transport,
        bind_addr,
        log_level,
        provider_base_url,
        request_timeout_secs,
        lookup_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        cache_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TASTEMAP_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Parse a transport name. `sse` is accepted as an alias for `http`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything else.
pub fn parse_transport(s: &str) -> Result<Transport, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "stdio" => Ok(Transport::Stdio),
        "http" | "sse" => Ok(Transport::Http),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TASTEMAP_TRANSPORT".to_string(),
            reason: format!("unknown transport \"{other}\"; expected stdio or http"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
