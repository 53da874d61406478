use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("BAIDU_MAPS_API_KEY", "real-test-key");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "TASTEMAP_ENV"));
}

#[test]
fn parse_transport_accepts_sse_alias() {
    assert_eq!(parse_transport("stdio").unwrap(), Transport::Stdio);
    assert_eq!(parse_transport("HTTP").unwrap(), Transport::Http);
    assert_eq!(parse_transport("sse").unwrap(), Transport::Http);
    assert!(parse_transport("websocket").is_err());
}

#[test]
fn build_app_config_fails_without_api_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "BAIDU_MAPS_API_KEY"),
        "expected MissingEnvVar(BAIDU_MAPS_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_api_key_as_missing() {
    let mut map = HashMap::new();
    map.insert("BAIDU_MAPS_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_rejects_placeholder_api_key() {
    for placeholder in [
        "your_actual_baidu_maps_api_key_here",
        "your_actual_api_key_here",
        "BAIDU_MAPS_API_KEY",
    ] {
        let mut map = HashMap::new();
        map.insert("BAIDU_MAPS_API_KEY", placeholder);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BAIDU_MAPS_API_KEY"),
            "placeholder {placeholder} should be rejected, got: {result:?}"
        );
    }
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config");
    assert_eq!(cfg.baidu_api_key, "real-test-key");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.transport, Transport::Stdio);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:9000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.provider_base_url, "https://api.map.baidu.com");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.lookup_timeout_secs, 10);
    assert_eq!(cfg.max_retries, 2);
    assert_eq!(cfg.retry_backoff_base_ms, 1000);
    assert_eq!(cfg.cache_ttl_secs, 300);
}

#[test]
fn mcp_port_overrides_port_and_bind_addr_port() {
    let mut map = full_env();
    map.insert("TASTEMAP_BIND_ADDR", "127.0.0.1:3000");
    map.insert("PORT", "9100");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9100");

    map.insert("MCP_PORT", "8000");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8000");
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("TASTEMAP_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TASTEMAP_BIND_ADDR"),
        "expected InvalidEnvVar(TASTEMAP_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_fails_with_invalid_port() {
    let mut map = full_env();
    map.insert("MCP_PORT", "ninety");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "MCP_PORT"));
}

#[test]
fn request_timeout_override_and_invalid() {
    let mut map = full_env();
    map.insert("TASTEMAP_REQUEST_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 60);

    map.insert("TASTEMAP_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TASTEMAP_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(TASTEMAP_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn zero_lookup_timeout_is_rejected() {
    let mut map = full_env();
    map.insert("TASTEMAP_LOOKUP_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TASTEMAP_LOOKUP_TIMEOUT_SECS")
    );
}

#[test]
fn debug_output_redacts_api_key() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("real-test-key"));
    assert!(rendered.contains("[redacted]"));
}
