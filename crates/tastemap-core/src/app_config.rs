use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// How the tool server talks to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// MCP over standard input/output.
    Stdio,
    /// JSON over HTTP on `bind_addr`.
    Http,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Http => write!(f, "http"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub baidu_api_key: String,
    pub env: Environment,
    pub transport: Transport,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub provider_base_url: String,
    pub request_timeout_secs: u64,
    pub lookup_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// `0` disables expiry; entries then live until invalidated.
    pub cache_ttl_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("baidu_api_key", &"[redacted]")
            .field("env", &self.env)
            .field("transport", &self.transport)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("provider_base_url", &self.provider_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("lookup_timeout_secs", &self.lookup_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .finish()
    }
}
