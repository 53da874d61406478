mod api;
mod error;
mod mcp;
mod middleware;
mod tools;

use std::sync::Arc;

use clap::Parser;
use tastemap_core::{AppConfig, Environment, Transport};
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limiter, AppState},
    middleware::AuthState,
    tools::FoodTools,
};

#[derive(Debug, Parser)]
#[command(name = "tastemap-server")]
#[command(about = "Restaurant recommendation tools over MCP, on stdio or streamable HTTP")]
struct Cli {
    /// `stdio` or `http`; overrides TASTEMAP_TRANSPORT.
    #[arg(long)]
    transport: Option<String>,

    /// Shorthand for `--transport http`.
    #[arg(long)]
    sse: bool,

    /// Port for the HTTP transport; overrides MCP_PORT and PORT.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = tastemap_core::load_app_config()?;
    apply_cli_overrides(&mut config, &cli)?;

    // stdout belongs to the MCP protocol in stdio mode.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(transport = %config.transport, env = %config.env, "starting tastemap-server");
    let tools = Arc::new(FoodTools::from_config(&config)?);

    match config.transport {
        Transport::Stdio => mcp::serve_stdio(tools).await,
        Transport::Http => serve_http(&config, tools).await,
    }
}

fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) -> anyhow::Result<()> {
    if let Some(raw) = cli.transport.as_deref() {
        config.transport = tastemap_core::parse_transport(raw)?;
    }
    if cli.sse {
        config.transport = Transport::Http;
    }
    if let Some(port) = cli.port {
        config.bind_addr.set_port(port);
    }
    Ok(())
}

async fn serve_http(config: &AppConfig, tools: Arc<FoodTools>) -> anyhow::Result<()> {
    let auth = AuthState::from_env(matches!(config.env, Environment::Development))?;
    let bearer_auth = !auth.is_open();
    let app = build_app(AppState { tools }, auth, default_rate_limiter());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        mcp_path = "/mcp",
        bearer_auth,
        "serving MCP over HTTP"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            baidu_api_key: "real-key".to_string(),
            env: Environment::Test,
            transport: Transport::Stdio,
            bind_addr: "127.0.0.1:8000".parse().unwrap(),
            log_level: "info".to_string(),
            provider_base_url: "https://api.map.baidu.com".to_string(),
            request_timeout_secs: 10,
            lookup_timeout_secs: 10,
            max_retries: 2,
            retry_backoff_base_ms: 1000,
            cache_ttl_secs: 300,
        }
    }

    #[test]
    fn cli_flags_override_transport_and_port() {
        let mut config = base_config();
        assert_eq!(config.transport, Transport::Stdio);

        let cli = Cli::parse_from(["tastemap-server", "--sse", "--port", "9100"]);
        apply_cli_overrides(&mut config, &cli).unwrap();
        assert_eq!(config.transport, Transport::Http);
        assert_eq!(config.bind_addr.port(), 9100);
    }

    #[test]
    fn explicit_transport_flag_is_parsed() {
        let mut config = base_config();
        let cli = Cli::parse_from(["tastemap-server", "--transport", "http"]);
        apply_cli_overrides(&mut config, &cli).unwrap();
        assert_eq!(config.transport, Transport::Http);

        let cli = Cli::parse_from(["tastemap-server", "--transport", "carrier-pigeon"]);
        assert!(apply_cli_overrides(&mut config, &cli).is_err());
    }
}
