//! rt-mcp - MCP server for Request Tracker
//!
//! This binary runs as an MCP server over stdio (the default) or over HTTP,
//! letting MCP clients work with RT tickets through natural language.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `RT_BASE_URL`: Base URL of your RT instance
//! - `RT_TOKEN`: RT auth token
//! - `RT_TIMEOUT_SECS`: Optional request timeout (default 20)
//!
//! # Usage
//!
//! ```bash
//! # stdio transport
//! ./rt-mcp
//!
//! # HTTP transport on a custom port
//! ./rt-mcp --transport http --port 8080
//! ```

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rmcp::{transport::stdio, ServiceExt};
use tracing::Level;
use tracing_subscriber::{
    fmt,
    fmt::writer::{BoxMakeWriter, MakeWriterExt},
    EnvFilter,
};

use rt_mcp::{config, rt_client, server, transport};

/// MCP server exposing Request Tracker tickets as tools
#[derive(Parser, Debug)]
#[command(name = "rt-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server for the Request Tracker REST 2.0 API", long_about = None)]
struct Cli {
    /// Transport to serve MCP on
    #[arg(long, value_enum, default_value_t = Transport::Stdio, env = "RT_MCP_TRANSPORT")]
    transport: Transport,

    /// Address to bind in HTTP mode
    #[arg(long, default_value = "0.0.0.0", env = "RT_MCP_HOST")]
    host: IpAddr,

    /// Port to listen on in HTTP mode
    #[arg(long, default_value_t = 3000, env = "RT_MCP_PORT")]
    port: u16,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    #[default]
    Stdio,

    /// `POST /mcp` with session headers
    Http,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.transport);

    tracing::info!("Starting rt-mcp server v{}", env!("CARGO_PKG_VERSION"));

    let config = config::Config::from_env().context("Failed to load configuration")?;

    tracing::debug!("Configuration loaded, base_url: {}", config.base_url);

    let rt_client = rt_client::RtClient::new(&config).context("Failed to create RT client")?;

    tracing::debug!(base_url = %rt_client.base_url(), "RT client initialized");

    // Test connection to RT before starting
    tracing::info!("Testing connection to Request Tracker...");
    if let Err(e) = rt_client.test_connection().await {
        tracing::error!(error = %e, "Connection test failed");
        // The server might become reachable later; keep going.
        tracing::warn!(
            "Server will start but may not be able to reach Request Tracker. \
             Check configuration and network connectivity."
        );
    }

    match cli.transport {
        Transport::Stdio => run_stdio(rt_client).await,
        Transport::Http => run_http(rt_client, SocketAddr::new(cli.host, cli.port)).await,
    }
}

/// Initializes logging.
///
/// stdout carries JSON-RPC in stdio mode, so everything goes to stderr there.
/// In HTTP mode warnings and errors go to stderr and the rest to stdout.
fn init_logging(transport: Transport) {
    let writer = match transport {
        Transport::Stdio => BoxMakeWriter::new(std::io::stderr),
        Transport::Http => BoxMakeWriter::new(
            std::io::stderr
                .with_max_level(Level::WARN)
                .or_else(std::io::stdout),
        ),
    };

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rt_mcp=info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
}

async fn run_stdio(rt_client: rt_client::RtClient) -> Result<()> {
    let server = server::RtServer::new(rt_client);

    tracing::info!("Server initialized, starting stdio transport");

    let service = server
        .serve(stdio())
        .await
        .inspect_err(|e| {
            tracing::error!("serving error: {:?}", e);
        })
        .context("Failed to start server")?;

    tracing::info!("Server running, waiting for requests");

    service
        .waiting()
        .await
        .context("Server error during operation")?;

    tracing::info!("Server shutting down");

    Ok(())
}

async fn run_http(rt_client: rt_client::RtClient, addr: SocketAddr) -> Result<()> {
    transport::serve(rt_client, addr, shutdown_signal())
        .await
        .with_context(|| format!("HTTP server on {} failed", addr))?;

    tracing::info!("Server shutting down");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, starting graceful shutdown"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["rt-mcp"]).unwrap();
        assert_eq!(cli.transport, Transport::Stdio);
        assert_eq!(cli.port, 3000);
        assert_eq!(cli.host, "0.0.0.0".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_cli_http_transport() {
        let cli =
            Cli::try_parse_from(["rt-mcp", "--transport", "http", "--host", "127.0.0.1", "--port", "8080"])
                .unwrap();
        assert_eq!(cli.transport, Transport::Http);
        assert_eq!(SocketAddr::new(cli.host, cli.port).to_string(), "127.0.0.1:8080");
    }

    #[test]
    fn test_cli_rejects_unknown_transport() {
        assert!(Cli::try_parse_from(["rt-mcp", "--transport", "sse"]).is_err());
    }
}
