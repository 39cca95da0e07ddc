//! Daemon entry point for the GitHub MCP server.
//!
//! Loads configuration from flags and the environment, builds the capability
//! provider, validates the toolset selection, and serves MCP over stdio,
//! streamable HTTP, or both.

mod config;
mod provider;

use std::sync::Arc;

use octo_mcp::OctoMcp;
use octo_mcp::server::{McpHttpServerConfig, serve_stdio, serve_streamable_http};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::OctoConfig;
use crate::provider::{build_settings, export_translations, initial_group};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = OctoConfig::from_args()?;

    // stdout carries the stdio transport
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Arc::new(build_settings(&config)?);

    if config.export_translations {
        if let Some(path) = config.translations_file.as_deref() {
            export_translations(&settings, path)?;
            info!(path = %path.display(), "translations exported");
        }
        return Ok(());
    }

    let group = initial_group(&settings).await?;
    info!(
        toolsets = ?config.toolsets,
        dynamic = config.dynamic_toolsets,
        read_only = config.read_only,
        "toolsets assembled"
    );

    let http = config.http_serve.then(|| {
        let http_settings = Arc::clone(&settings);
        let http_config = McpHttpServerConfig::new(config.http_addr);
        tokio::spawn(async move {
            if let Err(err) = serve_streamable_http(http_settings, http_config).await {
                error!(error = %err, "streamable HTTP server stopped");
            }
        })
    });

    if config.enable_stdio {
        let server = OctoMcp::with_group(Arc::clone(&settings), group);
        tokio::select! {
            result = serve_stdio(server) => result?,
            _ = tokio::signal::ctrl_c() => info!("shutting down"),
        }
        if let Some(http) = http {
            http.abort();
        }
        return Ok(());
    }

    if let Some(http) = http {
        tokio::select! {
            result = http => result?,
            _ = tokio::signal::ctrl_c() => info!("shutting down"),
        }
    }
    Ok(())
}
