//! MCP server runners for octo-mcp.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tracing::info;

use crate::{OctoMcp, ServerSettings};

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }

    #[must_use]
    pub const fn with_sse_retry(mut self, sse_retry: Option<Duration>) -> Self {
        self.sse_retry = sse_retry;
        self
    }
}

/// Serves one session over stdio.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio(server: OctoMcp) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (stdin, stdout) = stdio();
    info!("serving MCP over stdio");
    let running = serve_server(server, (stdin, stdout)).await?;
    let _ = running.waiting().await?;
    Ok(())
}

/// Builds the axum router serving `/health` and the MCP endpoint at `/mcp`.
///
/// Every MCP session gets its own toolset group.
pub fn router(settings: Arc<ServerSettings>, config: &McpHttpServerConfig) -> Router {
    let service: StreamableHttpService<OctoMcp, LocalSessionManager> = StreamableHttpService::new(
        move || Ok(OctoMcp::new(Arc::clone(&settings))),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            sse_keep_alive: config.sse_keep_alive,
            sse_retry: config.sse_retry,
            stateful_mode: config.stateful_mode,
            ..Default::default()
        },
    );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service)
}

/// Serves the MCP server using streamable HTTP transport.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http(
    settings: Arc<ServerSettings>,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(settings, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "serving MCP over streamable HTTP");
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_config_builders() {
        let addr: SocketAddr = "127.0.0.1:4030".parse().unwrap();
        let config = McpHttpServerConfig::new(addr)
            .with_stateful_mode(false)
            .with_sse_keep_alive(None)
            .with_sse_retry(Some(Duration::from_secs(1)));

        assert_eq!(config.addr, addr);
        assert!(!config.stateful_mode);
        assert_eq!(config.sse_keep_alive, None);
        assert_eq!(config.sse_retry, Some(Duration::from_secs(1)));
    }
}
