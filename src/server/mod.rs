pub mod handler;

use crate::config::Config;
use crate::tools::ElasticsearchToolkit;
use crate::{Error, Result};
use rmcp::{service::ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use handler::ElasticsearchServerHandler;

pub struct Server {
    config: Arc<Config>,
    toolkit: Arc<ElasticsearchToolkit>,
    cancellation_token: CancellationToken,
}

impl Server {
    #[must_use]
    pub fn new(config: Config, toolkit: ElasticsearchToolkit) -> Self {
        Self {
            config: Arc::new(config),
            toolkit: Arc::new(toolkit),
            cancellation_token: CancellationToken::new(),
        }
    }

    pub async fn run(&self) -> Result<()> {
        info!("Starting MCP server infrastructure");

        let handler = ElasticsearchServerHandler::new(Arc::clone(&self.toolkit));

        log_stdio_attachment();

        info!("MCP server handler initialized successfully");

        let shutdown_token = self.cancellation_token.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            shutdown_token.cancel();
        });

        info!("Starting MCP server on stdio transport");

        let server_result = tokio::select! {
            result = Self::run_mcp_server(handler) => {
                result
            }
            () = self.cancellation_token.cancelled() => {
                info!("Shutdown signal received, stopping MCP server");
                Ok(())
            }
        };

        let shutdown_timeout =
            std::time::Duration::from_secs(self.config.server.graceful_shutdown_timeout_secs);
        if tokio::time::timeout(shutdown_timeout, self.graceful_shutdown())
            .await
            .is_err()
        {
            warn!("Graceful shutdown timeout exceeded, forcing shutdown");
        }

        info!("MCP server shutdown complete");
        server_result
    }

    async fn run_mcp_server(handler: ElasticsearchServerHandler) -> Result<()> {
        info!("Connecting MCP server to stdio transport");

        let server = handler
            .serve(stdio())
            .await
            .map_err(|e| Error::Mcp(format!("Failed to start MCP server: {e}")))?;

        let quit_reason = server
            .waiting()
            .await
            .map_err(|e| Error::Mcp(format!("MCP server error: {e}")))?;

        info!("MCP server completed with reason: {:?}", quit_reason);
        Ok(())
    }

    async fn graceful_shutdown(&self) -> Result<()> {
        info!("Performing graceful shutdown");
        self.toolkit.close().await?;
        info!("Graceful shutdown completed");
        Ok(())
    }

    pub fn shutdown(&self) {
        warn!("Initiating server shutdown");
        self.cancellation_token.cancel();
    }

    /// Check if the server has been requested to shutdown
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    /// Get the server configuration
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn toolkit(&self) -> &ElasticsearchToolkit {
        &self.toolkit
    }
}

/// Stdout carries MCP frames, so a terminal on either end usually means a
/// manual run rather than an agent host.
fn log_stdio_attachment() {
    let stdin_tty = atty::is(atty::Stream::Stdin);
    let stdout_tty = atty::is(atty::Stream::Stdout);
    debug!(stdin_tty, stdout_tty, "Checked stdio attachment");

    if stdin_tty || stdout_tty {
        warn!("Stdio is attached to a terminal; expected an MCP client on both ends");
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to install signal handlers: {}", e);
            return std::future::pending().await;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, initiating graceful shutdown");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, initiating graceful shutdown"),
        Err(e) => {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
