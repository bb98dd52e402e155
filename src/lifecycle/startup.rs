//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the endpoint pool and register service contracts
//! - Bind the listener and hand back a server ready to run
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last, so a bad pool never opens a port

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{validate_config, ConfigError, RelayConfig};
use crate::http::HttpServer;
use crate::load_balancer::ConfigurationError;
use crate::net::Dialer;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pool(#[from] ConfigurationError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// A relay that has bound its listener but is not yet serving.
pub struct Running {
    server: HttpServer,
    listener: TcpListener,
}

impl Running {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn server(&self) -> &HttpServer {
        &self.server
    }

    /// Serve until `shutdown` fires.
    pub async fn serve(self, shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
        self.server.run(self.listener, shutdown).await
    }
}

/// Validate `config`, build the relay and bind its listener.
pub async fn start(config: RelayConfig, dialer: Arc<dyn Dialer>) -> Result<Running, StartupError> {
    validate_config(&config).map_err(ConfigError::Validation)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoints = ?config.endpoints,
        strategy = ?config.load_balancing.strategy,
        call_timeout_ms = config.timeouts.call_ms,
        "Configuration loaded"
    );

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, dialer).await?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    if let Ok(local) = listener.local_addr() {
        tracing::info!(address = %local, "Listening for connections");
    }

    Ok(Running { server, listener })
}
