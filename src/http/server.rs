//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the relay, swagger and CORS handlers
//! - Wire up middleware (tracing, limits, timeouts, request ID)
//! - Register service contracts with the gateway at startup
//! - Serve on a listener until shutdown, then drain backend connections

use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderName, middleware, routing::post, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::RelayConfig;
use crate::http::cors::cors_middleware;
use crate::http::gateway::{relay_handler, relay_root_handler, Gateway};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::envelope_bare_errors;
use crate::http::swagger::swagger_router;
use crate::load_balancer::ConfigurationError;
use crate::net::{ConnectionManager, ConnectionTracker, Dialer, RefreshInterceptor};
use crate::resilience::DeadlineInterceptor;
use crate::rpc::greeter_contract;

/// How long in-flight backend calls get to finish after the listener stops.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
}

/// HTTP front end of the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
    manager: Arc<ConnectionManager>,
}

impl HttpServer {
    /// Build the endpoint pool, register the service contract and assemble
    /// the router. Fails only on configuration errors; an unreachable
    /// backend at registration time is logged.
    pub async fn new(
        config: RelayConfig,
        dialer: Arc<dyn Dialer>,
    ) -> Result<Self, ConfigurationError> {
        let manager = Arc::new(ConnectionManager::from_config(&config, dialer)?);

        let invoker = DeadlineInterceptor::new(
            RefreshInterceptor::new(Arc::clone(&manager)),
            Duration::from_millis(config.timeouts.call_ms),
        );
        let mut gateway = Gateway::new(
            Arc::new(invoker),
            forward_header_names(&config.relay.forward_headers),
        );

        let contract = greeter_contract();
        gateway.register(&contract, manager.acquire().await);

        let state = AppState {
            gateway: Arc::new(gateway),
        };
        let router = Self::build_router(&config, state);

        Ok(Self {
            router,
            config,
            manager,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Relay routes answer every failure, including the body limit and the
    /// request timeout, with the JSON error envelope.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mount = &config.relay.mount_path;

        let relay = Router::new()
            .route(&format!("{mount}/{{*service_name}}"), post(relay_handler))
            .route(&format!("{mount}/"), post(relay_root_handler))
            .route_layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(envelope_bare_errors))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .map_response(|res: axum::response::Response<_>| res.map(axum::body::Body::new))
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
            .with_state(state);

        let router = relay
            .merge(swagger_router(&config.swagger.dir))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer());

        if config.relay.cors_enabled {
            router.layer(middleware::from_fn(cors_middleware))
        } else {
            router
        }
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Backend connections currently open.
    pub fn connections(&self) -> &ConnectionTracker {
        self.manager.tracker()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then wait for in-flight
    /// backend connections to close.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoints = self.manager.pool().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        if !self.manager.tracker().wait_for_idle(DRAIN_TIMEOUT).await {
            tracing::warn!(
                open = self.manager.tracker().active_count(),
                "Backend connections still open after drain timeout"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Parse configured header names. Invalid names are rejected by validation;
/// any that slip through are skipped.
fn forward_header_names(names: &[String]) -> Vec<HeaderName> {
    names
        .iter()
        .filter_map(|name| match HeaderName::from_bytes(name.as_bytes()) {
            Ok(header) => Some(header),
            Err(_) => {
                tracing::warn!(header = %name, "Ignoring invalid forwarded header name");
                None
            }
        })
        .collect()
}
