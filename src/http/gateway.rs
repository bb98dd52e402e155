//! HTTP/JSON to RPC translation.
//!
//! # Responsibilities
//! - Bind service contracts to relay paths at startup
//! - Decode the JSON body into the method's request message
//! - Forward configured headers and the request id as call metadata
//! - Invoke the backend and render the reply (or failure) as JSON
//!
//! # Design Decisions
//! - The gateway never holds a backend connection; every call goes through
//!   the [`Invoker`], which dials its own
//! - The registration connection only proves reachability and is closed
//!   as soon as registration completes

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::request::{forwarded_metadata, request_id};
use crate::http::response::GatewayError;
use crate::http::server::AppState;
use crate::net::{DialError, Invoker, LiveConnection};
use crate::observability::metrics;
use crate::routing::MethodTable;
use crate::rpc::{CallContext, ServiceContract};

/// Metric label for requests that matched no method.
const UNMATCHED: &str = "unmatched";

pub struct Gateway {
    methods: MethodTable,
    invoker: Arc<dyn Invoker>,
    forward_headers: Vec<HeaderName>,
}

impl Gateway {
    pub fn new(invoker: Arc<dyn Invoker>, forward_headers: Vec<HeaderName>) -> Self {
        Self {
            methods: MethodTable::new(),
            invoker,
            forward_headers,
        }
    }

    /// Bind `contract`'s methods. `registration` is the connection dialed for
    /// the occasion; it is closed here. A failed dial is logged and the
    /// methods are registered anyway, since each call dials on its own.
    pub fn register(
        &mut self,
        contract: &ServiceContract,
        registration: Result<LiveConnection, DialError>,
    ) {
        match registration {
            Ok(connection) => {
                tracing::info!(
                    service = %contract.name(),
                    endpoint = %connection.endpoint(),
                    "Registered service"
                );
                connection.close();
            }
            Err(e) => {
                tracing::warn!(
                    service = %contract.name(),
                    error = %e,
                    "Registration dial failed; calls will dial on demand"
                );
            }
        }
        self.methods.register(contract);
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    /// Metric label for a relay path segment.
    pub fn route_label(&self, service_name: &str) -> String {
        self.methods
            .lookup(service_name)
            .map(|m| m.path().to_string())
            .unwrap_or_else(|| UNMATCHED.to_string())
    }

    /// Relay one request. Returns the JSON reply body.
    pub async fn handle(
        &self,
        service_name: &str,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Vec<u8>, GatewayError> {
        let method = self
            .methods
            .lookup(service_name)
            .ok_or_else(|| GatewayError::UnknownMethod(service_name.to_string()))?;

        let payload = method.request_from_json(body)?;

        let mut ctx = CallContext::new(request_id(headers), method.path());
        for (key, value) in forwarded_metadata(headers, &self.forward_headers) {
            ctx = ctx.with_metadata(&key, value);
        }

        tracing::debug!(
            request_id = %ctx.request_id(),
            method = %method.path(),
            "Relaying request"
        );

        let reply = self.invoker.invoke(ctx, payload).await?;
        Ok(method.response_to_json(reply)?)
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("methods", &self.methods.routes())
            .field("forward_headers", &self.forward_headers)
            .finish()
    }
}

/// `POST {mount}/{*service_name}`
pub async fn relay_handler(
    State(state): State<AppState>,
    Path(service_name): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    relay(&state, &service_name, &headers, body).await
}

/// `POST {mount}/`, which names no method.
pub async fn relay_root_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    relay(&state, "", &headers, body).await
}

async fn relay(
    state: &AppState,
    service_name: &str,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start_time = Instant::now();
    let label = state.gateway.route_label(service_name);

    let result = match body {
        Ok(body) => state.gateway.handle(service_name, headers, &body).await,
        Err(rejection) => Err(GatewayError::from(rejection)),
    };

    let response = match result {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            json,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(
                service_name = %service_name,
                status = %e.status(),
                error = %e,
                "Relay failed"
            );
            e.into_response()
        }
    };

    metrics::record_request(&label, response.status().as_u16(), start_time);
    response
}
