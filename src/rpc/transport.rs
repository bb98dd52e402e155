//! gRPC transport built on tonic channels.
//!
//! Every dial produces a dedicated HTTP/2 channel; dropping the
//! [`GrpcConnection`] tears that channel down.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::uri::PathAndQuery;
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};
use tonic::transport::{Channel, Endpoint as TonicEndpoint};
use tonic::Status;

use crate::load_balancer::Endpoint;
use crate::net::dialer::{Connection, Dialer, TransportError};
use crate::rpc::codec::RawCodec;
use crate::rpc::CallContext;

/// Metadata key carrying the relay's request id.
const REQUEST_ID_KEY: &str = "x-request-id";

/// Dials plaintext HTTP/2 gRPC channels.
#[derive(Debug, Clone, Default)]
pub struct GrpcDialer;

impl GrpcDialer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Dialer for GrpcDialer {
    async fn dial(
        &self,
        endpoint: &Endpoint,
        connect_timeout: Duration,
    ) -> Result<Box<dyn Connection>, TransportError> {
        let target = TonicEndpoint::from_shared(endpoint.uri())
            .map_err(|e| TransportError::Connect(e.to_string()))?
            .connect_timeout(connect_timeout);

        let channel = match tokio::time::timeout(connect_timeout, target.connect()).await {
            Ok(Ok(channel)) => channel,
            Ok(Err(e)) => return Err(TransportError::Connect(e.to_string())),
            Err(_) => return Err(TransportError::Timeout(connect_timeout)),
        };

        Ok(Box::new(GrpcConnection {
            endpoint: endpoint.clone(),
            channel,
        }))
    }
}

/// A channel dedicated to a single call.
#[derive(Debug)]
pub struct GrpcConnection {
    endpoint: Endpoint,
    channel: Channel,
}

#[async_trait]
impl Connection for GrpcConnection {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn unary(&mut self, ctx: &CallContext, payload: Bytes) -> Result<Bytes, Status> {
        let path = PathAndQuery::try_from(ctx.method())
            .map_err(|e| Status::internal(format!("invalid method path: {e}")))?;

        let mut request = tonic::Request::new(payload);
        for (key, value) in ctx.metadata() {
            let (Ok(key), Ok(value)) = (
                AsciiMetadataKey::from_bytes(key.as_bytes()),
                AsciiMetadataValue::try_from(value.as_str()),
            ) else {
                tracing::debug!(key = %key, "Dropping metadata entry not valid for gRPC");
                continue;
            };
            request.metadata_mut().append(key, value);
        }
        if let Ok(id) = AsciiMetadataValue::try_from(ctx.request_id()) {
            request.metadata_mut().insert(REQUEST_ID_KEY, id);
        }
        if let Some(remaining) = ctx.remaining() {
            request.set_timeout(remaining);
        }

        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("service was not ready: {e}")))?;

        let response = grpc.unary(request, path, RawCodec).await?;
        Ok(response.into_inner())
    }
}
