//! Transport seam between the lifecycle manager and a concrete RPC stack.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tonic::Status;

use crate::load_balancer::Endpoint;
use crate::rpc::CallContext;

/// Why a single dial attempt failed.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connect timed out after {0:?}")]
    Timeout(Duration),
    #[error("connect failed: {0}")]
    Connect(String),
}

/// A live transport handle bound to one endpoint.
///
/// Dropping the connection closes it.
#[async_trait]
pub trait Connection: Send {
    fn endpoint(&self) -> &Endpoint;

    /// Issue one unary call with a pre-encoded request message.
    async fn unary(&mut self, ctx: &CallContext, payload: Bytes) -> Result<Bytes, Status>;
}

/// Establishes connections to endpoints.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(
        &self,
        endpoint: &Endpoint,
        connect_timeout: Duration,
    ) -> Result<Box<dyn Connection>, TransportError>;
}
