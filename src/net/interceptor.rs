//! Call interception.
//!
//! # Responsibilities
//! - Define the [`Invoker`] seam the gateway issues every backend call through
//! - Provide the refresh interceptor: dial, invoke once, close
//!
//! # Design Decisions
//! - The connection is owned by the invocation future, so cancelling the
//!   inbound request closes the backend connection as well
//! - The call itself is never retried; only dials are (see `ConnectionManager`)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tonic::Status;

use crate::net::manager::{ConnectionManager, DialError};
use crate::rpc::CallContext;

/// Why a relayed call produced no reply.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Dial(#[from] DialError),
    #[error("backend returned {:?}: {}", .0.code(), .0.message())]
    Rpc(Status),
    #[error("call exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),
}

/// Issues one unary call with an encoded request message.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, ctx: CallContext, payload: Bytes) -> Result<Bytes, CallError>;
}

/// Dials a fresh connection for each call and closes it afterwards.
#[derive(Debug, Clone)]
pub struct RefreshInterceptor {
    manager: Arc<ConnectionManager>,
}

impl RefreshInterceptor {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }
}

#[async_trait]
impl Invoker for RefreshInterceptor {
    async fn invoke(&self, ctx: CallContext, payload: Bytes) -> Result<Bytes, CallError> {
        let mut connection = self.manager.acquire().await?;
        tracing::debug!(
            request_id = %ctx.request_id(),
            connection_id = %connection.id(),
            endpoint = %connection.endpoint(),
            method = %ctx.method(),
            "Invoking backend"
        );

        let result = connection.unary(&ctx, payload).await;
        connection.close();
        result.map_err(CallError::Rpc)
    }
}
