//! Timeout enforcement.
//!
//! # Responsibilities
//! - Bound every relayed call (dial + invoke) by a deadline
//! - Propagate the deadline to the backend as `grpc-timeout`
//! - Cancel the call cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out calls map to 504 Gateway Timeout

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;

use crate::net::{CallError, Invoker};
use crate::rpc::CallContext;

/// Wraps an [`Invoker`] with a per-call deadline.
#[derive(Debug, Clone)]
pub struct DeadlineInterceptor<I> {
    inner: I,
    timeout: Duration,
}

impl<I> DeadlineInterceptor<I> {
    pub fn new(inner: I, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

#[async_trait]
impl<I: Invoker> Invoker for DeadlineInterceptor<I> {
    async fn invoke(&self, ctx: CallContext, payload: Bytes) -> Result<Bytes, CallError> {
        let own = Instant::now() + self.timeout;
        let deadline = ctx.deadline().map_or(own, |existing| existing.min(own));
        let ctx = ctx.with_deadline(deadline);

        match tokio::time::timeout_at(deadline, self.inner.invoke(ctx, payload)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "Call deadline exceeded");
                Err(CallError::DeadlineExceeded(self.timeout))
            }
        }
    }
}
