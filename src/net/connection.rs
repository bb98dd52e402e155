//! Backend connection lifetime tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Count open backend connections (leak detection, metrics)
//! - Close a connection exactly when its owning call lets go of it

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tonic::Status;

use crate::load_balancer::Endpoint;
use crate::net::dialer::Connection;
use crate::observability::metrics;
use crate::rpc::CallContext;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Counts open backend connections.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active_count: Arc<AtomicU64>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly opened connection. Returns a guard that decrements on drop.
    pub fn track(&self, endpoint: &Endpoint) -> ConnectionGuard {
        let open = self.active_count.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_open_connections(open);
        ConnectionGuard {
            active_count: Arc::clone(&self.active_count),
            id: ConnectionId::new(),
            endpoint: endpoint.clone(),
        }
    }

    /// Number of connections currently open.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Wait until every tracked connection is closed, or `timeout` elapses.
    /// Returns `true` if the tracker drained.
    pub async fn wait_for_idle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.active_count() > 0 {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }
}

/// Guard that tracks a connection's lifetime.
/// Decrements active count when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    active_count: Arc<AtomicU64>,
    id: ConnectionId,
    endpoint: Endpoint,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let open = self.active_count.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_open_connections(open);
        tracing::trace!(connection_id = %self.id, endpoint = %self.endpoint, "Connection closed");
    }
}

/// A dialed connection owned by exactly one call.
///
/// Dropping it (call finished, failed, or cancelled) closes the transport
/// and releases its slot in the tracker.
pub struct LiveConnection {
    inner: Box<dyn Connection>,
    guard: ConnectionGuard,
}

impl LiveConnection {
    pub(crate) fn new(inner: Box<dyn Connection>, guard: ConnectionGuard) -> Self {
        Self { inner, guard }
    }

    pub fn id(&self) -> ConnectionId {
        self.guard.id()
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.inner.endpoint()
    }

    pub async fn unary(&mut self, ctx: &CallContext, payload: Bytes) -> Result<Bytes, Status> {
        self.inner.unary(ctx, payload).await
    }

    /// Close the connection now.
    pub fn close(self) {
        drop(self);
    }
}

impl std::fmt::Debug for LiveConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveConnection")
            .field("id", &self.guard.id())
            .field("endpoint", self.inner.endpoint())
            .finish()
    }
}
