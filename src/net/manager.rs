//! Per-call connection lifecycle.
//!
//! # Responsibilities
//! - Select an endpoint and dial it for every call
//! - Retry failed dials against a fresh selection, with backoff
//! - Hand out [`LiveConnection`]s that close when the call drops them
//!
//! # Design Decisions
//! - Connections are never pooled or reused across calls
//! - Dial failures accumulate so the final error names every endpoint tried

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::RelayConfig;
use crate::load_balancer::{ConfigurationError, Endpoint, EndpointPool};
use crate::net::connection::{ConnectionTracker, LiveConnection};
use crate::net::dialer::{Dialer, TransportError};
use crate::observability::metrics;
use crate::resilience::DialRetryPolicy;

/// One failed dial attempt.
#[derive(Debug, Clone)]
pub struct DialFailure {
    pub endpoint: Endpoint,
    pub reason: TransportError,
}

impl fmt::Display for DialFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.endpoint, self.reason)
    }
}

/// Every dial attempt for a call failed.
#[derive(Debug, Clone, Error)]
#[error("no backend reachable after {} attempt(s) [{}]", .failures.len(), join_failures(.failures))]
pub struct DialError {
    pub failures: Vec<DialFailure>,
}

fn join_failures(failures: &[DialFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub struct ConnectionManager {
    pool: EndpointPool,
    dialer: Arc<dyn Dialer>,
    retry: DialRetryPolicy,
    connect_timeout: Duration,
    tracker: ConnectionTracker,
}

impl ConnectionManager {
    pub fn new(
        pool: EndpointPool,
        dialer: Arc<dyn Dialer>,
        retry: DialRetryPolicy,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            dialer,
            retry,
            connect_timeout,
            tracker: ConnectionTracker::new(),
        }
    }

    pub fn from_config(
        config: &RelayConfig,
        dialer: Arc<dyn Dialer>,
    ) -> Result<Self, ConfigurationError> {
        let pool = EndpointPool::from_config(config)?;
        Ok(Self::new(
            pool,
            dialer,
            DialRetryPolicy::from_config(&config.dial),
            Duration::from_millis(config.dial.connect_timeout_ms),
        ))
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Dial a fresh connection to a selected endpoint.
    pub async fn acquire(&self) -> Result<LiveConnection, DialError> {
        let mut failures = Vec::new();

        for attempt in 1..=self.retry.max_attempts() {
            let delay = self.retry.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let endpoint = self.pool.select();
            tracing::info!(endpoint = %endpoint, attempt, "Dialing backend");

            match self.dialer.dial(&endpoint, self.connect_timeout).await {
                Ok(connection) => {
                    metrics::record_dial(&endpoint, true);
                    let guard = self.tracker.track(&endpoint);
                    tracing::debug!(connection_id = %guard.id(), endpoint = %endpoint, "Connection opened");
                    return Ok(LiveConnection::new(connection, guard));
                }
                Err(reason) => {
                    metrics::record_dial(&endpoint, false);
                    tracing::warn!(endpoint = %endpoint, attempt, error = %reason, "Dial failed");
                    failures.push(DialFailure { endpoint, reason });
                }
            }
        }

        Err(DialError { failures })
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("pool", &self.pool)
            .field("retry", &self.retry)
            .field("connect_timeout", &self.connect_timeout)
            .field("open", &self.tracker.active_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::RoundRobin;
    use crate::net::testing::MockDialer;
    use crate::rpc::CallContext;
    use bytes::Bytes;

    fn endpoints() -> Vec<Endpoint> {
        vec![Endpoint::new("10.0.0.1", 10000), Endpoint::new("10.0.0.2", 10000)]
    }

    fn manager(dialer: Arc<MockDialer>, attempts: u32) -> ConnectionManager {
        let pool = EndpointPool::new(endpoints(), Arc::new(RoundRobin::new())).unwrap();
        ConnectionManager::new(
            pool,
            dialer,
            DialRetryPolicy::new(attempts, Duration::from_millis(20)),
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn every_acquire_dials_anew() {
        let dialer = Arc::new(MockDialer::new());
        let manager = manager(dialer.clone(), 2);

        for _ in 0..3 {
            let conn = manager.acquire().await.unwrap();
            assert_eq!(manager.tracker().active_count(), 1);
            conn.close();
            assert_eq!(manager.tracker().active_count(), 0);
        }
        assert_eq!(dialer.dials().len(), 3);
    }

    #[tokio::test]
    async fn failed_dial_retries_on_next_selection() {
        let dialer = Arc::new(MockDialer::new().unreachable(&endpoints()[0]));
        let manager = manager(dialer.clone(), 2);

        let started = tokio::time::Instant::now();
        let conn = manager.acquire().await.unwrap();
        assert_eq!(conn.endpoint(), &endpoints()[1]);
        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(dialer.dials(), endpoints());
    }

    #[tokio::test]
    async fn exhausted_attempts_report_every_failure() {
        let dialer = Arc::new(MockDialer::new().all_unreachable());
        let manager = manager(dialer.clone(), 3);

        let err = manager.acquire().await.unwrap_err();
        assert_eq!(err.failures.len(), 3);
        assert_eq!(dialer.dials().len(), 3);
        assert_eq!(manager.tracker().active_count(), 0);
        assert!(err.to_string().contains("3 attempt(s)"));
    }

    #[tokio::test]
    async fn connection_closes_after_failed_call() {
        let dialer = Arc::new(MockDialer::new().with_reply(|_, _| Err(tonic::Status::internal("boom"))));
        let manager = manager(dialer, 1);

        let mut conn = manager.acquire().await.unwrap();
        let ctx = CallContext::new("req-1", "/template.Greeter/SendGet");
        assert!(conn.unary(&ctx, Bytes::new()).await.is_err());
        drop(conn);
        assert_eq!(manager.tracker().active_count(), 0);
    }

    #[tokio::test]
    async fn cancelled_call_releases_connection() {
        let dialer = Arc::new(MockDialer::new().with_call_delay(Duration::from_secs(30)));
        let manager = Arc::new(manager(dialer, 1));

        let task = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move {
                let mut conn = manager.acquire().await?;
                let ctx = CallContext::new("req-1", "/template.Greeter/SendGet");
                let _ = conn.unary(&ctx, Bytes::new()).await;
                Ok::<_, DialError>(())
            })
        };

        assert!(wait_until(|| manager.tracker().active_count() == 1).await);
        task.abort();
        let _ = task.await;
        assert_eq!(manager.tracker().active_count(), 0);
    }

    async fn wait_until(cond: impl Fn() -> bool) -> bool {
        for _ in 0..100 {
            if cond() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }
}
