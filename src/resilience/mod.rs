//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Relayed call:
//!     → timeouts.rs (deadline over dial + invoke)
//!     → retries.rs (dial attempts and backoff, consumed by ConnectionManager)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - Only connection establishment is retried, never the call itself
//! - All resilience logic composes around the `Invoker` seam

pub mod retries;
pub mod timeouts;

pub use retries::DialRetryPolicy;
pub use timeouts::DeadlineInterceptor;
