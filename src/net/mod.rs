//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway call
//!     → interceptor.rs (Invoker: one connection per call)
//!     → manager.rs (select endpoint, dial, retry dial with backoff)
//!     → dialer.rs (transport seam; tonic implementation lives in rpc/)
//!     → connection.rs (lifetime tracking, close on drop)
//!
//! Connection States:
//!     Dialing → Open → Closed
//! ```
//!
//! # Design Decisions
//! - No connection is shared between calls or outlives the call that dialed it
//! - Every open connection is counted so leaks are observable
//! - The transport sits behind a trait so the lifecycle is testable without sockets

pub mod connection;
pub mod dialer;
pub mod interceptor;
pub mod manager;

pub use connection::{ConnectionTracker, LiveConnection};
pub use dialer::{Connection, Dialer, TransportError};
pub use interceptor::{CallError, Invoker, RefreshInterceptor};
pub use manager::{ConnectionManager, DialError, DialFailure};
