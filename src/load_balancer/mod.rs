//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call needs a backend
//!     → pool.rs (immutable endpoint set)
//!     → Apply load balancing algorithm:
//!         - random.rs (uniform, with replacement; default)
//!         - round_robin.rs (rotate through endpoints)
//!     → endpoint.rs (address handed to the dialer)
//! ```
//!
//! # Design Decisions
//! - Endpoint set is fixed at startup and never locked
//! - Randomness is injected so selection can be made deterministic
//! - No stickiness: every call selects again

pub mod endpoint;
pub mod pool;
pub mod random;
pub mod round_robin;

pub use endpoint::{Endpoint, EndpointParseError};
pub use pool::{ConfigurationError, EndpointPool};
pub use random::RandomSelector;
pub use round_robin::RoundRobin;

/// Strategy for choosing one endpoint out of a slice.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Pick the next endpoint, or `None` if the slice is empty.
    fn next_endpoint<'a>(&self, endpoints: &'a [Endpoint]) -> Option<&'a Endpoint>;
}
