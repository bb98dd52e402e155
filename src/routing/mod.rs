//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! POST {mount}/{service_name}
//!     → router.rs (method table lookup)
//!     → Return: UnaryMethod or NoMatch (404)
//!
//! Table Compilation (at startup):
//!     ServiceContract[]
//!     → Key by "Service/Method" plus short aliases
//!     → Freeze as immutable MethodTable
//! ```
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same method

pub mod router;

pub use router::MethodTable;
