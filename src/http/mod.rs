//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → cors.rs (origin echo, preflight short-circuit)
//!     → request.rs (request ID, forwarded headers)
//!     → gateway.rs (method lookup, JSON ⇄ protobuf, invoke backend)
//!     → response.rs (status mapping, error envelope)
//!     → Send to client
//!
//! GET /swagger/*.swagger.json → swagger.rs (static files)
//! ```

pub mod cors;
pub mod gateway;
pub mod request;
pub mod response;
pub mod server;
pub mod swagger;

pub use gateway::Gateway;
pub use request::X_REQUEST_ID;
pub use response::{ErrorEnvelope, GatewayError};
pub use server::HttpServer;
