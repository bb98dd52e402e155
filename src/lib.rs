//! HTTP/JSON to gRPC relay library.

pub mod config;
pub mod http;
pub mod net;
pub mod routing;
pub mod load_balancer;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod rpc;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
