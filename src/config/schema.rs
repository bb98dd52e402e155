//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Backend replicas as `host:port` strings.
    pub endpoints: Vec<String>,

    /// Endpoint selection strategy.
    pub load_balancing: LoadBalancingConfig,

    /// Dial and retry settings for backend connections.
    pub dial: DialConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Relay (HTTP to RPC) behaviour.
    pub relay: RelaySettings,

    /// Static swagger documentation.
    pub swagger: SwaggerConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            endpoints: vec![
                "localhost:10000".to_string(),
                "localhost:10001".to_string(),
            ],
            load_balancing: LoadBalancingConfig::default(),
            dial: DialConfig::default(),
            timeouts: TimeoutConfig::default(),
            relay: RelaySettings::default(),
            swagger: SwaggerConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:32600").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:32600".to_string(),
        }
    }
}

/// Endpoint selection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Uniform random selection with replacement.
    #[default]
    Random,
    /// Rotate through endpoints in configuration order.
    RoundRobin,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadBalancingConfig {
    pub strategy: Strategy,

    /// Fixed seed for the random strategy. Unset means thread-local entropy.
    pub seed: Option<u64>,
}

/// Backend dial configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DialConfig {
    /// Connection establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Total dial attempts per call, each against a fresh selection.
    pub max_attempts: u32,

    /// Fixed wait between dial attempts in milliseconds.
    pub backoff_ms: u64,
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 2000,
            max_attempts: 2,
            backoff_ms: 1000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a single relayed RPC call (dial + invoke) in milliseconds.
    pub call_ms: u64,

    /// Total time allowed for an inbound HTTP request in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            call_ms: 10_000,
            request_secs: 30,
        }
    }
}

/// Relay behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySettings {
    /// Path prefix the gateway handler is mounted under.
    pub mount_path: String,

    /// Inbound headers forwarded to the backend as call metadata.
    pub forward_headers: Vec<String>,

    /// Echo `Origin` and answer CORS preflight requests.
    pub cors_enabled: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            mount_path: "/relay".to_string(),
            forward_headers: vec!["X-Customer-Header".to_string()],
            cors_enabled: true,
        }
    }
}

/// Swagger file server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SwaggerConfig {
    /// Directory containing `*.swagger.json` definitions.
    pub dir: String,
}

impl Default for SwaggerConfig {
    fn default() -> Self {
        Self {
            dir: "template".to_string(),
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) used when RUST_LOG is unset.
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
