//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Endpoint pool must be non-empty and every entry a valid `host:port`
//! - Validate value ranges (timeouts > 0, attempts > 0)
//! - Validate addresses and forwarded header names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::load_balancer::{Endpoint, EndpointParseError};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("endpoint pool is empty; at least one backend is required")]
    EmptyEndpointPool,

    #[error("invalid endpoint '{value}': {source}")]
    InvalidEndpoint {
        value: String,
        source: EndpointParseError,
    },

    #[error("invalid listen address '{0}'")]
    InvalidListenAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("mount path '{0}' must start with '/' and not end with '/'")]
    InvalidMountPath(String),

    #[error("invalid forwarded header name '{0}'")]
    InvalidHeaderName(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.is_empty() {
        errors.push(ValidationError::EmptyEndpointPool);
    }
    for value in &config.endpoints {
        if let Err(source) = value.parse::<Endpoint>() {
            errors.push(ValidationError::InvalidEndpoint {
                value: value.clone(),
                source,
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidListenAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mount = &config.relay.mount_path;
    if !mount.starts_with('/') || mount.len() < 2 || mount.ends_with('/') {
        errors.push(ValidationError::InvalidMountPath(mount.clone()));
    }

    for name in &config.relay.forward_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.clone()));
        }
    }

    if config.dial.max_attempts == 0 {
        errors.push(ValidationError::Zero("dial.max_attempts"));
    }
    if config.dial.connect_timeout_ms == 0 {
        errors.push(ValidationError::Zero("dial.connect_timeout_ms"));
    }
    if config.timeouts.call_ms == 0 {
        errors.push(ValidationError::Zero("timeouts.call_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
