//! Endpoint pool management.
//!
//! # Responsibilities
//! - Hold the immutable, non-empty set of backend endpoints
//! - Apply the configured load balancing strategy to select one per call

use std::sync::Arc;

use thiserror::Error;

use crate::config::{LoadBalancingConfig, RelayConfig, Strategy};
use crate::load_balancer::{
    endpoint::{Endpoint, EndpointParseError},
    random::RandomSelector,
    round_robin::RoundRobin,
    LoadBalancer,
};

/// Pool construction failures. These are configuration errors and fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("endpoint pool is empty")]
    EmptyPool,
    #[error("invalid endpoint '{value}': {source}")]
    InvalidEndpoint {
        value: String,
        source: EndpointParseError,
    },
}

/// The read-only set of backend replicas plus the strategy choosing among them.
#[derive(Debug, Clone)]
pub struct EndpointPool {
    endpoints: Arc<[Endpoint]>,
    balancer: Arc<dyn LoadBalancer>,
}

impl EndpointPool {
    /// Create a pool. Fails if `endpoints` is empty.
    pub fn new(
        endpoints: Vec<Endpoint>,
        balancer: Arc<dyn LoadBalancer>,
    ) -> Result<Self, ConfigurationError> {
        if endpoints.is_empty() {
            return Err(ConfigurationError::EmptyPool);
        }
        Ok(Self {
            endpoints: endpoints.into(),
            balancer,
        })
    }

    /// Build the pool described by the relay configuration.
    pub fn from_config(config: &RelayConfig) -> Result<Self, ConfigurationError> {
        let endpoints = config
            .endpoints
            .iter()
            .map(|value| {
                value
                    .parse::<Endpoint>()
                    .map_err(|source| ConfigurationError::InvalidEndpoint {
                        value: value.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(endpoints, balancer_for(&config.load_balancing))
    }

    /// Select the endpoint for the next call.
    pub fn select(&self) -> Endpoint {
        // The pool is never empty, so the strategy always yields an entry.
        self.balancer
            .next_endpoint(&self.endpoints)
            .unwrap_or(&self.endpoints[0])
            .clone()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn balancer_for(config: &LoadBalancingConfig) -> Arc<dyn LoadBalancer> {
    match (config.strategy, config.seed) {
        (Strategy::Random, Some(seed)) => Arc::new(RandomSelector::seeded(seed)),
        (Strategy::Random, None) => Arc::new(RandomSelector::new()),
        (Strategy::RoundRobin, _) => Arc::new(RoundRobin::new()),
    }
}
