//! Uniform random load balancing strategy.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::load_balancer::{Endpoint, LoadBalancer};

#[derive(Debug)]
enum RandomSource {
    /// Per-thread generator; no shared state between callers.
    ThreadLocal,
    /// Deterministic generator shared by all callers.
    Seeded(Mutex<StdRng>),
}

/// Random selector.
/// Picks uniformly, with replacement, from the endpoint slice.
#[derive(Debug)]
pub struct RandomSelector {
    source: RandomSource,
}

impl RandomSelector {
    /// Selector backed by the thread-local generator.
    pub fn new() -> Self {
        Self {
            source: RandomSource::ThreadLocal,
        }
    }

    /// Selector with a fixed seed, for reproducible selection sequences.
    pub fn seeded(seed: u64) -> Self {
        Self {
            source: RandomSource::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    fn index(&self, len: usize) -> usize {
        match &self.source {
            RandomSource::ThreadLocal => rand::thread_rng().gen_range(0..len),
            RandomSource::Seeded(rng) => rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .gen_range(0..len),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadBalancer for RandomSelector {
    fn next_endpoint<'a>(&self, endpoints: &'a [Endpoint]) -> Option<&'a Endpoint> {
        if endpoints.is_empty() {
            return None;
        }
        endpoints.get(self.index(endpoints.len()))
    }
}
