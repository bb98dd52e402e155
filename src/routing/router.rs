//! Method table lookup.
//!
//! # Responsibilities
//! - Map a relay path segment (`template.Greeter/SendGet` or an alias like
//!   `get`) to the unary method it invokes
//! - Return an explicit no-match for anything else
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup via HashMap
//! - Explicit NoMatch rather than silent default

use std::collections::HashMap;

use crate::rpc::contract::{ServiceContract, UnaryMethod};

#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: HashMap<String, UnaryMethod>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every method of `contract` under `Service/Method` and its aliases.
    pub fn register(&mut self, contract: &ServiceContract) {
        for method in contract.methods() {
            let key = format!("{}/{}", contract.name(), method.name());
            tracing::debug!(route = %key, path = %method.path(), "Registered method");
            self.methods.insert(key, method.clone());
        }

        for (alias, target) in contract.aliases() {
            match contract.methods().iter().find(|m| m.name() == *target) {
                Some(method) => {
                    self.methods.insert((*alias).to_string(), method.clone());
                }
                None => {
                    tracing::warn!(alias = %alias, method = %target, "Alias targets unknown method");
                }
            }
        }
    }

    pub fn from_contract(contract: &ServiceContract) -> Self {
        let mut table = Self::new();
        table.register(contract);
        table
    }

    /// Look up a method by the path segment after the mount point.
    pub fn lookup(&self, service_name: &str) -> Option<&UnaryMethod> {
        self.methods.get(service_name.trim_start_matches('/'))
    }

    /// Registered route keys, sorted.
    pub fn routes(&self) -> Vec<&str> {
        let mut routes: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        routes.sort_unstable();
        routes
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
