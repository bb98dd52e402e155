//! Per-request call context.

use std::time::Duration;

use tokio::time::Instant;

/// Data threaded from the inbound HTTP request to the outbound RPC call.
#[derive(Debug, Clone)]
pub struct CallContext {
    request_id: String,
    method: String,
    metadata: Vec<(String, String)>,
    deadline: Option<Instant>,
}

impl CallContext {
    /// `method` is the full RPC path, e.g. `/template.Greeter/SendGet`.
    pub fn new(request_id: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into(),
            metadata: Vec::new(),
            deadline: None,
        }
    }

    /// Attach a metadata entry. Keys are lowercased as HTTP/2 requires.
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.push((key.to_ascii_lowercase(), value.into()));
        self
    }

    /// Tighten the deadline; an earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn metadata(&self) -> &[(String, String)] {
        &self.metadata
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, if one is set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }
}
