//! Backend endpoint abstraction.
//!
//! # Responsibilities
//! - Represent a single backend replica address (host, port)
//! - Parse `host:port` and `[v6]:port` forms from configuration
//! - Render the URI used to dial the replica

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reasons an endpoint string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointParseError {
    #[error("missing ':port'")]
    MissingPort,
    #[error("empty host")]
    EmptyHost,
    #[error("malformed host '{0}'")]
    InvalidHost(String),
    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

/// An immutable backend address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Plaintext HTTP/2 URI for dialing this endpoint.
    pub fn uri(&self) -> String {
        format!("http://{}", self)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s.trim().rsplit_once(':').ok_or(EndpointParseError::MissingPort)?;

        let host = match host.strip_prefix('[') {
            Some(inner) => inner
                .strip_suffix(']')
                .ok_or_else(|| EndpointParseError::InvalidHost(host.to_string()))?,
            // Bare IPv6 literals are ambiguous without brackets.
            None if host.contains(':') => {
                return Err(EndpointParseError::InvalidHost(host.to_string()))
            }
            None => host,
        };
        if host.is_empty() {
            return Err(EndpointParseError::EmptyHost);
        }

        let port = match port.parse::<u16>() {
            Ok(p) if p != 0 => p,
            _ => return Err(EndpointParseError::InvalidPort(port.to_string())),
        };

        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let ep: Endpoint = "localhost:10000".parse().unwrap();
        assert_eq!(ep.host(), "localhost");
        assert_eq!(ep.port(), 10000);
        assert_eq!(ep.uri(), "http://localhost:10000");
    }

    #[test]
    fn parses_bracketed_ipv6() {
        let ep: Endpoint = "[::1]:10001".parse().unwrap();
        assert_eq!(ep.host(), "::1");
        assert_eq!(ep.to_string(), "[::1]:10001");
    }

    #[test]
    fn rejects_malformed_entries() {
        assert_eq!("localhost".parse::<Endpoint>(), Err(EndpointParseError::MissingPort));
        assert_eq!(":10000".parse::<Endpoint>(), Err(EndpointParseError::EmptyHost));
        assert!(matches!("::1:80".parse::<Endpoint>(), Err(EndpointParseError::InvalidHost(_))));
        assert!(matches!("host:0".parse::<Endpoint>(), Err(EndpointParseError::InvalidPort(_))));
        assert!(matches!("host:http".parse::<Endpoint>(), Err(EndpointParseError::InvalidPort(_))));
    }
}
