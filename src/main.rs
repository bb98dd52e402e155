//! HTTP/JSON to gRPC relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                        RELAY                         │
//!                         │                                                      │
//!   POST /relay/{method}  │  ┌─────────┐   ┌──────────┐   ┌──────────────────┐   │
//!   ──────────────────────┼─▶│  http   │──▶│ routing  │──▶│ gateway          │   │
//!                         │  │ server  │   │ methods  │   │ JSON ⇄ protobuf  │   │
//!                         │  └─────────┘   └──────────┘   └────────┬─────────┘   │
//!                         │                                        │             │
//!                         │                                        ▼             │
//!                         │   ┌──────────────┐   ┌──────────────────────────┐    │
//!                         │   │load_balancer │◀──│ net: dial per call,      │────┼──▶ gRPC backend
//!                         │   │ random pick  │   │ retry dial, close after  │    │    (random replica)
//!                         │   └──────────────┘   └──────────────────────────┘    │
//!                         │                                                      │
//!                         │  config · observability · resilience · lifecycle     │
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use grpc_relay::config::{read_config, RelayConfig};
use grpc_relay::lifecycle::{self, signals, Shutdown};
use grpc_relay::observability::{logging, metrics};
use grpc_relay::rpc::GrpcDialer;

#[derive(Parser, Debug)]
#[command(name = "grpc-relay")]
#[command(about = "Relay HTTP/JSON requests to randomly selected gRPC backends", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:32600
    #[arg(short, long)]
    listen: Option<String>,

    /// Backend endpoint as host:port; repeat for several replicas
    #[arg(short, long = "endpoint")]
    endpoints: Vec<String>,

    /// Directory holding *.swagger.json files
    #[arg(long)]
    swagger_dir: Option<String>,
}

impl Cli {
    fn resolve_config(&self) -> Result<RelayConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => RelayConfig::default(),
        };

        if let Some(listen) = &self.listen {
            config.listener.bind_address = listen.clone();
        }
        if !self.endpoints.is_empty() {
            config.endpoints = self.endpoints.clone();
        }
        if let Some(dir) = &self.swagger_dir {
            config.swagger.dir = dir.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    logging::init(&config.observability);
    tracing::info!("grpc-relay v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let running = lifecycle::start(config, Arc::new(GrpcDialer::new())).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);
    running.serve(shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_defaults() {
        let cli = Cli::parse_from([
            "grpc-relay",
            "--listen",
            "127.0.0.1:9000",
            "--endpoint",
            "a:1",
            "--endpoint",
            "b:2",
            "--swagger-dir",
            "docs",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.endpoints, vec!["a:1", "b:2"]);
        assert_eq!(config.swagger.dir, "docs");
    }

    #[test]
    fn no_flags_means_defaults() {
        let config = Cli::parse_from(["grpc-relay"]).resolve_config().unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:32600");
        assert_eq!(config.endpoints, vec!["localhost:10000", "localhost:10001"]);
        assert_eq!(config.swagger.dir, "template");
    }
}
