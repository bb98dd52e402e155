//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use grpc_relay::config::RelayConfig;
use grpc_relay::lifecycle::{self, Shutdown};
use grpc_relay::net::ConnectionTracker;
use grpc_relay::rpc::{echo, EchoGreeter, GrpcDialer};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// An in-process `template.Greeter` echo backend.
pub struct EchoBackend {
    pub addr: SocketAddr,
    pub greeter: EchoGreeter,
    shutdown: Shutdown,
    handle: JoinHandle<()>,
}

impl EchoBackend {
    /// Stop serving and wait for the server task to exit.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// Start an echo backend on an ephemeral port.
pub async fn start_echo_backend() -> EchoBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let greeter = EchoGreeter::new();
    let shutdown = Shutdown::new();
    let mut rx = shutdown.subscribe();

    let handle = tokio::spawn({
        let greeter = greeter.clone();
        async move {
            let _ = echo::serve(listener, greeter, async move {
                let _ = rx.recv().await;
            })
            .await;
        }
    });

    EchoBackend {
        addr,
        greeter,
        shutdown,
        handle,
    }
}

/// A relay running in-process on an ephemeral port.
pub struct Relay {
    pub addr: SocketAddr,
    pub connections: ConnectionTracker,
    shutdown: Shutdown,
    handle: JoinHandle<std::io::Result<()>>,
}

impl Relay {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Trigger graceful shutdown and wait for the server to drain.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = self.handle.await;
    }
}

/// Start the relay with `config`, overriding its listen address.
pub async fn start_relay(mut config: RelayConfig) -> Relay {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let running = lifecycle::start(config, Arc::new(GrpcDialer::new()))
        .await
        .unwrap();
    let addr = running.local_addr().unwrap();
    let connections = running.server().connections().clone();

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(running.serve(shutdown.subscribe()));

    Relay {
        addr,
        connections,
        shutdown,
        handle,
    }
}

/// Relay configuration pointing at `endpoints`, tuned for fast tests.
pub fn relay_config(endpoints: &[SocketAddr]) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.endpoints = endpoints.iter().map(ToString::to_string).collect();
    config.dial.backoff_ms = 10;
    config.dial.connect_timeout_ms = 500;
    config.timeouts.call_ms = 2_000;
    config
}

/// An address nothing listens on.
#[allow(dead_code)]
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A directory holding one swagger definition.
#[allow(dead_code)]
pub fn swagger_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("relay-it-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("template.swagger.json"),
        r#"{"swagger":"2.0","info":{"title":"template.proto"}}"#,
    )
    .unwrap();
    dir
}

/// HTTP client that ignores proxy settings from the environment.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Poll `tracker` until it reports no open connections.
#[allow(dead_code)]
pub async fn wait_for_no_connections(tracker: &ConnectionTracker) -> bool {
    tracker.wait_for_idle(Duration::from_secs(2)).await
}
