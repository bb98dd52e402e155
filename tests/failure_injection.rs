//! Failure injection tests for the relay.

use std::time::{Duration, Instant};

use grpc_relay::config::{ConfigError, Strategy};
use grpc_relay::lifecycle::{self, StartupError};
use grpc_relay::rpc::GrpcDialer;
use reqwest::StatusCode;
use sdk_rust::{RelayClient, RelayOutcome};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

mod common;

#[tokio::test]
async fn unreachable_pool_is_unavailable() {
    let dead_a = common::unused_addr().await;
    let dead_b = common::unused_addr().await;
    let relay = common::start_relay(common::relay_config(&[dead_a, dead_b])).await;
    let client = RelayClient::new(&relay.url());

    match client.send_get("alice").await.unwrap() {
        RelayOutcome::Failed(status, body) => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body.code, 14);
            assert!(body.message.contains("no backend reachable"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(relay.connections.active_count(), 0);
}

#[tokio::test]
async fn dead_replica_is_routed_around() {
    let dead = common::unused_addr().await;
    let live = common::start_echo_backend().await;

    // Round-robin makes the dead replica the first pick of every call.
    let mut config = common::relay_config(&[dead, live.addr]);
    config.load_balancing.strategy = Strategy::RoundRobin;
    let relay = common::start_relay(config).await;
    let client = RelayClient::new(&relay.url());

    for i in 0..5 {
        match client.send_get(&format!("user-{i}")).await.unwrap() {
            RelayOutcome::Ok(reply) => assert_eq!(reply.message, format!("Received GET method user-{i}")),
            other => panic!("call {i} failed: {other:?}"),
        }
    }
    assert_eq!(live.greeter.served(), 5);
}

#[tokio::test]
async fn backend_going_away_turns_into_503() {
    let backend = common::start_echo_backend().await;
    let relay = common::start_relay(common::relay_config(&[backend.addr])).await;
    let client = RelayClient::new(&relay.url());

    assert!(matches!(client.send_get("a").await.unwrap(), RelayOutcome::Ok(_)));

    backend.stop().await;

    match client.send_get("b").await.unwrap() {
        RelayOutcome::Failed(status, _) => assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(common::wait_for_no_connections(&relay.connections).await);
}

#[tokio::test]
async fn silent_backend_is_bounded_by_deadline() {
    // Accepts TCP and never speaks HTTP/2.
    let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let silent_addr = silent.local_addr().unwrap();
    tokio::spawn(async move {
        let mut sockets = Vec::new();
        while let Ok((mut socket, _)) = silent.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            sockets.push(socket);
        }
    });

    let mut config = common::relay_config(&[silent_addr]);
    config.dial.connect_timeout_ms = 200;
    config.dial.max_attempts = 1;
    config.timeouts.call_ms = 500;
    let relay = common::start_relay(config).await;
    let client = RelayClient::new(&relay.url());

    let started = Instant::now();
    match client.send_get("slow").await.unwrap() {
        RelayOutcome::Failed(status, _) => assert!(
            status == StatusCode::GATEWAY_TIMEOUT || status == StatusCode::SERVICE_UNAVAILABLE,
            "unexpected status {status}"
        ),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(common::wait_for_no_connections(&relay.connections).await);
}

#[tokio::test]
async fn empty_pool_is_rejected_at_startup() {
    let mut config = common::relay_config(&[]);
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let err = lifecycle::start(config, Arc::new(GrpcDialer::new()))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, StartupError::Config(ConfigError::Validation(_))));
}

#[tokio::test]
async fn no_connection_leak_across_mixed_outcomes() {
    let backend = common::start_echo_backend().await;
    let relay = common::start_relay(common::relay_config(&[backend.addr])).await;
    let client = RelayClient::new(&relay.url());
    let http = common::http_client();

    for i in 0..10 {
        if i % 2 == 0 {
            client.send_get("ok").await.unwrap();
        } else {
            http.post(format!("{}/relay/get", relay.url()))
                .body("not json")
                .send()
                .await
                .unwrap();
        }
    }

    assert!(common::wait_for_no_connections(&relay.connections).await);
    assert_eq!(backend.greeter.served(), 5);
}

#[tokio::test]
async fn client_disconnect_releases_backend_connection() {
    // Backend that accepts but never answers keeps the call in flight.
    let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let silent_addr = silent.local_addr().unwrap();
    tokio::spawn(async move {
        let mut sockets = Vec::new();
        while let Ok((socket, _)) = silent.accept().await {
            sockets.push(socket);
        }
    });

    let mut config = common::relay_config(&[silent_addr]);
    config.timeouts.call_ms = 30_000;
    config.dial.connect_timeout_ms = 5_000;
    let relay = common::start_relay(config).await;

    let http = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();
    let result = http
        .post(format!("{}/relay/get", relay.url()))
        .json(&serde_json::json!({"name": "gone"}))
        .send()
        .await;
    assert!(result.is_err(), "client should have timed out");

    assert!(common::wait_for_no_connections(&relay.connections).await);
}
