//! Load testing for the relay.

use std::time::Instant;

use sdk_rust::{RelayClient, RelayOutcome};

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_load_performance() {
    // 1. Setup two echo replicas
    let first = common::start_echo_backend().await;
    let second = common::start_echo_backend().await;

    // 2. Start relay
    let relay = common::start_relay(common::relay_config(&[first.addr, second.addr])).await;

    // 3. Run load test
    let concurrency = 20; // Reduced for consistency in debug mode
    let requests_per_task = 25;
    let total_requests = concurrency * requests_per_task;

    let start = Instant::now();
    let mut tasks = Vec::new();
    for task_id in 0..concurrency {
        let client = RelayClient::new(&relay.url());
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for i in 0..requests_per_task {
                let req_start = Instant::now();
                let name = format!("t{task_id}-r{i}");
                if let Ok(RelayOutcome::Ok(reply)) = client.send_get(&name).await {
                    assert_eq!(reply.message, format!("Received GET method {name}"));
                    latencies.push(req_start.elapsed());
                }
            }
            latencies
        }));
    }

    let mut all_latencies = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }

    let duration = start.elapsed();
    let rps = total_requests as f64 / duration.as_secs_f64();

    assert_eq!(all_latencies.len(), total_requests, "every relayed call should succeed");

    all_latencies.sort();
    let p50 = all_latencies[all_latencies.len() / 2];
    let p95 = all_latencies[(all_latencies.len() as f64 * 0.95) as usize];
    let p99 = all_latencies[(all_latencies.len() as f64 * 0.99) as usize];

    println!("\n--- Load Test Results ---");
    println!("Total Requests: {}", total_requests);
    println!("Concurrency:    {}", concurrency);
    println!("Total Duration: {:?}", duration);
    println!("Requests/sec:   {:.2}", rps);
    println!("P50 Latency:    {:?}", p50);
    println!("P95 Latency:    {:?}", p95);
    println!("P99 Latency:    {:?}", p99);
    println!(
        "Replica split:  {}/{}",
        first.greeter.served(),
        second.greeter.served()
    );
    println!("-------------------------\n");

    // 4. Every call dialed and closed its own connection
    assert_eq!(first.greeter.served() + second.greeter.served(), total_requests);
    assert!(common::wait_for_no_connections(&relay.connections).await);

    relay.stop().await;
}
