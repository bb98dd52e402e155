//! Echo implementation of `template.Greeter` for exercising the relay.

use clap::Parser;
use tokio::net::TcpListener;

use grpc_relay::config::ObservabilityConfig;
use grpc_relay::lifecycle::signals;
use grpc_relay::observability::logging;
use grpc_relay::rpc::{echo, EchoGreeter};

#[derive(Parser, Debug)]
#[command(name = "echo-backend")]
#[command(about = "gRPC echo backend for the relay", long_about = None)]
struct Cli {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:10000")]
    listen: String,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&ObservabilityConfig {
        log_level: cli.log_level.clone(),
        ..ObservabilityConfig::default()
    });

    let listener = TcpListener::bind(&cli.listen).await?;
    echo::serve(listener, EchoGreeter::new(), signals::wait_for_signal()).await?;

    tracing::info!("Echo backend stopped");
    Ok(())
}
