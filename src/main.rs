use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use rover_tcp_runtime::actuator::{ActuationDriver, Pca9685, SimPwm};
use rover_tcp_runtime::config::{DEFAULT_BIND, DEFAULT_PORT};
use rover_tcp_runtime::server::CommandServer;

/// Remote actuation runtime: TCP motion commands -> PWM channels
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_BIND)]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Log PWM writes instead of driving the I2C controller
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=info or debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init(); // installs the subscriber globally

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Runtime error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind((args.bind.as_str(), args.port)).await?;

    if args.dry_run {
        let driver = ActuationDriver::new(SimPwm);
        CommandServer::new(driver).serve(listener).await
    } else {
        let driver = ActuationDriver::new(Pca9685::open()?);
        CommandServer::new(driver).serve(listener).await
    }
}
