//! Sector relay binary.
//!
//! # Usage
//!
//! ```bash
//! sector-relay --bind 0.0.0.0:8765
//!
//! # then, on each participant
//! sector-tui --profile sector --relay relay.lan:8765
//! ```

use clap::Parser;
use sector_relay::RelayServer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Sector chat relay
#[derive(Parser, Debug)]
#[command(name = "sector-relay")]
#[command(about = "Stores and forwards sector chat namespaces between peers")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8765")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let relay = RelayServer::bind(&args.bind).await?;
    relay.run().await?;

    Ok(())
}
