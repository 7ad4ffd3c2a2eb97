//! Placard server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve the greeting on the default address (localhost:2222)
//! placard-server
//!
//! # Serve publicly with a persistent host key
//! placard-server --host 0.0.0.0 --port 2222 --host-key .ssh/host_key
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use placard_server::{Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Placard SSH greeting server
#[derive(Parser, Debug)]
#[command(name = "placard-server")]
#[command(about = "Serves the Placard greeting screen over SSH")]
#[command(version)]
struct Args {
    /// Host to listen on
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "2222")]
    port: u16,

    /// Path to an OpenSSH host key (an ephemeral key is generated when
    /// omitted)
    #[arg(long)]
    host_key: Option<PathBuf>,

    /// Maximum concurrent sessions
    #[arg(long, default_value = "40")]
    max_sessions: usize,

    /// Idle seconds before a session is disconnected
    #[arg(long, default_value = "180")]
    idle_timeout_secs: u64,

    /// Seconds to wait for in-flight sessions at shutdown
    #[arg(long, default_value = "30")]
    grace_period_secs: u64,

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

    tracing::info!("Placard server starting");

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        host_key_path: args.host_key,
        max_sessions: args.max_sessions,
        idle_timeout: Duration::from_secs(args.idle_timeout_secs),
        grace_period: Duration::from_secs(args.grace_period_secs),
        ..ServerConfig::default()
    };

    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
