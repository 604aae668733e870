//! CloudEvents client binary
//!
//! Opens a plaintext channel, sends one CloudEvent on `Greeter/Hello`, logs
//! the reply and closes the channel. An RPC failure is logged as a warning
//! and the process still exits successfully.
//!
//! # Usage
//!
//! ```bash
//! # Greet the default endpoint (localhost:52051)
//! cloudevents-client
//!
//! # Greet another endpoint, logging as JSON
//! cloudevents-client --target 10.0.0.7:52051 --json-logs
//! ```
//!
//! # Environment Variables
//!
//! - `CLOUDEVENTS_TARGET`: Service endpoint (default: `localhost:52051`)
//! - `CLOUDEVENTS_CONFIG`: Path to a TOML config file
//! - `CLOUDEVENTS_SHUTDOWN_TIMEOUT_SEC`: Channel shutdown grace period (default: `5`)
//! - `CLOUDEVENTS_WORKER_THREADS`: Threads driving the channel (default: `1`)
//! - `CLOUDEVENTS_JSON_LOGGING`: Enable JSON structured logging (default: `false`)
//! - `RUST_LOG`: Logging level (default: `info`)

use anyhow::Result;
use clap::Parser;
use cloudevents_grpc::{init_tracing, Client, ClientConfig, ManagedChannel};
use std::path::PathBuf;
use tracing::info;

/// Send a CloudEvent to a Greeter service
#[derive(Parser)]
#[command(name = "cloudevents-client")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Service endpoint as host:port
    #[arg(short, long, env = "CLOUDEVENTS_TARGET")]
    target: Option<String>,

    /// Config file path
    #[arg(short, long, env = "CLOUDEVENTS_CONFIG")]
    config: Option<PathBuf>,

    /// Seconds to wait for the channel to drain on shutdown
    #[arg(long)]
    shutdown_timeout_secs: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(target) = cli.target {
        config.target = target;
    }
    if let Some(secs) = cli.shutdown_timeout_secs {
        config.shutdown_timeout_secs = secs;
    }
    config.json_logging |= cli.json_logs;

    // Setup logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = if cli.quiet { "error" } else { log_level };
    init_tracing(config.json_logging, filter);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = %config.target,
        "CloudEvents client starting"
    );

    let channel = ManagedChannel::connect(&config)?;

    let client = Client::new(&channel);
    client.greet();

    channel.shutdown();
    Ok(())
}
