//! Greeter server binary entry point
//!
//! Serves an echo `Greeter` for the CloudEvents client to talk to.
//!
//! # Environment Variables
//!
//! - `GREETER_BIND_ADDRESS`: Server bind address (default: `127.0.0.1:52051`)
//! - `GREETER_JSON_LOGGING`: Enable JSON structured logging (default: `false`)
//! - `RUST_LOG`: Logging level (default: `info`)

use anyhow::Result;
use cloudevents_grpc::{init_tracing, GreeterServer, ServerConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = ServerConfig::from_env();

    init_tracing(config.json_logging, "info");

    info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.bind_address,
        "Greeter server starting"
    );

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => {
                // Without a signal handler the server runs until killed
                error!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        }
    };

    match GreeterServer::new(config).serve_with_shutdown(shutdown).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "Server error");
            Err(e.into())
        }
    }
}
