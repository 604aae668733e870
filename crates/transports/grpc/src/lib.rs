//! CloudEvents over gRPC
//!
//! Sends a single CloudEvent to a remote `Greeter` service over a plaintext
//! gRPC channel and receives one back.
//!
//! # Architecture
//!
//! - `generated`: prost/tonic code for `io.cloudevents.v1` and the
//!   `io.cloudevents.example.Greeter` service
//! - [`event`]: building and rendering envelopes
//! - [`channel`]: a channel that owns its runtime and shuts down with a
//!   bounded grace period
//! - [`client`]: blocking `Hello` calls over a borrowed channel
//! - [`server`]: an echo `Greeter` and a small tonic server around it
//!
//! # Usage
//!
//! ```no_run
//! use cloudevents_grpc::{Client, ClientConfig, ManagedChannel};
//!
//! # fn main() -> cloudevents_grpc::Result<()> {
//! let config = ClientConfig::default();
//! let channel = ManagedChannel::connect(&config)?;
//!
//! let client = Client::new(&channel);
//! client.greet();
//!
//! channel.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod server;

// Generated protobuf code
pub mod generated {
    /// CloudEvents protobuf format (`io.cloudevents.v1`)
    pub mod v1 {
        include!("generated/io.cloudevents.v1.rs");
    }

    /// Greeter service (`io.cloudevents.example`)
    pub mod example {
        include!("generated/io.cloudevents.example.rs");
    }
}

// Re-exports for public API
pub use channel::ManagedChannel;
pub use client::Client;
pub use config::{ClientConfig, ServerConfig};
pub use error::{Error, Result};
pub use event::{greeting_event, AttributeValue, EventBuilder, ShortDebug};
pub use generated::v1::CloudEvent;
pub use server::{EchoGreeter, GreeterServer};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for a binary
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used (e.g. `"info"`).
/// With `json_logging` each event is written as one JSON object per line.
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing(json_logging: bool, default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json_logging {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Get the version of this crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
