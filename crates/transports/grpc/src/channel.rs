//! Managed gRPC channel
//!
//! A [`ManagedChannel`] owns the tokio runtime that drives its connection,
//! so callers can stay synchronous. The channel connects lazily: a target
//! that cannot be reached shows up as an RPC status on the first call, not
//! as an error here.
//!
//! Shutting the channel down cancels outstanding work and waits at most
//! the configured grace period for the runtime's threads to finish.
//! Dropping the channel does the same, so every exit path closes it.

use crate::{ClientConfig, Error, Result};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info};

/// Plaintext channel to a single endpoint, with its own runtime
///
/// Must be created and shut down (or dropped) outside of any async context.
pub struct ManagedChannel {
    target: String,
    channel: Channel,
    handle: Handle,
    /// `None` once shut down
    runtime: Option<Runtime>,
    shutdown_timeout: Duration,
}

impl ManagedChannel {
    /// Build the runtime and a lazily-connecting channel to `config.target`
    ///
    /// # Errors
    ///
    /// * `Error::ConfigError` - empty, unparsable or TLS target
    /// * `Error::Io` - the runtime could not be started
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let uri = plaintext_uri(&config.target)?;
        let endpoint = Endpoint::from_shared(uri).map_err(|e| {
            Error::ConfigError(format!("Invalid gRPC target '{}': {}", config.target, e))
        })?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .thread_name("cloudevents-channel")
            .enable_all()
            .build()?;

        // The channel's buffer worker is spawned onto the current runtime
        let channel = {
            let _guard = runtime.enter();
            endpoint.connect_lazy()
        };

        info!(
            endpoint = %config.target,
            worker_threads = config.worker_threads,
            "Channel created"
        );

        Ok(Self {
            target: config.target.clone(),
            channel,
            handle: runtime.handle().clone(),
            runtime: Some(runtime),
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    /// Override the shutdown grace period taken from the config
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Target this channel was built for, as configured
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Cloneable tonic handle for building stubs
    pub fn channel(&self) -> Channel {
        self.channel.clone()
    }

    /// Handle to the runtime driving the channel
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Shut down now and wait up to the grace period for work to drain
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            debug!(
                endpoint = %self.target,
                timeout_ms = self.shutdown_timeout.as_millis() as u64,
                "Shutting down channel"
            );
            runtime.shutdown_timeout(self.shutdown_timeout);
            info!(endpoint = %self.target, "Channel shut down");
        }
    }
}

impl Drop for ManagedChannel {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for ManagedChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedChannel")
            .field("target", &self.target)
            .field("shutdown", &self.runtime.is_none())
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}

/// Turn a `host:port` target into a plaintext URI
fn plaintext_uri(target: &str) -> Result<String> {
    let target = target.trim();

    if target.is_empty() {
        return Err(Error::ConfigError(
            "gRPC target cannot be empty".to_string(),
        ));
    }

    if target.starts_with("https://") {
        return Err(Error::ConfigError(format!(
            "TLS target '{}' is not supported, use a plaintext host:port",
            target
        )));
    }

    if target.starts_with("http://") {
        Ok(target.to_string())
    } else {
        Ok(format!("http://{}", target))
    }
}
