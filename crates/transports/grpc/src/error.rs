//! Error types for cloudevents-grpc

use thiserror::Error;

/// Result type alias for cloudevents-grpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cloudevents-grpc
///
/// RPC failures on a call are not represented here: they come back as
/// [`tonic::Status`] from [`crate::Client::hello`].
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration value or target
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Event is missing required attributes or carries an illegal extension
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// I/O error (runtime construction, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Server bind or serve failure
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}
