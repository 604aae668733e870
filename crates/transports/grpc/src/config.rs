//! Configuration for the Greeter client and server
//!
//! Configuration can be loaded from a TOML file or from environment variables.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Client-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Service endpoint as `host:port` (plaintext)
    #[serde(default = "default_target")]
    pub target: String,

    /// Upper bound on the wait for the channel to drain on shutdown
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Worker threads for the channel's runtime
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logging: bool,
}

/// Server-side configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logging: bool,
}

fn default_target() -> String {
    "localhost:52051".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

fn default_worker_threads() -> usize {
    1
}

fn default_bind_address() -> String {
    "127.0.0.1:52051".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            target: default_target(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            worker_threads: default_worker_threads(),
            json_logging: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            json_logging: false,
        }
    }
}

impl ClientConfig {
    /// Shutdown grace period as a [`Duration`]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ClientConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables, falling back to defaults
    ///
    /// - `CLOUDEVENTS_TARGET`
    /// - `CLOUDEVENTS_SHUTDOWN_TIMEOUT_SEC`
    /// - `CLOUDEVENTS_WORKER_THREADS`
    /// - `CLOUDEVENTS_JSON_LOGGING`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ClientConfig::default();

        if let Some(target) = lookup("CLOUDEVENTS_TARGET") {
            config.target = target;
        }
        if let Some(secs) = lookup("CLOUDEVENTS_SHUTDOWN_TIMEOUT_SEC") {
            if let Ok(s) = secs.parse() {
                config.shutdown_timeout_secs = s;
            }
        }
        if let Some(threads) = lookup("CLOUDEVENTS_WORKER_THREADS") {
            if let Ok(t) = threads.parse::<usize>() {
                if t > 0 {
                    config.worker_threads = t;
                }
            }
        }
        if let Some(json) = lookup("CLOUDEVENTS_JSON_LOGGING") {
            config.json_logging = parse_flag(&json).unwrap_or(config.json_logging);
        }

        config
    }

    /// Load configuration from file if it exists, otherwise from environment
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        if let Some(p) = path {
            if p.as_ref().exists() {
                return Self::from_file(p);
            }
        }
        Ok(Self::from_env())
    }

    /// Check values that serde defaults cannot guard
    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(Error::ConfigError("target cannot be empty".to_string()));
        }
        if self.worker_threads == 0 {
            return Err(Error::ConfigError(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from environment variables, falling back to defaults
    ///
    /// - `GREETER_BIND_ADDRESS`
    /// - `GREETER_JSON_LOGGING`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ServerConfig::default();

        if let Some(addr) = lookup("GREETER_BIND_ADDRESS") {
            config.bind_address = addr;
        }
        if let Some(json) = lookup("GREETER_JSON_LOGGING") {
            config.json_logging = parse_flag(&json).unwrap_or(config.json_logging);
        }

        config
    }

    /// Load configuration from file if it exists, otherwise from environment
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        if let Some(p) = path {
            if p.as_ref().exists() {
                return Self::from_file(p);
            }
        }
        Ok(Self::from_env())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
