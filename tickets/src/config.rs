//! Configuration management for the ticket client.
//!
//! Loads configuration from environment variables with sensible defaults.

use prioritize_runtime::StoreConfig;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "tickets=debug,prioritize_runtime=debug";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: {value:?}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
}

/// Which ticket service implementation to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// In-process service with demo data
    #[default]
    InMemory,
    /// Remote service at `api_url`
    Http,
}

impl std::str::FromStr for Backend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(Self::InMemory),
            "http" => Ok(Self::Http),
            _ => Err(()),
        }
    }
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service implementation (`TICKETS_BACKEND`: `memory` or `http`)
    pub backend: Backend,
    /// Ticket backend base URL (`TICKETS_API_URL`)
    pub api_url: String,
    /// Bearer token for the backend (`TICKETS_API_TOKEN`)
    pub api_token: Option<String>,
    /// Per-request timeout (`TICKETS_REQUEST_TIMEOUT_SECS`, default 10)
    pub request_timeout: Duration,
    /// Graceful shutdown timeout (`STORE_SHUTDOWN_TIMEOUT_SECS`, default 30)
    pub shutdown_timeout: Duration,
    /// Address reported for the metrics endpoint (`METRICS_ADDR`, unset disables
    /// metrics); nothing listens on it, the demo prints the rendered text instead
    pub metrics_addr: Option<SocketAddr>,
    /// Log filter (`RUST_LOG`)
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: Backend::InMemory,
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            request_timeout: Duration::from_secs(10),
            shutdown_timeout: Duration::from_secs(30),
            metrics_addr: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            backend: parse(&lookup, "TICKETS_BACKEND")?.unwrap_or(defaults.backend),
            api_url: lookup("TICKETS_API_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.api_url),
            api_token: lookup("TICKETS_API_TOKEN").filter(|token| !token.is_empty()),
            request_timeout: parse_secs(&lookup, "TICKETS_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
            shutdown_timeout: parse_secs(&lookup, "STORE_SHUTDOWN_TIMEOUT_SECS")?
                .unwrap_or(defaults.shutdown_timeout),
            metrics_addr: parse(&lookup, "METRICS_ADDR")?,
            log_filter: lookup("RUST_LOG").unwrap_or(defaults.log_filter),
        })
    }

    /// Store runtime settings derived from this configuration
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default().with_shutdown_timeout(self.shutdown_timeout)
    }
}

fn parse<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value })
        })
        .transpose()
}

fn parse_secs<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse::<F, u64>(lookup, name)?.map(Duration::from_secs))
}
