//! Cache configuration: location string plus options

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::cli::CliArgs;
use crate::utils::ConfigurationError;

/// Configuration endpoint address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a cache location holding exactly one `host:port` server
    ///
    /// Servers may be separated by `,` or `;`; blank items are skipped.
    pub fn from_location(location: &str) -> Result<Self, ConfigurationError> {
        let servers: Vec<&str> = location
            .split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let server = match servers.as_slice() {
            [] => return Err(ConfigurationError::Empty),
            [server] => *server,
            many => return Err(ConfigurationError::MultipleEndpoints(many.len())),
        };

        let parts: Vec<&str> = server.split(':').collect();
        let (host, port) = match parts.as_slice() {
            [host, port] if !host.is_empty() => (*host, *port),
            _ => return Err(ConfigurationError::InvalidFormat(server.to_string())),
        };

        let port: u16 = port
            .parse()
            .map_err(|_| ConfigurationError::InvalidPort(server.to_string()))?;

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Options forwarded verbatim to the multi-node cache client
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientOptions {
    /// Swallow node errors inside the client instead of raising them
    #[serde(default = "default_ignore_exc")]
    pub ignore_exc: bool,

    /// Every other option, untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_ignore_exc() -> bool {
    true
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            ignore_exc: default_ignore_exc(),
            extra: BTreeMap::new(),
        }
    }
}

impl ClientOptions {
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

/// Cache options
///
/// `cluster_timeout_ms` and `ignore_cluster_errors` are consumed by
/// discovery; the rest is passed to the client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CacheOptions {
    /// Connect/read/write timeout for the configuration endpoint
    #[serde(default)]
    pub cluster_timeout_ms: Option<u64>,

    /// Fall back to the configuration endpoint as the only node when
    /// discovery fails
    #[serde(default)]
    pub ignore_cluster_errors: bool,

    #[serde(flatten)]
    pub client: ClientOptions,
}

impl CacheOptions {
    pub fn cluster_timeout(&self) -> Option<Duration> {
        self.cluster_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

/// Complete cache configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheConfig {
    /// `host:port` of the configuration endpoint
    pub location: String,
    #[serde(default)]
    pub options: CacheOptions,
}

impl CacheConfig {
    pub fn new(location: impl Into<String>, options: CacheOptions) -> Self {
        Self {
            location: location.into(),
            options,
        }
    }

    /// Parse configuration from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidOptions(e.to_string()))
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::InvalidOptions(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Create configuration from CLI arguments
    ///
    /// Explicit flags override values from `--config`.
    pub fn from_cli(args: &CliArgs) -> Result<Self, ConfigurationError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::new(String::new(), CacheOptions::default()),
        };

        if let Some(endpoint) = &args.endpoint {
            config.location = endpoint.clone();
        }
        if let Some(timeout) = args.cluster_timeout_ms {
            config.options.cluster_timeout_ms = Some(timeout);
        }
        if args.ignore_cluster_errors {
            config.options.ignore_cluster_errors = true;
        }

        // Surface location problems here rather than at first use
        config.endpoint()?;
        Ok(config)
    }

    /// The configuration endpoint named by `location`
    pub fn endpoint(&self) -> Result<Endpoint, ConfigurationError> {
        Endpoint::from_location(&self.location)
    }
}
