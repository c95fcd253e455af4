//! Configuration endpoint client
//!
//! Speaks the ElastiCache auto-discovery exchange:
//!
//! ```text
//! > version
//! < VERSION 1.4.14
//! > config get cluster                 (get AmazonElastiCache:cluster before 1.4.14)
//! < CONFIG cluster 0 147
//! < 12\nhost|ip|port host|ip|port\n
//! < END
//! ```

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::connection::{Connector, TcpConnector};
use super::discovery::ClusterDiscovery;
use crate::cluster::ClusterInfo;
use crate::config::{CacheConfig, CacheOptions, Endpoint};
use crate::utils::{ClusterError, ConfigurationError, ProtocolError, WireReader};

const VERSION_COMMAND: &[u8] = b"version\r\n";
const END_MARKER: &str = "END";

/// Lines expected between the discovery command and END: header and payload
const CONFIG_RESPONSE_LINES: usize = 2;

/// Memcached server version, compared numerically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    /// First version that understands `config get cluster`
    pub const CONFIG_COMMAND_MIN: ServerVersion = ServerVersion::new(1, 4, 14);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version such as `1.4.14`
    ///
    /// Missing components count as 0 and a non-numeric tail on a component
    /// (`1.6.6-rc`) is ignored.
    pub fn parse(s: &str) -> Result<Self, ProtocolError> {
        let invalid = || ProtocolError::InvalidVersion(s.to_string());

        let mut components = [0u32; 3];
        let mut parts = s.split('.');
        for (i, slot) in components.iter_mut().enumerate() {
            let Some(part) = parts.next() else {
                if i == 0 {
                    return Err(invalid());
                }
                break;
            };
            let digits_end = part
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(part.len());
            *slot = part[..digits_end].parse().map_err(|_| invalid())?;
        }

        let [major, minor, patch] = components;
        Ok(Self::new(major, minor, patch))
    }

    /// Parse a `VERSION <x.y.z>[ suffix]` reply line
    pub fn from_version_reply(line: &str) -> Result<Self, ProtocolError> {
        check_error_reply(line)?;

        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("VERSION"), Some(version)) => Self::parse(version),
            (Some("VERSION"), None) => Err(ProtocolError::InvalidVersion(String::new())),
            _ => Err(ProtocolError::UnexpectedResponse {
                expected: "VERSION <version>".to_string(),
                actual: line.to_string(),
            }),
        }
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Command used to fetch the cluster config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryCommand {
    /// `config get cluster` (1.4.14 and later)
    ConfigGet,
    /// `get AmazonElastiCache:cluster` (before 1.4.14)
    LegacyGet,
}

impl DiscoveryCommand {
    pub fn for_version(version: ServerVersion) -> Self {
        if version < ServerVersion::CONFIG_COMMAND_MIN {
            DiscoveryCommand::LegacyGet
        } else {
            DiscoveryCommand::ConfigGet
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            DiscoveryCommand::ConfigGet => b"config get cluster\r\n",
            DiscoveryCommand::LegacyGet => b"get AmazonElastiCache:cluster\r\n",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiscoveryCommand::ConfigGet => "config get cluster",
            DiscoveryCommand::LegacyGet => "get AmazonElastiCache:cluster",
        }
    }
}

/// Classify memcached error replies so they are never parsed as data
fn check_error_reply(line: &str) -> Result<(), ProtocolError> {
    if line == "ERROR" {
        return Err(ProtocolError::UnknownCommand(line.to_string()));
    }
    if let Some(msg) = line.strip_prefix("CLIENT_ERROR") {
        return Err(ProtocolError::ClientError(msg.trim().to_string()));
    }
    if let Some(msg) = line.strip_prefix("SERVER_ERROR") {
        return Err(ProtocolError::ServerError(msg.trim().to_string()));
    }
    Ok(())
}

/// Client for the cluster configuration endpoint
///
/// Every resolution opens its own connection and closes it when done, so a
/// socket dropped by the server between resolutions is never reused.
pub struct ClusterTopologyClient<K: Connector = TcpConnector> {
    endpoint: Endpoint,
    connector: K,
    timeout: Option<Duration>,
    ignore_cluster_errors: bool,
}

impl ClusterTopologyClient<TcpConnector> {
    /// Create a TCP client for `endpoint`
    pub fn new(endpoint: Endpoint, options: &CacheOptions) -> Self {
        Self::with_connector(endpoint, TcpConnector)
            .timeout(options.cluster_timeout())
            .ignore_cluster_errors(options.ignore_cluster_errors)
    }

    /// Create a client from a cache configuration
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigurationError> {
        Ok(Self::new(config.endpoint()?, &config.options))
    }
}

impl<K: Connector> ClusterTopologyClient<K> {
    pub fn with_connector(endpoint: Endpoint, connector: K) -> Self {
        Self {
            endpoint,
            connector,
            timeout: None,
            ignore_cluster_errors: false,
        }
    }

    /// Timeout applied to connect, read and write
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Degrade to a single-node topology when the exchange fails
    pub fn ignore_cluster_errors(mut self, ignore: bool) -> Self {
        self.ignore_cluster_errors = ignore;
        self
    }

    /// Fetch cluster info, applying the ignore-errors fallback
    ///
    /// The fallback covers failures once connected. A failed connect is
    /// always returned as a connection error.
    pub fn get_cluster_info(&self) -> Result<ClusterInfo, ClusterError> {
        let mut wire = WireReader::new(self.connector.connect(&self.endpoint, self.timeout)?);

        match Self::exchange(&mut wire) {
            Ok(info) => {
                info!(
                    "Cluster topology resolved from {}: version {:?}, {} nodes",
                    self.endpoint,
                    info.version,
                    info.num_nodes()
                );
                Ok(info)
            }
            Err(e) if self.ignore_cluster_errors => {
                warn!(
                    "Failed to get cluster info from {}, using it as the only node: {}",
                    self.endpoint, e
                );
                Ok(ClusterInfo::degraded(&self.endpoint))
            }
            Err(e) => Err(e),
        }
    }

    fn exchange(wire: &mut WireReader<K::Stream>) -> Result<ClusterInfo, ClusterError> {
        wire.send(VERSION_COMMAND)?;
        let version = ServerVersion::from_version_reply(&wire.read_line()?)?;

        let command = DiscoveryCommand::for_version(version);
        debug!("Server version {}, using '{}'", version, command.name());

        wire.send(command.as_bytes())?;
        Self::read_cluster_config(wire)
    }

    /// Read header and payload lines up to END
    fn read_cluster_config(
        wire: &mut WireReader<K::Stream>,
    ) -> Result<ClusterInfo, ClusterError> {
        let mut lines = 0usize;
        let mut payload = None;

        loop {
            let line = wire.read_line()?;
            check_error_reply(&line)?;
            if line == END_MARKER {
                break;
            }
            if lines == 1 {
                payload = Some(line);
            }
            lines += 1;
        }

        match payload {
            Some(payload) if lines == CONFIG_RESPONSE_LINES => {
                Ok(ClusterInfo::from_config_payload(&payload)?)
            }
            _ => Err(ProtocolError::WrongResponseShape { lines }.into()),
        }
    }
}

impl<K: Connector> ClusterDiscovery for ClusterTopologyClient<K> {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn resolve(&self) -> Result<ClusterInfo, ClusterError> {
        self.get_cluster_info()
    }
}
