//! Cluster node representation

use std::fmt;

use serde::Serialize;

use crate::config::Endpoint;
use crate::utils::ProtocolError;

/// Address of one cache node as published by the configuration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeAddress {
    /// IP address when the server published one, hostname otherwise
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Get node address as string
    pub fn address(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<&Endpoint> for NodeAddress {
    fn from(endpoint: &Endpoint) -> Self {
        Self::new(endpoint.host.clone(), endpoint.port)
    }
}

/// Parse one entry of the cluster config node list
///
/// Format: `<hostname>|<ip>|<port>`. The ip may be empty, in which case the
/// hostname is used.
///
/// Example:
/// ```text
/// myCluster.pc4ldq.0001.use1.cache.amazonaws.com|10.82.235.120|11211
/// ```
pub fn parse_node_entry(entry: &str) -> Result<NodeAddress, ProtocolError> {
    let wrong_format = || ProtocolError::WrongFormat(entry.to_string());

    let mut fields = entry.split('|');
    let (host, ip, port) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(host), Some(ip), Some(port), None) => (host, ip, port),
        _ => return Err(wrong_format()),
    };

    let port: u16 = port.parse().map_err(|_| wrong_format())?;
    let host = if ip.is_empty() { host } else { ip };
    if host.is_empty() {
        return Err(wrong_format());
    }

    Ok(NodeAddress::new(host, port))
}
