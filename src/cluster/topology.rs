//! Cluster topology snapshot

use serde::Serialize;

use super::node::{parse_node_entry, NodeAddress};
use crate::config::Endpoint;
use crate::utils::ProtocolError;

/// Node list published by the configuration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterInfo {
    /// Config version counter; `None` for the degraded single-node fallback
    pub version: Option<u64>,
    /// Nodes in the order the server listed them
    pub nodes: Vec<NodeAddress>,
}

impl ClusterInfo {
    /// Parse the payload block of a `config get cluster` response
    ///
    /// The block is `<version>\n<host|ip|port> <host|ip|port> ...\n`.
    pub fn from_config_payload(payload: &str) -> Result<Self, ProtocolError> {
        let wrong_format = || ProtocolError::WrongFormat(payload.to_string());

        let body = payload.trim_end_matches(['\n', '\r']);
        let (version, nodes) = body.split_once('\n').ok_or_else(wrong_format)?;
        if nodes.contains('\n') {
            return Err(wrong_format());
        }

        let version: u64 = version.trim().parse().map_err(|_| wrong_format())?;

        let nodes = nodes
            .split_whitespace()
            .map(parse_node_entry)
            .collect::<Result<Vec<_>, _>>()?;
        if nodes.is_empty() {
            return Err(wrong_format());
        }

        Ok(Self {
            version: Some(version),
            nodes,
        })
    }

    /// Topology used when discovery fails and errors are ignored:
    /// the configuration endpoint stands in as the only node
    pub fn degraded(endpoint: &Endpoint) -> Self {
        Self {
            version: None,
            nodes: vec![NodeAddress::from(endpoint)],
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.version.is_none()
    }

    /// Get total number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}
