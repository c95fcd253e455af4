//! Discovery trait for topology resolution
//!
//! Abstracts "ask the configuration endpoint for the node list" so the
//! topology cache can be driven by the real protocol client or a test
//! double.

use tracing::warn;

use crate::cluster::{ClusterInfo, NodeAddress};
use crate::config::Endpoint;
use crate::utils::ClusterError;

/// Source of cluster topology
pub trait ClusterDiscovery: Send + Sync {
    /// The configuration endpoint being queried
    fn endpoint(&self) -> &Endpoint;

    /// Fetch the current cluster info
    fn resolve(&self) -> Result<ClusterInfo, ClusterError>;

    /// Node list for building a client
    ///
    /// A transport failure is logged and yields an empty list so the
    /// caller still gets a client (whose operations will then fail and
    /// trigger re-resolution). Protocol errors propagate.
    fn cluster_nodes(&self) -> Result<Vec<NodeAddress>, ClusterError> {
        match self.resolve() {
            Ok(info) => Ok(info.nodes),
            Err(ClusterError::Connection(e)) => {
                warn!("Cannot connect to cluster {}, err: {}", self.endpoint(), e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
