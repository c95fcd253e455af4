//! Memoized cache client built from the discovered topology
//!
//! The cache holds at most one client handle. It is built on first use
//! from a fresh resolution and kept until `invalidate` drops it; there is
//! no time- or version-based expiry.

use std::mem;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::node::NodeAddress;
use crate::cache::MultiNodeCacheClient;
use crate::client::ClusterDiscovery;
use crate::config::ClientOptions;
use crate::utils::{CacheError, ClusterError};

/// Resolved node list together with the client built for it
pub struct TopologyEntry<C> {
    pub nodes: Vec<NodeAddress>,
    pub handle: Arc<C>,
}

/// Topology cache state
pub enum TopologyState<C> {
    /// Nothing built yet, or invalidated
    Empty,
    Populated(TopologyEntry<C>),
}

impl<C> TopologyState<C> {
    fn handle(&self) -> Option<Arc<C>> {
        match self {
            TopologyState::Populated(entry) => Some(Arc::clone(&entry.handle)),
            TopologyState::Empty => None,
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(self, TopologyState::Populated(_))
    }
}

/// Lazily built, failure-invalidated cache client
///
/// Thread-safe: a handle is published only once fully constructed, and
/// concurrent first calls share a single resolution.
pub struct TopologyCache<C, D> {
    discovery: D,
    options: ClientOptions,
    state: RwLock<TopologyState<C>>,
}

impl<C: MultiNodeCacheClient, D: ClusterDiscovery> TopologyCache<C, D> {
    /// Create an empty cache; nothing is resolved until `handle` is called
    pub fn new(discovery: D, options: ClientOptions) -> Self {
        Self {
            discovery,
            options,
            state: RwLock::new(TopologyState::Empty),
        }
    }

    pub fn discovery(&self) -> &D {
        &self.discovery
    }

    /// Get the memoized client, resolving and building it if needed
    ///
    /// A failed build memoizes nothing; the next call tries again.
    pub fn handle(&self) -> Result<Arc<C>, CacheError<C::Error>> {
        let cached = self.state.read().handle();
        if let Some(handle) = cached {
            return Ok(handle);
        }

        let mut state = self.state.write();
        // Another caller may have built it while we waited for the lock
        if let Some(handle) = state.handle() {
            return Ok(handle);
        }

        let nodes = self.discovery.cluster_nodes()?;
        let handle = Arc::new(C::connect(&nodes, &self.options).map_err(CacheError::Backend)?);

        info!(
            "Cache client built for {} nodes: {}",
            nodes.len(),
            nodes
                .iter()
                .map(NodeAddress::address)
                .collect::<Vec<_>>()
                .join(", ")
        );
        *state = TopologyState::Populated(TopologyEntry {
            nodes,
            handle: Arc::clone(&handle),
        });
        Ok(handle)
    }

    /// Drop the memoized client so the next `handle` re-resolves
    pub fn invalidate(&self) {
        let previous = mem::replace(&mut *self.state.write(), TopologyState::Empty);
        if let TopologyState::Populated(entry) = previous {
            debug!(
                "Cluster nodes cache cleared ({} nodes)",
                entry.nodes.len()
            );
        }
    }

    /// Disconnect the memoized client and drop it
    pub fn close(&self) {
        let previous = mem::replace(&mut *self.state.write(), TopologyState::Empty);
        if let TopologyState::Populated(entry) = previous {
            entry.handle.disconnect_all();
        }
    }

    pub fn is_populated(&self) -> bool {
        self.state.read().is_populated()
    }

    /// Nodes behind the memoized client, if one is built
    pub fn current_nodes(&self) -> Option<Vec<NodeAddress>> {
        match &*self.state.read() {
            TopologyState::Populated(entry) => Some(entry.nodes.clone()),
            TopologyState::Empty => None,
        }
    }

    /// Resolve the node list without touching the memoized client
    pub fn cluster_nodes(&self) -> Result<Vec<NodeAddress>, ClusterError> {
        self.discovery.cluster_nodes()
    }
}
