//! Cluster topology and node management
//!
//! This module provides:
//! - Node addresses as published by the configuration endpoint
//! - Cluster config payload parsing
//! - The memoized, failure-invalidated client cache

pub mod node;
pub mod topology;
pub mod topology_cache;

pub use node::{parse_node_entry, NodeAddress};
pub use topology::ClusterInfo;
pub use topology_cache::{TopologyCache, TopologyEntry, TopologyState};
