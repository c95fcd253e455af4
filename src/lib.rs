//! memcache-autodiscovery library
//!
//! Client-side ElastiCache memcached auto-discovery: resolve the node list
//! behind a configuration endpoint and keep a multi-node cache client built
//! from it, rebuilding that client whenever an operation fails.

pub mod cache;
pub mod client;
pub mod cluster;
pub mod config;
pub mod utils;

pub use cache::{CacheFacade, Fetched, MultiNodeCacheClient};
pub use client::{ClusterDiscovery, ClusterTopologyClient};
pub use cluster::{ClusterInfo, NodeAddress, TopologyCache};
pub use config::{CacheConfig, CacheOptions, ClientOptions, Endpoint};
pub use utils::{CacheError, ClusterError, ConfigurationError, ConnectionError, ProtocolError};
