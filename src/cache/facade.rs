//! Cache operations over an auto-discovered cluster
//!
//! Every operation runs against the memoized client from the topology
//! cache. Any failure invalidates that client before the error is returned,
//! so a node list that stopped working never outlives a failed call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::backend::{sanitize_many, MultiNodeCacheClient};
use crate::client::{ClusterDiscovery, ClusterTopologyClient};
use crate::cluster::{NodeAddress, TopologyCache};
use crate::config::{CacheConfig, CacheOptions, ClientOptions};
use crate::utils::{CacheError, ClusterError, ConfigurationError};

/// Result of a facade operation for client type `C`
pub type CacheResult<T, C> = Result<T, CacheError<<C as MultiNodeCacheClient>::Error>>;

/// Self-healing cache front for an ElastiCache memcached cluster
pub struct CacheFacade<C, D = ClusterTopologyClient> {
    topology: TopologyCache<C, D>,
}

impl<C: MultiNodeCacheClient> CacheFacade<C, ClusterTopologyClient> {
    /// Create a facade for the configuration endpoint in `location`
    ///
    /// Fails if `location` names more than one server or is not
    /// `host:port`. Nothing is resolved until the first operation.
    pub fn new(location: &str, options: CacheOptions) -> Result<Self, ConfigurationError> {
        Self::from_config(&CacheConfig::new(location, options))
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigurationError> {
        let discovery = ClusterTopologyClient::from_config(config)?;
        Ok(Self::with_discovery(
            discovery,
            config.options.client.clone(),
        ))
    }
}

impl<C: MultiNodeCacheClient, D: ClusterDiscovery> CacheFacade<C, D> {
    pub fn with_discovery(discovery: D, options: ClientOptions) -> Self {
        Self {
            topology: TopologyCache::new(discovery, options),
        }
    }

    pub fn topology(&self) -> &TopologyCache<C, D> {
        &self.topology
    }

    /// Current node list from the configuration endpoint
    pub fn cluster_nodes(&self) -> Result<Vec<NodeAddress>, ClusterError> {
        self.topology.cluster_nodes()
    }

    /// Disconnect from all nodes; the next operation rebuilds the client
    pub fn close(&self) {
        self.topology.close();
    }

    /// Run `op` on the current client, invalidating the topology on failure
    fn execute<T, F>(&self, name: &'static str, op: F) -> CacheResult<T, C>
    where
        F: FnOnce(&C) -> Result<T, C::Error>,
    {
        let result = self
            .topology
            .handle()
            .and_then(|client: Arc<C>| op(&*client).map_err(CacheError::Backend));

        if let Err(e) = &result {
            warn!("Cache {} failed, clearing cluster nodes cache: {}", name, e);
            self.topology.invalidate();
        }
        result
    }

    pub fn get(&self, key: &str) -> CacheResult<Option<C::Value>, C> {
        self.execute("get", |c| c.get(key))
    }

    pub fn set(&self, key: &str, value: C::Value, ttl: Option<Duration>) -> CacheResult<bool, C> {
        self.execute("set", |c| c.set(key, value, ttl))
    }

    pub fn add(&self, key: &str, value: C::Value, ttl: Option<Duration>) -> CacheResult<bool, C> {
        self.execute("add", |c| c.add(key, value, ttl))
    }

    pub fn delete(&self, key: &str) -> CacheResult<bool, C> {
        self.execute("delete", |c| c.delete(key))
    }

    pub fn incr(&self, key: &str, delta: u64) -> CacheResult<Option<u64>, C> {
        self.execute("incr", |c| c.incr(key, delta))
    }

    pub fn decr(&self, key: &str, delta: u64) -> CacheResult<Option<u64>, C> {
        self.execute("decr", |c| c.decr(key, delta))
    }

    /// Fetch several keys; keys the client reports as missing are omitted
    pub fn get_many(&self, keys: &[&str]) -> CacheResult<HashMap<String, C::Value>, C> {
        self.execute("get_many", |c| c.get_many(keys).map(sanitize_many))
    }

    /// Store several values; returns the keys that failed to store
    pub fn set_many(
        &self,
        items: Vec<(String, C::Value)>,
        ttl: Option<Duration>,
    ) -> CacheResult<Vec<String>, C> {
        self.execute("set_many", |c| c.set_many(items, ttl))
    }

    pub fn delete_many(&self, keys: &[&str]) -> CacheResult<(), C> {
        self.execute("delete_many", |c| c.delete_many(keys))
    }
}
