//! Test doubles for the discovery and client seams

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use super::backend::{Fetched, MultiNodeCacheClient};
use crate::client::ClusterDiscovery;
use crate::cluster::{ClusterInfo, NodeAddress};
use crate::config::{ClientOptions, Endpoint};
use crate::utils::{ClusterError, ConnectionError, ProtocolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    Healthy,
    ConnectionDown,
    ProtocolBroken,
}

/// Discovery returning a fixed node list and counting resolutions
pub struct CountingDiscovery {
    endpoint: Endpoint,
    nodes: Vec<NodeAddress>,
    mode: Mutex<DiscoveryMode>,
    delay: Mutex<Option<Duration>>,
    resolves: AtomicUsize,
}

impl CountingDiscovery {
    pub fn with_nodes(nodes: &[&str]) -> Self {
        let nodes = nodes
            .iter()
            .map(|n| {
                let endpoint = Endpoint::from_location(n).unwrap();
                NodeAddress::new(endpoint.host, endpoint.port)
            })
            .collect();
        Self {
            endpoint: Endpoint::new("h", 0),
            nodes,
            mode: Mutex::new(DiscoveryMode::Healthy),
            delay: Mutex::new(None),
            resolves: AtomicUsize::new(0),
        }
    }

    pub fn set_mode(&self, mode: DiscoveryMode) {
        *self.mode.lock() = mode;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn resolves(&self) -> usize {
        self.resolves.load(Ordering::SeqCst)
    }
}

impl ClusterDiscovery for CountingDiscovery {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn resolve(&self) -> Result<ClusterInfo, ClusterError> {
        self.resolves.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        let mode = *self.mode.lock();
        match mode {
            DiscoveryMode::Healthy => Ok(ClusterInfo {
                version: Some(1),
                nodes: self.nodes.clone(),
            }),
            DiscoveryMode::ConnectionDown => Err(ConnectionError::Closed.into()),
            DiscoveryMode::ProtocolBroken => {
                Err(ProtocolError::WrongResponseShape { lines: 0 }.into())
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    #[error("node down while handling {0}")]
    NodeDown(String),

    #[error("no servers available")]
    NoServers,

    #[error("refused to build client")]
    BuildRefused,
}

/// In-memory client that records every call
///
/// Keys starting with `fail` raise `NodeDown`; an empty node list makes
/// every operation raise `NoServers`. Building fails when the options
/// carry `"fail_connect": true`.
pub struct RecordingClient {
    pub nodes: Vec<NodeAddress>,
    pub options: ClientOptions,
    pub calls: Mutex<Vec<String>>,
    pub disconnected: AtomicBool,
    store: Mutex<HashMap<String, i64>>,
}

impl RecordingClient {
    fn record(&self, op: &str, keys: &[&str]) -> Result<(), RecordingError> {
        self.calls.lock().push(op.to_string());
        if self.nodes.is_empty() {
            return Err(RecordingError::NoServers);
        }
        match keys.iter().find(|k| k.starts_with("fail")) {
            Some(key) => Err(RecordingError::NodeDown(key.to_string())),
            None => Ok(()),
        }
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == op).count()
    }

    fn apply_delta(&self, key: &str, delta: i64) -> Option<u64> {
        let mut store = self.store.lock();
        let value = store.get_mut(key)?;
        *value = (*value + delta).max(0);
        Some(*value as u64)
    }
}

impl MultiNodeCacheClient for RecordingClient {
    type Value = i64;
    type Error = RecordingError;

    fn connect(nodes: &[NodeAddress], options: &ClientOptions) -> Result<Self, RecordingError> {
        if options.get("fail_connect") == Some(&serde_json::Value::Bool(true)) {
            return Err(RecordingError::BuildRefused);
        }
        Ok(Self {
            nodes: nodes.to_vec(),
            options: options.clone(),
            calls: Mutex::new(Vec::new()),
            disconnected: AtomicBool::new(false),
            store: Mutex::new(HashMap::new()),
        })
    }

    fn get(&self, key: &str) -> Result<Option<i64>, RecordingError> {
        self.record("get", &[key])?;
        Ok(self.store.lock().get(key).copied())
    }

    fn set(&self, key: &str, value: i64, _ttl: Option<Duration>) -> Result<bool, RecordingError> {
        self.record("set", &[key])?;
        self.store.lock().insert(key.to_string(), value);
        Ok(true)
    }

    fn add(&self, key: &str, value: i64, _ttl: Option<Duration>) -> Result<bool, RecordingError> {
        self.record("add", &[key])?;
        let mut store = self.store.lock();
        if store.contains_key(key) {
            return Ok(false);
        }
        store.insert(key.to_string(), value);
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<bool, RecordingError> {
        self.record("delete", &[key])?;
        Ok(self.store.lock().remove(key).is_some())
    }

    fn incr(&self, key: &str, delta: u64) -> Result<Option<u64>, RecordingError> {
        self.record("incr", &[key])?;
        Ok(self.apply_delta(key, delta as i64))
    }

    fn decr(&self, key: &str, delta: u64) -> Result<Option<u64>, RecordingError> {
        self.record("decr", &[key])?;
        Ok(self.apply_delta(key, -(delta as i64)))
    }

    fn get_many(&self, keys: &[&str]) -> Result<HashMap<String, Fetched<i64>>, RecordingError> {
        self.record("get_many", keys)?;
        let store = self.store.lock();
        Ok(keys
            .iter()
            .map(|k| (k.to_string(), Fetched::from(store.get(*k).copied())))
            .collect())
    }

    fn set_many(
        &self,
        items: Vec<(String, i64)>,
        _ttl: Option<Duration>,
    ) -> Result<Vec<String>, RecordingError> {
        let keys: Vec<&str> = items.iter().map(|(k, _)| k.as_str()).collect();
        self.record("set_many", &keys)?;
        self.store.lock().extend(items);
        Ok(Vec::new())
    }

    fn delete_many(&self, keys: &[&str]) -> Result<(), RecordingError> {
        self.record("delete_many", keys)?;
        let mut store = self.store.lock();
        for key in keys {
            store.remove(*key);
        }
        Ok(())
    }

    fn disconnect_all(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}
