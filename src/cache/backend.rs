//! Multi-node cache client abstraction
//!
//! The key/value protocol, node hashing and value encoding live in the
//! client implementation. This crate only constructs it from a node list
//! and calls the operations below.

use std::collections::HashMap;
use std::time::Duration;

use crate::cluster::NodeAddress;
use crate::config::ClientOptions;

/// Result of one key in a batch read
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<V> {
    Hit(V),
    /// The client's "not found" marker for this key
    Miss,
}

impl<V> Fetched<V> {
    pub fn into_option(self) -> Option<V> {
        match self {
            Fetched::Hit(v) => Some(v),
            Fetched::Miss => None,
        }
    }
}

impl<V> From<Option<V>> for Fetched<V> {
    fn from(value: Option<V>) -> Self {
        value.map_or(Fetched::Miss, Fetched::Hit)
    }
}

/// Client spreading keys over a fixed list of memcached nodes
///
/// Implementations are shared across threads behind an `Arc`, so every
/// operation takes `&self`.
pub trait MultiNodeCacheClient: Send + Sync + Sized {
    type Value: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build a client for `nodes`, in the given order
    fn connect(nodes: &[NodeAddress], options: &ClientOptions) -> Result<Self, Self::Error>;

    fn get(&self, key: &str) -> Result<Option<Self::Value>, Self::Error>;

    /// Store unconditionally; returns whether the value was stored
    fn set(&self, key: &str, value: Self::Value, ttl: Option<Duration>)
        -> Result<bool, Self::Error>;

    /// Store only if the key is absent
    fn add(&self, key: &str, value: Self::Value, ttl: Option<Duration>)
        -> Result<bool, Self::Error>;

    /// Returns whether the key existed
    fn delete(&self, key: &str) -> Result<bool, Self::Error>;

    /// New value, or `None` when the key does not exist
    fn incr(&self, key: &str, delta: u64) -> Result<Option<u64>, Self::Error>;

    fn decr(&self, key: &str, delta: u64) -> Result<Option<u64>, Self::Error>;

    fn get_many(&self, keys: &[&str])
        -> Result<HashMap<String, Fetched<Self::Value>>, Self::Error>;

    /// Returns the keys that failed to store
    fn set_many(
        &self,
        items: Vec<(String, Self::Value)>,
        ttl: Option<Duration>,
    ) -> Result<Vec<String>, Self::Error>;

    fn delete_many(&self, keys: &[&str]) -> Result<(), Self::Error>;

    /// Close every node connection
    fn disconnect_all(&self) {}
}

/// Drop keys the client reported as missing
///
/// Only `Fetched::Miss` is removed; falsy-looking hits such as `0` or an
/// empty string are real values.
pub fn sanitize_many<V>(raw: HashMap<String, Fetched<V>>) -> HashMap<String, V> {
    raw.into_iter()
        .filter_map(|(key, fetched)| fetched.into_option().map(|v| (key, v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_drops_miss_sentinel() {
        let raw = HashMap::from([
            ("k1".to_string(), Fetched::Hit(1.5)),
            ("k2".to_string(), Fetched::Miss),
            ("k3".to_string(), Fetched::Hit(0.0)),
        ]);
        let clean = sanitize_many(raw);
        assert_eq!(
            clean,
            HashMap::from([("k1".to_string(), 1.5), ("k3".to_string(), 0.0)])
        );
    }

    #[test]
    fn test_sanitize_keeps_falsy_values() {
        let raw = HashMap::from([
            ("zero".to_string(), Fetched::Hit(String::new())),
            ("gone".to_string(), Fetched::Miss),
        ]);
        let clean = sanitize_many(raw);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean["zero"], "");
    }

    #[test]
    fn test_fetched_from_option() {
        assert_eq!(Fetched::from(Some(3)), Fetched::Hit(3));
        assert_eq!(Fetched::<i32>::from(None), Fetched::Miss);
    }
}
