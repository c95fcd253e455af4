//! Error types for memcache-autodiscovery

use std::io;
use thiserror::Error;

/// Invalid cache location or options, raised at construction time
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("No server configured (expected one configuration endpoint)")]
    Empty,

    #[error("ElastiCache should be configured with only one server (configuration endpoint), got {0}")]
    MultipleEndpoints(usize),

    #[error("Server configuration should be in format host:port, got {0:?}")]
    InvalidFormat(String),

    #[error("Invalid port in server configuration {0:?}")]
    InvalidPort(String),

    #[error("Invalid cache options: {0}")]
    InvalidOptions(String),
}

/// Transport-level failures talking to the configuration endpoint
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        source: io::Error,
    },

    #[error("Connection closed unexpectedly")]
    Closed,

    #[error("Connection timeout: {0}")]
    Timeout(io::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The endpoint answered, but not in the auto-discovery framing
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Server does not support the command: {0}")]
    UnknownCommand(String),

    #[error("Client error: {0}")]
    ClientError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected response: expected {expected}, got {actual:?}")]
    UnexpectedResponse { expected: String, actual: String },

    #[error("Cannot parse server version {0:?}")]
    InvalidVersion(String),

    #[error("Wrong response shape: expected 2 lines before END, got {lines}")]
    WrongResponseShape { lines: usize },

    #[error("Wrong format: {0:?}")]
    WrongFormat(String),

    #[error("Response line is not valid UTF-8")]
    InvalidEncoding,

    #[error("Response line exceeds {limit} bytes without a terminator")]
    LineTooLong { limit: usize },
}

/// Failure resolving the cluster topology
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl ClusterError {
    /// True for transport failures (refused, unreachable, timed out, closed)
    pub fn is_connection(&self) -> bool {
        matches!(self, ClusterError::Connection(_))
    }
}

impl From<io::Error> for ClusterError {
    fn from(err: io::Error) -> Self {
        ClusterError::Connection(ConnectionError::from(err))
    }
}

/// Error returned by cache operations
///
/// `Backend` is the multi-node client's own error, passed through unchanged.
#[derive(Error, Debug)]
pub enum CacheError<E> {
    #[error("Cluster discovery failed: {0}")]
    Discovery(#[from] ClusterError),

    #[error(transparent)]
    Backend(E),
}

impl<E> CacheError<E> {
    /// The backend error, if this failure came from the multi-node client
    pub fn backend(&self) -> Option<&E> {
        match self {
            CacheError::Backend(e) => Some(e),
            CacheError::Discovery(_) => None,
        }
    }
}
