//! Utility modules

pub mod error;
pub mod wire;

pub use error::{CacheError, ClusterError, ConfigurationError, ConnectionError, ProtocolError};
pub use wire::WireReader;
