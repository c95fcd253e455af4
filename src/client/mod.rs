//! Configuration endpoint client layer

pub mod connection;
pub mod discovery;
pub mod endpoint_client;

pub use connection::{Connector, TcpConnector};
pub use discovery::ClusterDiscovery;
pub use endpoint_client::{ClusterTopologyClient, DiscoveryCommand, ServerVersion};
