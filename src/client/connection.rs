//! TCP connection to the configuration endpoint
//!
//! Discovery traffic is a handful of short text commands, so the stream is
//! read through a `WireReader` rather than a general-purpose codec.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::config::Endpoint;
use crate::utils::ConnectionError;

/// Opens byte streams to an endpoint
///
/// `TcpConnector` is the production implementation; tests substitute
/// scripted streams.
pub trait Connector: Send + Sync {
    type Stream: Read + Write + Send;

    fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Option<Duration>,
    ) -> Result<Self::Stream, ConnectionError>;
}

/// Plain TCP connector
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    fn resolve(endpoint: &Endpoint) -> Result<SocketAddr, ConnectionError> {
        let connect_failed = |source| ConnectionError::ConnectFailed {
            host: endpoint.host.clone(),
            port: endpoint.port,
            source,
        };

        (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()
            .map_err(connect_failed)?
            .next()
            .ok_or_else(|| {
                connect_failed(io::Error::new(
                    io::ErrorKind::NotFound,
                    "No addresses found",
                ))
            })
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(
        &self,
        endpoint: &Endpoint,
        timeout: Option<Duration>,
    ) -> Result<TcpStream, ConnectionError> {
        let addr = Self::resolve(endpoint)?;

        let stream = match timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(|e| ConnectionError::ConnectFailed {
            host: endpoint.host.clone(),
            port: endpoint.port,
            source: e,
        })?;

        // Configure socket
        stream.set_nodelay(true).ok();
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)?;

        debug!("Connected to configuration endpoint {} ({})", endpoint, addr);
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_tcp_connect_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let stream = TcpConnector
            .connect(
                &Endpoint::new("127.0.0.1", port),
                Some(Duration::from_secs(1)),
            )
            .unwrap();
        assert_eq!(
            stream.read_timeout().unwrap(),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_unresolvable_host() {
        let err = TcpConnector
            .connect(
                &Endpoint::new("no-such-host.invalid", 11211),
                Some(Duration::from_millis(200)),
            )
            .unwrap_err();
        assert!(matches!(err, ConnectionError::ConnectFailed { .. }));
    }
}
