//! Line-oriented reader for memcached text responses
//!
//! Memcached text replies are CRLF-terminated lines. A payload line may
//! itself contain bare `\n` separators (the cluster config block does), so
//! only the `\r\n` pair ends a line.

use std::io::{self, Read, Write};

use super::error::{ClusterError, ConnectionError, ProtocolError};

const READ_CHUNK: usize = 4096;
const CRLF: &[u8] = b"\r\n";

/// Longest line accepted before giving up on a terminator
pub const MAX_LINE_LEN: usize = 1 << 20;

/// Buffered CRLF line reader over a byte stream
///
/// Bytes received past a terminator are kept for the next `read_line`.
pub struct WireReader<S> {
    stream: S,
    buf: Vec<u8>,
    /// Prefix of `buf` already searched for a terminator
    scanned: usize,
}

impl<S: Read> WireReader<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buf: Vec::with_capacity(READ_CHUNK),
            scanned: 0,
        }
    }

    /// Read the next line with its CRLF stripped
    pub fn read_line(&mut self) -> Result<String, ClusterError> {
        loop {
            if let Some(pos) = self.find_terminator() {
                let mut line: Vec<u8> = self.buf.drain(..pos + CRLF.len()).collect();
                line.truncate(pos);
                self.scanned = 0;
                return String::from_utf8(line)
                    .map_err(|_| ClusterError::Protocol(ProtocolError::InvalidEncoding));
            }

            if self.buf.len() > MAX_LINE_LEN {
                return Err(ProtocolError::LineTooLong {
                    limit: MAX_LINE_LEN,
                }
                .into());
            }

            // A lone '\r' at the tail may pair with the next chunk's '\n'
            self.scanned = self.buf.len().saturating_sub(1);
            self.fill()?;
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    fn find_terminator(&self) -> Option<usize> {
        self.buf[self.scanned..]
            .windows(CRLF.len())
            .position(|w| w == CRLF)
            .map(|p| p + self.scanned)
    }

    fn fill(&mut self) -> Result<(), ConnectionError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => return Err(ConnectionError::Closed),
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(ConnectionError::Timeout(e))
                }
                Err(e) => return Err(ConnectionError::Io(e)),
            }
        }
    }
}

impl<S: Write> WireReader<S> {
    /// Write a complete command and flush it
    pub fn send(&mut self, command: &[u8]) -> Result<(), ConnectionError> {
        self.stream.write_all(command)?;
        self.stream.flush()?;
        Ok(())
    }
}
