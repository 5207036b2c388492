//! Socket transport for daemon exchanges.
//!
//! Each [`Transport::exchange`] is one complete connect, write, read, close
//! cycle. The request payload is sent as given; the response has no length
//! prefix or terminator, so it ends when the daemon closes the connection or
//! when the read bound elapses.

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::os::fd::OwnedFd;
#[cfg(unix)]
use std::os::unix::net::UnixStream;

use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};
use tracing::{debug, warn};
use xenon_config::Config;

use crate::errors::{IoOperation, TransportError};

/// Tracing target for transport events.
pub const TRANSPORT_TARGET: &str = "xenon_ipc::transport";

const READ_CHUNK: usize = 4096;

/// Moves one framed request to the daemon and returns its raw reply.
///
/// The production implementation is [`UnixTransport`]. Tests substitute a
/// double so protocol logic can be checked without a socket.
pub trait Transport {
    /// Sends `payload` and collects the response bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] when the socket cannot be opened,
    /// [`TransportError::Timeout`] when the write or the read exceeds its
    /// bound, and [`TransportError::Io`] for any other failure.
    fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError>;
}

/// Transport over the daemon's Unix domain socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnixTransport {
    path: Utf8PathBuf,
    write_timeout: Duration,
    read_timeout: Duration,
}

impl UnixTransport {
    /// Builds a transport with explicit bounds.
    #[must_use]
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        write_timeout: Duration,
        read_timeout: Duration,
    ) -> Self {
        Self {
            path: path.into(),
            write_timeout,
            read_timeout,
        }
    }

    /// Builds a transport from the socket path and bounds in `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.daemon_socket(),
            config.write_timeout(),
            config.read_timeout(),
        )
    }

    /// Socket path this transport dials.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    #[cfg(unix)]
    fn connect(&self) -> Result<UnixStream, TransportError> {
        connect_unix(self.path.as_str(), self.write_timeout).map_err(|source| {
            TransportError::Connect {
                path: self.path.clone(),
                source,
            }
        })
    }

    #[cfg(unix)]
    fn send(&self, stream: &mut UnixStream, payload: &[u8]) -> Result<(), TransportError> {
        stream
            .set_write_timeout(Some(self.write_timeout))
            .map_err(|source| TransportError::Io {
                operation: IoOperation::Write,
                source,
            })?;
        stream
            .write_all(payload)
            .and_then(|()| stream.flush())
            .map_err(|source| self.classify(IoOperation::Write, source))
    }

    #[cfg(unix)]
    fn receive(&self, stream: &mut UnixStream) -> Result<Vec<u8>, TransportError> {
        let deadline = Instant::now() + self.read_timeout;
        let mut response = Vec::new();
        let mut chunk = [0_u8; READ_CHUNK];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return self.read_deadline_elapsed(response);
            }
            stream
                .set_read_timeout(Some(remaining))
                .map_err(|source| TransportError::Io {
                    operation: IoOperation::Read,
                    source,
                })?;
            match stream.read(&mut chunk) {
                Ok(0) => return Ok(response),
                Ok(read) => response.extend_from_slice(chunk.get(..read).unwrap_or_default()),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) if is_timeout(&error) => return self.read_deadline_elapsed(response),
                Err(source) => {
                    return Err(TransportError::Io {
                        operation: IoOperation::Read,
                        source,
                    });
                }
            }
        }
    }

    /// A read bound with nothing received is a timeout; with data already
    /// buffered, the daemon is treated as having finished.
    fn read_deadline_elapsed(&self, response: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        if response.is_empty() {
            return Err(TransportError::Timeout {
                operation: IoOperation::Read,
                timeout_ms: duration_ms(self.read_timeout),
            });
        }
        warn!(
            target: TRANSPORT_TARGET,
            socket = %self.path,
            bytes = response.len(),
            "read bound elapsed before the daemon closed the connection"
        );
        Ok(response)
    }

    fn classify(&self, operation: IoOperation, source: io::Error) -> TransportError {
        if is_timeout(&source) {
            let timeout = match operation {
                IoOperation::Write => self.write_timeout,
                IoOperation::Read => self.read_timeout,
            };
            TransportError::Timeout {
                operation,
                timeout_ms: duration_ms(timeout),
            }
        } else {
            TransportError::Io { operation, source }
        }
    }
}

impl Transport for UnixTransport {
    #[cfg(unix)]
    fn exchange(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        debug!(
            target: TRANSPORT_TARGET,
            socket = %self.path,
            bytes = payload.len(),
            "opening daemon connection"
        );
        // The stream is dropped, and the descriptor closed, on every return path.
        let mut stream = self.connect()?;
        self.send(&mut stream, payload)?;
        let response = self.receive(&mut stream)?;
        debug!(
            target: TRANSPORT_TARGET,
            socket = %self.path,
            bytes = response.len(),
            "daemon exchange complete"
        );
        Ok(response)
    }

    #[cfg(not(unix))]
    fn exchange(&self, _payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        Err(TransportError::Connect {
            path: self.path.clone(),
            source: io::Error::new(
                io::ErrorKind::Unsupported,
                "platform does not support Unix sockets",
            ),
        })
    }
}

#[cfg(unix)]
fn connect_unix(path: &str, timeout: Duration) -> io::Result<UnixStream> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    let address = SockAddr::unix(path)?;
    socket.connect_timeout(&address, timeout)?;
    Ok(UnixStream::from(OwnedFd::from(socket)))
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
