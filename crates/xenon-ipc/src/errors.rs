//! Error types for the transport and the protocol client.

use std::fmt;
use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Direction of the socket operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOperation {
    /// Sending the request.
    Write,
    /// Receiving the response.
    Read,
}

impl fmt::Display for IoOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => write!(f, "write"),
            Self::Read => write!(f, "read"),
        }
    }
}

/// Failures of a single request/response exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket could not be opened or connected.
    #[error("failed to connect to daemon socket {path}: {source}")]
    Connect {
        /// Socket path that was dialled.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The write or the read exceeded its bound.
    #[error("daemon {operation} timed out after {timeout_ms} ms")]
    Timeout {
        /// Operation that ran out of time.
        operation: IoOperation,
        /// Configured bound in milliseconds.
        timeout_ms: u64,
    },
    /// Any other send or receive failure.
    #[error("daemon {operation} failed: {source}")]
    Io {
        /// Operation that failed.
        operation: IoOperation,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl TransportError {
    /// Returns true when nothing is listening on the socket path.
    ///
    /// Connection-refused and socket-not-found errors typically mean the
    /// daemon process is not running at all, as opposed to being wedged.
    #[must_use]
    pub fn is_not_listening(&self) -> bool {
        match self {
            Self::Connect { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::NotFound
                    | io::ErrorKind::AddrNotAvailable
            ),
            Self::Timeout { .. } | Self::Io { .. } => false,
        }
    }
}

/// Failures surfaced by [`crate::DaemonClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The exchange with the daemon failed; no partial result is reported.
    #[error("daemon unavailable: {0}")]
    DaemonUnavailable(#[source] TransportError),
}

impl ClientError {
    /// Transport failure behind the error.
    #[must_use]
    pub const fn transport(&self) -> &TransportError {
        match self {
            Self::DaemonUnavailable(source) => source,
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(source: TransportError) -> Self {
        Self::DaemonUnavailable(source)
    }
}
