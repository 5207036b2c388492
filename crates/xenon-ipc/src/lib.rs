//! Client side of the Xenon daemon control protocol.
//!
//! The daemon listens on a Unix domain socket. Every call opens a fresh
//! connection, writes one NUL-terminated command, reads until the daemon
//! closes the stream (or the read bound elapses), and closes the socket.
//! There is no pooling, multiplexing, or retry.
//!
//! [`transport`] owns the socket cycle behind the [`Transport`] trait so the
//! [`DaemonClient`] can be exercised against a test double. The client turns
//! each daemon capability into a typed call and collapses every transport
//! failure into [`ClientError::DaemonUnavailable`].

mod client;
mod errors;
mod request;
pub mod transport;

#[cfg(all(unix, any(test, feature = "test-support")))]
pub mod test_support;

pub use client::{CONFIG_SECTION_HEADER, DaemonClient};
pub use errors::{ClientError, IoOperation, TransportError};
pub use request::{DaemonRequest, PAIRING_MARKER, PairingCode, PairingCodeError, commands};
pub use transport::{Transport, UnixTransport};
