//! Request payloads understood by the daemon.
//!
//! A request is a command keyword, optionally followed by one space and a
//! single argument, terminated by a NUL byte. The daemon reads up to the
//! terminator, so neither part may contain one.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Protocol marker every pairing code begins with.
pub const PAIRING_MARKER: &str = "XE42~";

const TERMINATOR: u8 = 0;

/// Command keywords recognised by the daemon (case-sensitive).
pub mod commands {
    /// Re-read the mount table from disk.
    pub const RELOAD_MOUNTS: &str = "reload-mounts";
    /// List application bundle identifiers as a JSON array of strings.
    pub const BUNDLES: &str = "bundles";
    /// List iCloud container identifiers as a JSON array of strings.
    pub const ICLOUD_BUNDLES: &str = "icloud-bundles";
    /// Fetch the daemon's public key as text.
    pub const PUBLIC_KEY: &str = "pubkey";
    /// Produce a client connection snippet as text.
    pub const GENERATE_CONFIG: &str = "generate-config";
    /// Discard the current keypair and generate a new one.
    pub const REGENERATE_KEYS: &str = "regenerate-keys";
}

/// A single command sent to the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonRequest {
    keyword: String,
    argument: Option<String>,
}

impl DaemonRequest {
    /// Builds a bare command.
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            argument: None,
        }
    }

    /// Attaches the single space-delimited argument.
    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = Some(argument.into());
        self
    }

    /// Command keyword.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Optional argument.
    #[must_use]
    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// Wire form: the command text followed by the NUL terminator.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let text = self.to_string();
        let mut payload = Vec::with_capacity(text.len() + 1);
        payload.extend_from_slice(text.as_bytes());
        payload.push(TERMINATOR);
        payload
    }
}

impl fmt::Display for DaemonRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{} {argument}", self.keyword),
            None => f.write_str(&self.keyword),
        }
    }
}

/// Errors raised while validating scanned pairing text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairingCodeError {
    /// The text does not start with [`PAIRING_MARKER`].
    #[error("pairing code must begin with '{PAIRING_MARKER}'")]
    MissingMarker,
    /// The text contains the frame terminator.
    #[error("pairing code contains a NUL byte")]
    EmbeddedNul,
}

/// Scanned pairing text that carries the protocol marker.
///
/// The remainder is opaque here; the daemon decides whether it is valid.
/// Constructing a `PairingCode` is the only local check, so text from
/// unrelated QR codes never reaches the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingCode(String);

impl PairingCode {
    /// The code exactly as scanned.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Request forwarding the code verbatim as the command keyword.
    #[must_use]
    pub fn to_request(&self) -> DaemonRequest {
        DaemonRequest::new(self.0.clone())
    }
}

impl FromStr for PairingCode {
    type Err = PairingCodeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if !input.starts_with(PAIRING_MARKER) {
            return Err(PairingCodeError::MissingMarker);
        }
        if input.as_bytes().contains(&TERMINATOR) {
            return Err(PairingCodeError::EmbeddedNul);
        }
        Ok(Self(input.to_owned()))
    }
}

impl fmt::Display for PairingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
