//! Typed calls for each daemon capability.
//!
//! Every call is `send(request)` followed by one of three response shapes:
//! discard the body, decode it as UTF-8 text, or decode it as a JSON array
//! of strings. Typed decoding never fails the call; a body of the wrong
//! shape degrades to an empty value, so callers must read an empty string
//! or list as "no data" rather than as success.

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::ClientError;
use crate::request::{DaemonRequest, PairingCode, commands};
use crate::transport::Transport;

/// Tracing target for protocol events.
pub const CLIENT_TARGET: &str = "xenon_ipc::client";

/// Section header prepended to the generated client configuration.
pub const CONFIG_SECTION_HEADER: &str = "[connection]\n";

/// Client for the daemon's control socket.
///
/// The transport is injected so callers own its lifetime and tests can pass
/// a double. No retries are attempted: a failed exchange is reported at once.
#[derive(Debug, Clone)]
pub struct DaemonClient<T> {
    transport: T,
}

impl<T: Transport> DaemonClient<T> {
    /// Wraps `transport`.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Performs one exchange and returns the raw response body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DaemonUnavailable`] when the exchange fails for
    /// any reason.
    pub fn send(&self, request: &DaemonRequest) -> Result<Vec<u8>, ClientError> {
        debug!(target: CLIENT_TARGET, command = %request, "sending daemon request");
        self.transport.exchange(&request.encode()).map_err(|error| {
            warn!(
                target: CLIENT_TARGET,
                command = %request,
                %error,
                "daemon exchange failed"
            );
            ClientError::DaemonUnavailable(error)
        })
    }

    /// Asks the daemon to re-read the mount table from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DaemonUnavailable`] when the exchange fails.
    pub fn reload_mounts(&self) -> Result<(), ClientError> {
        self.send_discarding(commands::RELOAD_MOUNTS)
    }

    /// Asks the daemon to discard and regenerate its keypair.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DaemonUnavailable`] when the exchange fails.
    pub fn regenerate_keys(&self) -> Result<(), ClientError> {
        self.send_discarding(commands::REGENERATE_KEYS)
    }

    /// Fetches the daemon's public key. Empty when the reply was not text.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DaemonUnavailable`] when the exchange fails.
    pub fn public_key(&self) -> Result<String, ClientError> {
        self.send_text(commands::PUBLIC_KEY)
    }

    /// Fetches a client connection snippet, prefixed with
    /// [`CONFIG_SECTION_HEADER`].
    ///
    /// An empty daemon reply yields an empty string without the header.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DaemonUnavailable`] when the exchange fails.
    pub fn generate_client_config(&self) -> Result<String, ClientError> {
        let body = self.send_text(commands::GENERATE_CONFIG)?;
        if body.is_empty() {
            return Ok(body);
        }
        Ok(format!("{CONFIG_SECTION_HEADER}{body}"))
    }

    /// Lists application bundle identifiers, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DaemonUnavailable`] when the exchange fails.
    pub fn list_app_bundles(&self) -> Result<Vec<String>, ClientError> {
        self.send_string_list(commands::BUNDLES)
    }

    /// Lists iCloud container identifiers, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DaemonUnavailable`] when the exchange fails.
    pub fn list_icloud_bundles(&self) -> Result<Vec<String>, ClientError> {
        self.send_string_list(commands::ICLOUD_BUNDLES)
    }

    /// Forwards a scanned pairing code verbatim.
    ///
    /// Validity of the code beyond its marker is the daemon's decision.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::DaemonUnavailable`] when the exchange fails.
    pub fn submit_pairing_code(&self, code: &PairingCode) -> Result<(), ClientError> {
        self.send(&code.to_request()).map(drop)
    }

    fn send_discarding(&self, keyword: &str) -> Result<(), ClientError> {
        self.send(&DaemonRequest::new(keyword)).map(drop)
    }

    fn send_text(&self, keyword: &str) -> Result<String, ClientError> {
        let body = self.send(&DaemonRequest::new(keyword))?;
        Ok(decode_text(keyword, body))
    }

    fn send_string_list(&self, keyword: &str) -> Result<Vec<String>, ClientError> {
        let body = self.send(&DaemonRequest::new(keyword))?;
        let mut items = decode_string_list(keyword, &body);
        items.sort();
        Ok(items)
    }
}

fn decode_text(keyword: &str, body: Vec<u8>) -> String {
    String::from_utf8(body).unwrap_or_else(|error| {
        debug!(
            target: CLIENT_TARGET,
            command = keyword,
            %error,
            "daemon reply is not UTF-8; treating as empty"
        );
        String::new()
    })
}

fn decode_string_list(keyword: &str, body: &[u8]) -> Vec<String> {
    match serde_json::from_slice::<Vec<String>>(body) {
        Ok(items) => items,
        Err(error) => {
            debug!(
                target: CLIENT_TARGET,
                command = keyword,
                %error,
                shape = describe_shape(body),
                "daemon reply is not a JSON string array; treating as empty"
            );
            Vec::new()
        }
    }
}

fn describe_shape(body: &[u8]) -> &'static str {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Array(_)) => "array",
        Ok(Value::Object(_)) => "object",
        Ok(_) => "scalar",
        Err(_) if body.is_empty() => "empty",
        Err(_) => "invalid",
    }
}
