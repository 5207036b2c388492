//! Shared configuration for the Xenon preferences tooling.
//!
//! Values are layered by `ortho_config`: built-in defaults, then an optional
//! configuration file (`--config-path` or `XENON_CONFIG_PATH`), then
//! `XENON_*` environment variables, then command-line flags. Both the
//! command-line tool and its tests resolve paths and timeouts through
//! [`Config`] so nothing else hard-codes the well-known locations.

mod defaults;
mod logging;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_DAEMON_SOCKET, DEFAULT_IO_TIMEOUT_MS, DEFAULT_LICENSE_DIR, DEFAULT_LICENSE_MANIFEST,
    DEFAULT_LOG_FILTER, DEFAULT_MOUNTS_PATH, default_daemon_socket, default_license_dir,
    default_license_manifest, default_log_filter, default_log_filter_string, default_log_format,
    default_mounts_path,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for clients of the Xenon daemon.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "XENON")]
pub struct Config {
    /// Path of the daemon's Unix domain socket.
    #[ortho_config(default = crate::defaults::default_daemon_socket())]
    pub daemon_socket: Utf8PathBuf,
    /// Bound on writing a request, in milliseconds.
    #[ortho_config(default = crate::defaults::DEFAULT_IO_TIMEOUT_MS)]
    pub write_timeout_ms: u64,
    /// Bound on reading a response, in milliseconds.
    #[ortho_config(default = crate::defaults::DEFAULT_IO_TIMEOUT_MS)]
    pub read_timeout_ms: u64,
    /// Path of the persisted mount table.
    #[ortho_config(default = crate::defaults::default_mounts_path())]
    pub mounts_path: Utf8PathBuf,
    /// Path of the bundled dependency manifest.
    #[ortho_config(default = crate::defaults::default_license_manifest())]
    pub license_manifest: Utf8PathBuf,
    /// Directory holding bundled license texts.
    #[ortho_config(default = crate::defaults::default_license_dir())]
    pub license_dir: Utf8PathBuf,
    /// `tracing` filter expression.
    #[ortho_config(default = crate::defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log events.
    #[ortho_config(default = crate::defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_socket: default_daemon_socket(),
            write_timeout_ms: DEFAULT_IO_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_IO_TIMEOUT_MS,
            mounts_path: default_mounts_path(),
            license_manifest: default_license_manifest(),
            license_dir: default_license_dir(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Path of the daemon socket.
    #[must_use]
    pub fn daemon_socket(&self) -> &Utf8Path {
        &self.daemon_socket
    }

    /// Bound on writing a request to the daemon.
    #[must_use]
    pub const fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Bound on reading a response from the daemon.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Path of the persisted mount table.
    #[must_use]
    pub fn mounts_path(&self) -> &Utf8Path {
        &self.mounts_path
    }

    /// Path of the dependency manifest.
    #[must_use]
    pub fn license_manifest(&self) -> &Utf8Path {
        &self.license_manifest
    }

    /// Directory of license texts.
    #[must_use]
    pub fn license_dir(&self) -> &Utf8Path {
        &self.license_dir
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Rejects values that would disable a bound the transport relies on.
    ///
    /// A zero socket timeout means "block forever" to the operating system,
    /// so both timeouts must be positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] naming the first timeout field
    /// that is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout { field: "write_timeout_ms" });
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout { field: "read_timeout_ms" });
        }
        Ok(())
    }
}

/// Errors raised by [`Config::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A timeout was configured as zero.
    #[error("{field} must be greater than zero")]
    ZeroTimeout {
        /// Name of the offending setting.
        field: &'static str,
    },
}
