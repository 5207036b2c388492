//! Error types and diagnostics helpers for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use xenon_config::ConfigError;
use xenon_ipc::{ClientError, PairingCodeError};
use xenon_mounts::EditError;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Daemon(#[from] ClientError),
    #[error("invalid pairing code: {0}")]
    PairingCode(#[from] PairingCodeError),
    #[error("could not update mounts: {0}")]
    Edit(#[from] EditError),
    #[error("exactly one of --path, --bundle, --icloud-bundle or --preset is required")]
    MissingMountTarget,
    #[error("the daemon returned no {what}")]
    EmptyReply { what: &'static str },
    #[error("no bundled license text for '{id}'")]
    UnknownLicense { id: String },
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] io::Error),
}

/// Determines whether an error indicates the daemon is not running.
///
/// Returns true when the connection was refused or the socket is missing,
/// which typically means the daemon process is not listening.
pub(crate) fn is_daemon_not_running(error: &AppError) -> bool {
    match error {
        AppError::Daemon(error) => error.transport().is_not_listening(),
        _ => false,
    }
}
