//! Command execution.
//!
//! Daemon queries go through a [`DaemonClient`] built from the configured
//! socket and timeouts; mount edits and license lookups work on the local
//! files and only contact the daemon to request a reload.

use std::fmt::Display;
use std::io::Write;

use xenon_config::Config;
use xenon_ipc::{DaemonClient, PairingCode, UnixTransport};
use xenon_licenses::LicenseCatalog;
use xenon_mounts::MountStore;

use crate::cli::CliCommand;
use crate::{AppError, IoStreams};

mod licenses;
mod mounts;

/// Runs `command` against the configured daemon and files.
pub(crate) fn execute<W, E>(
    command: CliCommand,
    config: &Config,
    io: &mut IoStreams<'_, W, E>,
) -> Result<(), AppError>
where
    W: Write,
    E: Write,
{
    let client = DaemonClient::new(UnixTransport::from_config(config));
    match command {
        CliCommand::Mounts { action } => {
            let store = MountStore::new(config.mounts_path());
            mounts::execute(action, &store, &client, io)
        }
        CliCommand::Licenses { text } => {
            let catalog = LicenseCatalog::from_config(config);
            licenses::execute(text.as_deref(), &catalog, io.stdout)
        }
        CliCommand::Bundles => write_lines(io.stdout, &client.list_app_bundles()?),
        CliCommand::IcloudBundles => write_lines(io.stdout, &client.list_icloud_bundles()?),
        CliCommand::Pubkey => write_text(io.stdout, "public key", &client.public_key()?),
        CliCommand::GenerateConfig => write_text(
            io.stdout,
            "client configuration",
            &client.generate_client_config()?,
        ),
        CliCommand::RegenerateKeys => {
            client.regenerate_keys()?;
            write_line(io.stdout, "requested new daemon keys")
        }
        CliCommand::Reload => {
            client.reload_mounts()?;
            write_line(io.stdout, "daemon reloaded its mounts")
        }
        CliCommand::Pair { code } => {
            let code: PairingCode = code.parse()?;
            client.submit_pairing_code(&code)?;
            write_line(io.stdout, "pairing code submitted")
        }
    }
}

pub(super) fn write_line<W: Write>(out: &mut W, line: impl Display) -> Result<(), AppError> {
    writeln!(out, "{line}").map_err(AppError::WriteOutput)
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> Result<(), AppError> {
    lines.iter().try_for_each(|line| write_line(out, line))
}

/// Writes a text reply, treating an empty reply as missing data.
fn write_text<W: Write>(out: &mut W, what: &'static str, text: &str) -> Result<(), AppError> {
    if text.is_empty() {
        return Err(AppError::EmptyReply { what });
    }
    write_block(out, text)
}

/// Writes `text`, adding a final newline when it lacks one.
pub(super) fn write_block<W: Write>(out: &mut W, text: &str) -> Result<(), AppError> {
    out.write_all(text.as_bytes())
        .and_then(|()| {
            if text.ends_with('\n') {
                Ok(())
            } else {
                out.write_all(b"\n")
            }
        })
        .map_err(AppError::WriteOutput)
}
