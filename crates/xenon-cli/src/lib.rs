//! Command-line interface runtime for `xenonctl`.
//!
//! The module owns argument parsing, configuration bootstrapping, telemetry
//! set-up and command dispatch. The runtime is exercised both from the binary
//! entrypoint and from tests where configuration loading and the output
//! streams are substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

mod cli;
mod commands;
mod config;
mod errors;
mod telemetry;

use cli::Cli;
use config::{prepare_cli_arguments, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::{AppError, is_daemon_not_running};

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: This list must be kept in sync with the fields of
/// `xenon_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--daemon-socket",
    "--write-timeout-ms",
    "--read-timeout-ms",
    "--mounts-path",
    "--license-manifest",
    "--license-dir",
    "--log-filter",
    "--log-format",
];

/// Bundles the output streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli = match Cli::try_parse_from(prepare_cli_arguments(&args, &split)) {
            Ok(cli) => cli,
            Err(error) => return self.report_usage(&error),
        };

        let result = self.loader.load(&split.config_arguments).and_then(|config| {
            config.validate()?;
            telemetry::initialise(&config)?;
            commands::execute(cli.command, &config, &mut self.io)
        });

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                self.report_failure(&error);
                ExitCode::FAILURE
            }
        }
    }

    /// Help and version go to stdout and succeed; usage errors fail.
    fn report_usage(&mut self, error: &clap::Error) -> ExitCode {
        let rendered = error.render();
        match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = write!(self.io.stdout, "{rendered}");
                ExitCode::SUCCESS
            }
            _ => {
                let _ = write!(self.io.stderr, "{rendered}");
                ExitCode::FAILURE
            }
        }
    }

    fn report_failure(&mut self, error: &AppError) {
        let _ = writeln!(self.io.stderr, "xenonctl: {error}");
        if is_daemon_not_running(error) {
            let _ = writeln!(
                self.io.stderr,
                "hint: the Xenon daemon does not appear to be running"
            );
        }
    }
}

/// Runs the CLI using the provided arguments and output handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(IoStreams::new(stdout, stderr), loader).run(args)
}

#[cfg(test)]
mod tests;
