//! CLI entrypoint for `xenonctl`.
//!
//! The binary delegates to [`xenon_cli::run`], which loads configuration,
//! parses the command line and talks to the daemon or the local stores.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    xenon_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
