//! CLI entrypoint for the inspector protocol tool.
//!
//! The binary delegates to [`inspector_cli::run`], which loads configuration,
//! installs telemetry, and executes the requested subcommand.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    inspector_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}
