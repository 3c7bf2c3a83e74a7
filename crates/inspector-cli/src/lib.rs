//! Command-line front end for the inspector protocol client.
//!
//! The runtime splits leading configuration flags off for `ortho_config`,
//! parses the subcommand with clap, installs telemetry, and then either
//! inspects the command catalog or drives a backend process. Configuration
//! loading and the output streams are injectable so tests can run the whole
//! pipeline in process.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

mod backend;
mod cli;
mod commands;
mod config;
mod errors;
pub mod telemetry;

use backend::BackendCommand;
use cli::{Cli, CliCommand};
use commands::{Method, encode, list_catalog, load_registry, parse_arguments};
use config::{ConfigLoader, OrthoConfigLoader, prepare_cli_arguments, split_config_arguments};
pub(crate) use errors::AppError;

/// Runs the CLI using the provided arguments and IO handles.
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
    let argv: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&argv);

    let cli = match Cli::try_parse_from(prepare_cli_arguments(&argv, &split)) {
        Ok(cli) => cli,
        Err(error) if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => return report(stderr, &AppError::CliUsage(error)),
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| {
            let dump_messages = cli.command.dumps_messages() || config.dump_protocol_messages();
            telemetry::initialise(&config, dump_messages)?;
            execute(cli.command, &config, dump_messages, stdout)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => report(stderr, &error),
    }
}

fn execute<W: Write>(
    command: CliCommand,
    config: &inspector_config::Config,
    dump_messages: bool,
    stdout: &mut W,
) -> Result<(), AppError> {
    let registry = load_registry(config)?;
    match command {
        CliCommand::Catalog { domain } => list_catalog(&registry, domain.as_deref(), stdout),
        CliCommand::Encode { method, arguments } => {
            let target = Method::parse(&method)?;
            encode(registry, &target, parse_arguments(&arguments), stdout)
        }
        CliCommand::Call {
            backend,
            backend_args,
            method,
            arguments,
            ..
        } => {
            let target = Method::parse(&method)?;
            let process = BackendCommand {
                program: &backend,
                args: &backend_args,
                dump_messages,
            };
            backend::call(
                config,
                registry,
                &process,
                &target,
                parse_arguments(&arguments),
                stdout,
            )
        }
    }
}

fn report<E: Write>(stderr: &mut E, error: &AppError) -> ExitCode {
    let _ = writeln!(stderr, "{error}");
    error.exit_code()
}
