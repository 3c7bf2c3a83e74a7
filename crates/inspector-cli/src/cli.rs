//! CLI argument definitions for the inspector tool.

use clap::{Parser, Subcommand};

/// Command-line interface for exercising inspector protocol backends.
#[derive(Parser, Debug)]
#[command(name = "inspector", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations offered by the CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Lists catalog commands with their argument types.
    Catalog {
        /// Restricts the listing to one domain.
        #[arg(long)]
        domain: Option<String>,
    },
    /// Validates a call and prints the message it would send.
    Encode {
        /// Command to encode, written as `Domain.command`.
        #[arg(value_name = "METHOD")]
        method: String,
        /// Positional arguments as JSON literals; bare words are strings.
        #[arg(
            value_name = "ARG",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        arguments: Vec<String>,
    },
    /// Sends one call to a spawned backend and prints the response body.
    Call {
        /// Backend program speaking `Content-Length` framed messages on stdio.
        #[arg(long, value_name = "PROGRAM")]
        backend: String,
        /// Argument passed to the backend program; repeatable.
        #[arg(long = "arg", value_name = "BACKEND_ARG", allow_hyphen_values = true)]
        backend_args: Vec<String>,
        /// Logs every message exchanged with the backend.
        #[arg(long)]
        dump_protocol_messages: bool,
        /// Command to call, written as `Domain.command`.
        #[arg(value_name = "METHOD")]
        method: String,
        /// Positional arguments as JSON literals; bare words are strings.
        #[arg(
            value_name = "ARG",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        arguments: Vec<String>,
    },
}

impl CliCommand {
    /// Whether the command line asked for message dumps.
    pub(crate) const fn dumps_messages(&self) -> bool {
        matches!(
            self,
            Self::Call {
                dump_protocol_messages: true,
                ..
            }
        )
    }
}
