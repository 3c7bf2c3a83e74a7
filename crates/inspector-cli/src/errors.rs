//! Error types and exit status mapping for the CLI runtime.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use inspector_protocol::{ProtocolError, RegistryError, ReplyError, TransportError};
use thiserror::Error;

use crate::telemetry::TelemetryError;

/// Exit status for rejected calls and backend error replies.
const PROTOCOL_FAILURE: u8 = 1;
/// Exit status for configuration, process, and I/O failures.
const INFRASTRUCTURE_FAILURE: u8 = 2;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to load command catalog: {0}")]
    Registry(#[from] RegistryError),
    #[error("method '{method}' must be written as Domain.command")]
    InvalidMethod { method: String },
    #[error("the catalog has no domain named '{domain}'")]
    UnknownDomain { domain: String },
    #[error("{0}")]
    Protocol(ProtocolError),
    #[error("backend replied with an error: {0}")]
    Reply(ReplyError),
    #[error("failed to start backend '{program}': {source}")]
    Spawn {
        program: String,
        source: Arc<io::Error>,
    },
    #[error("failed to reap backend process: {0}")]
    Reap(io::Error),
    #[error("failed to capture backend {stream}")]
    MissingPipe { stream: &'static str },
    #[error("backend transport failed: {0}")]
    Transport(#[from] TransportError),
    #[error("backend finished without answering the call")]
    MissingReply,
    #[error("failed to serialise reply body: {0}")]
    Serialise(serde_json::Error),
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}

impl AppError {
    pub(crate) fn spawn(program: impl Into<String>, source: io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source: Arc::new(source),
        }
    }

    /// Exit status reported for this failure.
    pub(crate) fn exit_code(&self) -> ExitCode {
        let status = match self {
            Self::CliUsage(_)
            | Self::InvalidMethod { .. }
            | Self::UnknownDomain { .. }
            | Self::Reply(_) => PROTOCOL_FAILURE,
            Self::Protocol(error) if !matches!(error, ProtocolError::Transport { .. }) => {
                PROTOCOL_FAILURE
            }
            Self::Protocol(_)
            | Self::LoadConfiguration(_)
            | Self::Telemetry(_)
            | Self::Registry(_)
            | Self::Spawn { .. }
            | Self::Reap(_)
            | Self::MissingPipe { .. }
            | Self::Transport(_)
            | Self::MissingReply
            | Self::Serialise(_)
            | Self::Write(_) => INFRASTRUCTURE_FAILURE,
        };
        ExitCode::from(status)
    }
}

impl From<ProtocolError> for AppError {
    fn from(error: ProtocolError) -> Self {
        Self::Protocol(error)
    }
}
