//! Error types for the protocol client.
//!
//! Every failure the client can observe is a [`ProtocolError`] variant with
//! structured context. None of them abort the process: the client reports
//! each one to its [`DiagnosticSink`](crate::DiagnosticSink) and returns it to
//! the caller. I/O and serde errors are held in `Arc` so reports can be cloned
//! into recording sinks.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::spec::ArgType;
use crate::wire::CallId;

/// Errors surfaced while issuing calls or routing inbound messages.
#[derive(Debug, Clone, Error)]
pub enum ProtocolError {
    /// Fewer argument values were supplied than the command declares.
    #[error(
        "invalid number of arguments for '{command}' call; it should have the arguments {expected}"
    )]
    MissingArgument {
        /// Qualified command name (`Domain.command`).
        command: String,
        /// Declared argument list, rendered for humans.
        expected: String,
    },

    /// An argument value has the wrong runtime type.
    #[error(
        "invalid type of argument '{argument}' for '{command}' call; it should be '{expected}' but it is '{actual}'"
    )]
    InvalidArgumentType {
        /// Qualified command name.
        command: String,
        /// Name of the offending argument.
        argument: String,
        /// Declared type.
        expected: ArgType,
        /// Runtime type of the supplied value.
        actual: ArgType,
    },

    /// Values were supplied beyond the declared arguments.
    #[error("unexpected trailing argument for '{command}' call; {count} extra value(s) supplied")]
    UnexpectedArgument {
        /// Qualified command name.
        command: String,
        /// Number of surplus values.
        count: usize,
    },

    /// A command was invoked by name but never registered.
    #[error("command '{domain}.{command}' is not registered")]
    UnknownCommand {
        /// Domain that was looked up.
        domain: String,
        /// Command that was looked up.
        command: String,
    },

    /// A command was registered twice for the same domain.
    #[error("command '{domain}.{command}' is already registered")]
    DuplicateCommand {
        /// Domain of the duplicate.
        domain: String,
        /// Command name of the duplicate.
        command: String,
    },

    /// The backend attached protocol errors to a response.
    #[error("request with id = {request_id} failed: {}", .errors.join("; "))]
    ResponseFailed {
        /// Correlation id of the failed request.
        request_id: CallId,
        /// Error texts reported by the backend.
        errors: Vec<String>,
    },

    /// An event named a domain without a registered dispatcher.
    #[error("the message is for non-existing domain '{domain}'")]
    UnknownDomain {
        /// Domain named by the event.
        domain: String,
    },

    /// An event named an event the domain's dispatcher does not handle.
    #[error("attempted to dispatch an unimplemented method '{domain}.{event}'")]
    UnimplementedEvent {
        /// Domain named by the event.
        domain: String,
        /// Event name.
        event: String,
    },

    /// Inbound text could not be decoded.
    #[error("malformed message: {message}")]
    MalformedMessage {
        /// Description of the decode failure.
        message: String,
        /// Underlying JSON error, if any.
        #[source]
        source: Option<Arc<serde_json::Error>>,
    },

    /// The message is neither a response nor an event.
    #[error("message carries neither 'requestId' nor type 'event'")]
    UnclassifiedMessage,

    /// The outbound message could not be serialised.
    #[error("failed to serialise outbound message: {0}")]
    Serialize(#[source] Arc<serde_json::Error>),

    /// The transport rejected an outbound message.
    #[error("transport failed to deliver call {id}: {source}")]
    Transport {
        /// Correlation id that was rolled back.
        id: CallId,
        /// Underlying transport failure.
        #[source]
        source: TransportError,
    },

    /// The correlation id space is exhausted.
    #[error("correlation ids exhausted")]
    IdsExhausted,

    /// A call was issued after the client was shut down.
    #[error("the client has been shut down")]
    ClientShutdown,
}

impl ProtocolError {
    /// Returns `true` for errors raised while validating a call.
    #[must_use]
    pub const fn is_malformed_call(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. }
                | Self::InvalidArgumentType { .. }
                | Self::UnexpectedArgument { .. }
        )
    }

    /// Short stable label used as a structured logging field.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MissingArgument { .. } => "missing_argument",
            Self::InvalidArgumentType { .. } => "invalid_argument_type",
            Self::UnexpectedArgument { .. } => "unexpected_argument",
            Self::UnknownCommand { .. } => "unknown_command",
            Self::DuplicateCommand { .. } => "duplicate_command",
            Self::ResponseFailed { .. } => "response_failed",
            Self::UnknownDomain { .. } => "unknown_domain",
            Self::UnimplementedEvent { .. } => "unimplemented_event",
            Self::MalformedMessage { .. } => "malformed_message",
            Self::UnclassifiedMessage => "unclassified_message",
            Self::Serialize(_) => "serialize",
            Self::Transport { .. } => "transport",
            Self::IdsExhausted => "ids_exhausted",
            Self::ClientShutdown => "client_shutdown",
        }
    }

    /// Creates a missing argument error.
    pub fn missing_argument(command: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::MissingArgument {
            command: command.into(),
            expected: expected.into(),
        }
    }

    /// Creates an invalid argument type error.
    pub fn invalid_argument_type(
        command: impl Into<String>,
        argument: impl Into<String>,
        expected: ArgType,
        actual: ArgType,
    ) -> Self {
        Self::InvalidArgumentType {
            command: command.into(),
            argument: argument.into(),
            expected,
            actual,
        }
    }

    /// Creates an unexpected trailing argument error.
    pub fn unexpected_argument(command: impl Into<String>, count: usize) -> Self {
        Self::UnexpectedArgument {
            command: command.into(),
            count,
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(domain: impl Into<String>, command: impl Into<String>) -> Self {
        Self::UnknownCommand {
            domain: domain.into(),
            command: command.into(),
        }
    }

    /// Creates a duplicate registration error.
    pub fn duplicate_command(domain: impl Into<String>, command: impl Into<String>) -> Self {
        Self::DuplicateCommand {
            domain: domain.into(),
            command: command.into(),
        }
    }

    /// Creates a response failure from the backend's error list.
    #[must_use]
    pub const fn response_failed(request_id: CallId, errors: Vec<String>) -> Self {
        Self::ResponseFailed { request_id, errors }
    }

    /// Creates an unknown domain error.
    pub fn unknown_domain(domain: impl Into<String>) -> Self {
        Self::UnknownDomain {
            domain: domain.into(),
        }
    }

    /// Creates an unimplemented event error.
    pub fn unimplemented_event(domain: impl Into<String>, event: impl Into<String>) -> Self {
        Self::UnimplementedEvent {
            domain: domain.into(),
            event: event.into(),
        }
    }

    /// Creates a malformed message error from a serde failure.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedMessage {
            message: source.to_string(),
            source: Some(Arc::new(source)),
        }
    }

    /// Creates a malformed message error with a custom description.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMessage {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a serialisation error.
    #[must_use]
    pub fn serialize(source: serde_json::Error) -> Self {
        Self::Serialize(Arc::new(source))
    }

    /// Creates a transport error for a rolled-back call.
    #[must_use]
    pub const fn transport(id: CallId, source: TransportError) -> Self {
        Self::Transport { id, source }
    }
}

/// Failures raised by transports while moving message text.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[source] Arc<io::Error>),

    /// A frame arrived without a `Content-Length` header.
    #[error("missing Content-Length header")]
    MissingContentLength,

    /// A header line could not be parsed.
    #[error("invalid header format")]
    InvalidHeader,

    /// A frame payload is not valid UTF-8.
    #[error("message payload is not valid UTF-8")]
    InvalidUtf8,

    /// The peer closed the stream between frames.
    #[error("connection closed")]
    Closed,

    /// No message arrived within the allowed time.
    #[error("no message received within {timeout:?}")]
    Timeout {
        /// Timeout that elapsed.
        timeout: Duration,
    },
}

impl From<io::Error> for TransportError {
    fn from(error: io::Error) -> Self {
        Self::Io(Arc::new(error))
    }
}

#[cfg(test)]
mod tests;
