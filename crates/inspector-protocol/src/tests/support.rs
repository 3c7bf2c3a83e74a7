//! Shared fixtures for client tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value;

use crate::client::{DispatchClient, Reply};
use crate::diagnostics::RecordingSink;
use crate::error::TransportError;
use crate::registry::CommandRegistry;
use crate::spec::{ArgSpec, ArgType, CommandSpec};
use crate::transport::Transport;

/// Transport that keeps every sent message.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    sent: Vec<String>,
}

impl RecordingTransport {
    pub(crate) fn sent(&self) -> &[String] {
        &self.sent
    }

    pub(crate) fn sent_values(&self) -> Vec<Value> {
        self.sent
            .iter()
            .map(|text| serde_json::from_str(text).expect("sent text is JSON"))
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, message: &str) -> Result<(), TransportError> {
        self.sent.push(message.to_owned());
        Ok(())
    }
}

/// Replies observed by completions, in arrival order.
pub(crate) type Replies = Rc<RefCell<Vec<Reply>>>;

/// Wraps a payload in a `Content-Length` frame.
pub(crate) fn frame(payload: &str) -> String {
    format!("Content-Length: {}\r\n\r\n{payload}", payload.len())
}

/// Small registry covering each argument type.
pub(crate) fn sample_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    let specs = [
        CommandSpec::new("Network", "enable", []),
        CommandSpec::new(
            "DOM",
            "setAttribute",
            [
                ArgSpec::new("elementId", ArgType::Number),
                ArgSpec::new("name", ArgType::String),
                ArgSpec::new("value", ArgType::String),
            ],
        ),
        CommandSpec::new(
            "Debugger",
            "setBreakpointsActive",
            [ArgSpec::new("active", ArgType::Boolean)],
        ),
        CommandSpec::new(
            "Runtime",
            "releaseObject",
            [ArgSpec::new("objectId", ArgType::Object)],
        ),
    ];
    for spec in specs {
        registry.register(spec).expect("register sample command");
    }
    registry
}

/// Client over [`sample_registry`] with a recording transport and sink.
pub(crate) fn recording_client() -> (DispatchClient<RecordingTransport>, RecordingSink) {
    let sink = RecordingSink::new();
    let client = DispatchClient::new(Arc::new(sample_registry()), RecordingTransport::default())
        .with_sink(sink.clone());
    (client, sink)
}

/// Completion that records its reply into `replies`.
pub(crate) fn record_into<T: Transport + 'static>(
    replies: &Replies,
) -> impl FnOnce(&mut DispatchClient<T>, Reply) + 'static {
    let replies = Rc::clone(replies);
    move |_, reply| replies.borrow_mut().push(reply)
}
