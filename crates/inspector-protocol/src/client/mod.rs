//! The dispatch client.
//!
//! [`DispatchClient`] turns command calls into outbound messages, tracks every
//! call awaiting a response, and routes inbound text either to the stored
//! completion of the call it answers or to the domain's event dispatcher.
//!
//! The client is single-threaded. Completions and drain-barrier
//! continuations receive `&mut DispatchClient`, so they can issue follow-up
//! calls. Every failure is reported to the configured [`DiagnosticSink`] and
//! also returned to the caller; none of them panic.
//!
//! Pending calls move from issued to either resolved (a response arrived) or
//! cancelled (the client shut down first). There is no timeout state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::barrier::DrainBarrier;
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::error::ProtocolError;
use crate::registry::{CommandRegistry, DomainFacade};
use crate::router::{DomainDispatcher, EventRouter};
use crate::spec::CommandSpec;
use crate::transport::Transport;
use crate::wire::{CallId, InboundMessage, OutboundMessage, ResponseMessage};

/// Tracing target for client operations.
pub const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::client");

const FRONTEND: &str = "frontend";
const BACKEND: &str = "backend";

/// Continuation run with the reply to one call.
pub type Completion<T> = Box<dyn FnOnce(&mut DispatchClient<T>, Reply)>;

/// Continuation run once no calls are pending.
pub type Continuation<T> = Box<dyn FnOnce(&mut DispatchClient<T>)>;

/// Error slot of a [`Reply`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplyError {
    /// The backend answered with an error payload.
    #[error("backend error: {0}")]
    Backend(Value),

    /// The backend attached protocol errors to the response.
    #[error("protocol errors: {}", .0.join("; "))]
    Protocol(Vec<String>),

    /// The response carried a usable id but could not otherwise be decoded.
    #[error("undecodable response: {0}")]
    Malformed(String),

    /// The client shut down before a response arrived.
    #[error("call cancelled by client shutdown")]
    Cancelled,
}

/// What a completion receives: an error slot and the response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    error: Option<ReplyError>,
    body: Map<String, Value>,
}

impl Reply {
    /// Creates a reply.
    #[must_use]
    pub fn new(error: Option<ReplyError>, body: Map<String, Value>) -> Self {
        Self { error, body }
    }

    /// Reply handed to calls cancelled by shutdown.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(Some(ReplyError::Cancelled), Map::new())
    }

    fn from_response(mut response: ResponseMessage) -> Self {
        let error = if let Some(reason) = response.decode_error.take() {
            Some(ReplyError::Malformed(reason))
        } else if let Some(errors) = response.protocol_errors() {
            Some(ReplyError::Protocol(errors.to_vec()))
        } else {
            response.error.map(ReplyError::Backend)
        };
        Self::new(error, response.body.unwrap_or_default())
    }

    /// The error slot; `None` on success.
    #[must_use]
    pub const fn error(&self) -> Option<&ReplyError> {
        self.error.as_ref()
    }

    /// Returns `true` when the error slot is empty.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Response body keyed by name, in wire order.
    #[must_use]
    pub const fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Response body values in wire order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.body.values().cloned().collect()
    }

    /// Consumes the reply, yielding its body.
    #[must_use]
    pub fn into_body(self) -> Map<String, Value> {
        self.body
    }
}

/// Client behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    dump_messages: bool,
}

impl ClientOptions {
    /// Logs the full text of every message in both directions at `info`.
    #[must_use]
    pub const fn with_dump_messages(mut self, dump_messages: bool) -> Self {
        self.dump_messages = dump_messages;
        self
    }

    /// Whether message text is dumped.
    #[must_use]
    pub const fn dump_messages(&self) -> bool {
        self.dump_messages
    }
}

/// Outcome of delivering one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A pending call was resolved and its completion ran.
    Resolved {
        /// Correlation id of the resolved call.
        id: CallId,
    },
    /// The response matched no pending call and was ignored.
    Orphaned {
        /// Correlation id carried by the response.
        id: CallId,
    },
    /// An event reached its domain's dispatcher.
    Event {
        /// Event domain.
        domain: String,
        /// Event name.
        event: String,
    },
}

/// Asynchronous command/event protocol client.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use inspector_protocol::{CommandRegistry, DispatchClient, FramedWriter};
///
/// let registry = Arc::new(CommandRegistry::builtin().expect("builtin catalog"));
/// let mut client = DispatchClient::new(registry, FramedWriter::new(Vec::new()));
///
/// let id = client
///     .call_command("Network", "enable", Vec::new())
///     .expect("call issued");
/// assert_eq!(id, 1);
/// assert_eq!(client.pending_count(), 1);
///
/// client.on_message(r#"{"requestId":1,"body":{}}"#).expect("response");
/// assert_eq!(client.pending_count(), 0);
/// ```
pub struct DispatchClient<T: Transport> {
    registry: Arc<CommandRegistry>,
    transport: T,
    sink: Box<dyn DiagnosticSink>,
    pending: HashMap<CallId, Completion<T>>,
    next_id: CallId,
    router: EventRouter,
    barrier: DrainBarrier<Continuation<T>>,
    options: ClientOptions,
    closed: bool,
}

impl<T: Transport> DispatchClient<T> {
    /// Creates a client reporting through [`TracingSink`].
    pub fn new(registry: Arc<CommandRegistry>, transport: T) -> Self {
        Self {
            registry,
            transport,
            sink: Box::new(TracingSink),
            pending: HashMap::new(),
            next_id: 1,
            router: EventRouter::new(),
            barrier: DrainBarrier::new(),
            options: ClientOptions::default(),
            closed: false,
        }
    }

    /// Replaces the diagnostic sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replaces the behaviour switches.
    #[must_use]
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// The shared command registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Borrows the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutably borrows the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Number of calls awaiting a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if `id` awaits a response.
    #[must_use]
    pub fn is_pending(&self, id: CallId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Returns `true` once [`DispatchClient::shutdown`] has run.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    /// Builds the façade for a registered domain.
    #[must_use]
    pub fn facade(&self, domain: &str) -> Option<DomainFacade> {
        self.registry.facade(domain)
    }

    // -----------------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------------

    /// Issues a call without a completion.
    ///
    /// # Errors
    ///
    /// As for [`DispatchClient::call_with`].
    pub fn call(&mut self, spec: &CommandSpec, args: Vec<Value>) -> Result<CallId, ProtocolError> {
        self.call_with(spec, args, |_, _| {})
    }

    /// Validates `args` against `spec`, sends the call, and stores
    /// `on_complete` until the response arrives.
    ///
    /// Nothing is sent when validation fails. A failed send rolls the pending
    /// call back.
    ///
    /// # Errors
    ///
    /// Returns the validation error from [`CommandSpec::bind`],
    /// [`ProtocolError::Transport`] if the send failed,
    /// [`ProtocolError::ClientShutdown`] after shutdown, or
    /// [`ProtocolError::IdsExhausted`]. Each is also reported.
    pub fn call_with<F>(
        &mut self,
        spec: &CommandSpec,
        args: Vec<Value>,
        on_complete: F,
    ) -> Result<CallId, ProtocolError>
    where
        F: FnOnce(&mut Self, Reply) + 'static,
    {
        if self.closed {
            return Err(self.reject(ProtocolError::ClientShutdown));
        }
        let arguments = spec.bind(args).map_err(|error| self.reject(error))?;
        let id = self.allocate_id().map_err(|error| self.reject(error))?;
        let text = OutboundMessage::new(spec.domain(), spec.command(), id, arguments)
            .to_text()
            .map_err(|error| self.reject(error))?;

        self.pending.insert(id, Box::new(on_complete));
        self.trace_message(FRONTEND, &text);
        if let Err(source) = self.transport.send(&text) {
            self.pending.remove(&id);
            return Err(self.reject(ProtocolError::transport(id, source)));
        }

        debug!(
            target: CLIENT_TARGET,
            id,
            domain = spec.domain(),
            command = spec.command(),
            pending = self.pending.len(),
            "call issued"
        );
        Ok(id)
    }

    /// Issues a registered command by name without a completion.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownCommand`] if the registry has no such
    /// command, otherwise as for [`DispatchClient::call_with`].
    pub fn call_command(
        &mut self,
        domain: &str,
        command: &str,
        args: Vec<Value>,
    ) -> Result<CallId, ProtocolError> {
        self.call_command_with(domain, command, args, |_, _| {})
    }

    /// Issues a registered command by name.
    ///
    /// # Errors
    ///
    /// As for [`DispatchClient::call_command`].
    pub fn call_command_with<F>(
        &mut self,
        domain: &str,
        command: &str,
        args: Vec<Value>,
        on_complete: F,
    ) -> Result<CallId, ProtocolError>
    where
        F: FnOnce(&mut Self, Reply) + 'static,
    {
        let Some(spec) = self.registry.get(domain, command).map(Arc::clone) else {
            return Err(self.reject(ProtocolError::unknown_command(domain, command)));
        };
        self.call_with(&spec, args, on_complete)
    }

    fn allocate_id(&mut self) -> Result<CallId, ProtocolError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(ProtocolError::IdsExhausted)?;
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Registers the dispatcher for a domain's events, returning the one it
    /// replaces.
    pub fn register_domain_dispatcher(
        &mut self,
        domain: impl Into<String>,
        dispatcher: impl DomainDispatcher + 'static,
    ) -> Option<Box<dyn DomainDispatcher>> {
        self.router.register(domain, Box::new(dispatcher))
    }

    /// Removes a domain's dispatcher.
    pub fn unregister_domain_dispatcher(
        &mut self,
        domain: &str,
    ) -> Option<Box<dyn DomainDispatcher>> {
        self.router.unregister(domain)
    }

    // -----------------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------------

    /// Handles one inbound message given as text.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedMessage`] or
    /// [`ProtocolError::UnclassifiedMessage`] for undecodable text, and
    /// [`ProtocolError::UnknownDomain`] or
    /// [`ProtocolError::UnimplementedEvent`] for unroutable events. Each is
    /// also reported and the message is dropped.
    pub fn on_message(&mut self, text: &str) -> Result<Delivery, ProtocolError> {
        self.trace_message(BACKEND, text);
        let message = InboundMessage::parse(text).map_err(|error| self.reject(error))?;
        self.deliver(message)
    }

    /// Handles one inbound message that is already parsed.
    ///
    /// # Errors
    ///
    /// As for [`DispatchClient::on_message`].
    pub fn on_value(&mut self, value: Value) -> Result<Delivery, ProtocolError> {
        if self.options.dump_messages {
            info!(target: CLIENT_TARGET, direction = BACKEND, "{BACKEND}: {value}");
        }
        let message = InboundMessage::from_value(value).map_err(|error| self.reject(error))?;
        self.deliver(message)
    }

    fn deliver(&mut self, message: InboundMessage) -> Result<Delivery, ProtocolError> {
        match message {
            InboundMessage::Response(response) => Ok(self.resolve(response)),
            InboundMessage::Event(event) => {
                self.router
                    .route(&event)
                    .map_err(|error| self.reject(error))?;
                Ok(Delivery::Event {
                    domain: event.domain,
                    event: event.event,
                })
            }
        }
    }

    fn resolve(&mut self, response: ResponseMessage) -> Delivery {
        let id = response.request_id;
        let Some(completion) = self.pending.remove(&id) else {
            debug!(target: CLIENT_TARGET, id, "ignoring response for unknown call");
            return Delivery::Orphaned { id };
        };

        if let Some(reason) = &response.decode_error {
            self.sink.report(&ProtocolError::malformed(format!(
                "response to call {id}: {reason}"
            )));
        }
        if let Some(errors) = response.protocol_errors() {
            self.sink
                .report(&ProtocolError::response_failed(id, errors.to_vec()));
        }
        completion(self, Reply::from_response(response));
        debug!(
            target: CLIENT_TARGET,
            id,
            pending = self.pending.len(),
            "call resolved"
        );
        self.release_barriers();
        Delivery::Resolved { id }
    }

    // -----------------------------------------------------------------------
    // Barriers and shutdown
    // -----------------------------------------------------------------------

    /// Runs `continuation` once no calls are pending.
    ///
    /// Continuations run in the order they were queued. With nothing pending
    /// the queue is released immediately.
    pub fn drain_barrier<F>(&mut self, continuation: F)
    where
        F: FnOnce(&mut Self) + 'static,
    {
        self.barrier.push(Box::new(continuation));
        self.release_barriers();
    }

    fn release_barriers(&mut self) {
        if !self.pending.is_empty() {
            return;
        }
        for continuation in self.barrier.take_all() {
            continuation(self);
        }
    }

    /// Cancels every pending call in id order, then releases queued
    /// barriers.
    ///
    /// Each cancelled completion receives [`ReplyError::Cancelled`]. Calls
    /// issued afterwards fail with [`ProtocolError::ClientShutdown`].
    /// Repeated calls do nothing.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let mut ids: Vec<CallId> = self.pending.keys().copied().collect();
        ids.sort_unstable();
        debug!(
            target: CLIENT_TARGET,
            cancelled = ids.len(),
            "shutting down dispatch client"
        );
        for id in ids {
            if let Some(completion) = self.pending.remove(&id) {
                completion(self, Reply::cancelled());
            }
        }
        self.release_barriers();
    }

    /// Reports `error` and hands it back for returning.
    pub(crate) fn reject(&mut self, error: ProtocolError) -> ProtocolError {
        self.sink.report(&error);
        error
    }

    fn trace_message(&self, direction: &'static str, text: &str) {
        if self.options.dump_messages {
            info!(target: CLIENT_TARGET, direction, "{direction}: {text}");
        } else {
            debug!(target: CLIENT_TARGET, direction, bytes = text.len(), "message");
        }
    }
}

impl<T: Transport> Drop for DispatchClient<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T: Transport> fmt::Debug for DispatchClient<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DispatchClient")
            .field("commands", &self.registry.len())
            .field("pending", &self.pending.len())
            .field("next_id", &self.next_id)
            .field("router", &self.router)
            .field("barrier", &self.barrier)
            .field("options", &self.options)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
