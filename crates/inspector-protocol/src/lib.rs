//! Asynchronous command/event protocol client.
//!
//! The `inspector-protocol` crate talks to a backend that accepts
//! JSON-encoded commands and emits JSON-encoded responses and events over a
//! single message channel, in the style of the Web Inspector backend
//! protocol.
//!
//! # Architecture
//!
//! - A [`CommandRegistry`] holds the argument shape of every command, usually
//!   loaded once from a versioned [`Catalog`]. Per-domain [`DomainFacade`]s
//!   expose one callable [`CommandHandle`] per command.
//! - The [`DispatchClient`] validates each call, assigns a correlation id,
//!   stores the completion, and hands the message to a [`Transport`]. Inbound
//!   text is classified as a response, which resolves its pending call, or an
//!   event, which the [`EventRouter`] forwards to the domain's
//!   [`DomainDispatcher`].
//! - A drain barrier runs continuations once no calls are pending.
//! - Failures are reported to a [`DiagnosticSink`] and returned as
//!   [`ProtocolError`]s.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use std::sync::Arc;
//!
//! use inspector_protocol::{CommandRegistry, DispatchClient, FramedWriter};
//! use serde_json::json;
//!
//! let registry = Arc::new(CommandRegistry::builtin().expect("builtin catalog"));
//! let mut client = DispatchClient::new(registry, FramedWriter::new(Vec::new()));
//! let drained = Rc::new(RefCell::new(false));
//!
//! client
//!     .call_command("DOM", "setAttribute", vec![json!(7), json!("class"), json!("x")])
//!     .expect("call issued");
//! let flag = Rc::clone(&drained);
//! client.drain_barrier(move |_| *flag.borrow_mut() = true);
//! assert!(!*drained.borrow());
//!
//! client.on_message(r#"{"requestId":1}"#).expect("response");
//! assert!(*drained.borrow());
//! ```

pub mod barrier;
pub mod catalog;
pub mod client;
pub mod diagnostics;
pub mod error;
pub mod registry;
pub mod router;
pub mod spec;
pub mod transport;
pub mod wire;

#[cfg(test)]
mod tests;

pub use self::barrier::DrainBarrier;
pub use self::catalog::{Catalog, CatalogError};
pub use self::client::{
    CLIENT_TARGET, ClientOptions, Completion, Continuation, Delivery, DispatchClient, Reply,
    ReplyError,
};
pub use self::diagnostics::{DIAGNOSTICS_TARGET, DiagnosticSink, RecordingSink, TracingSink};
pub use self::error::{ProtocolError, TransportError};
pub use self::registry::{CommandHandle, CommandRegistry, DomainFacade, RegistryError};
pub use self::router::{DomainDispatcher, EventDispatcher, EventRouter};
pub use self::spec::{ArgSpec, ArgType, CommandSpec};
pub use self::transport::{
    FrameReader, FramedWriter, InboundQueue, InboundSender, MAX_FRAME_LEN, Transport,
};
pub use self::wire::{CallId, EventMessage, InboundMessage, OutboundMessage, ResponseMessage};
