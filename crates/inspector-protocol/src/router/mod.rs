//! Domain-based routing of inbound events.
//!
//! Each domain has at most one [`DomainDispatcher`]. Routing is strict: an
//! event for a domain without a dispatcher fails with
//! [`ProtocolError::UnknownDomain`], and an event the dispatcher does not
//! handle fails with [`ProtocolError::UnimplementedEvent`]. There is no
//! wildcard matching.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::error::ProtocolError;
use crate::wire::EventMessage;

/// Tracing target for event routing.
pub(crate) const ROUTER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::router");

/// Receives the events of one domain.
pub trait DomainDispatcher {
    /// Returns `true` if `event` has a handler.
    fn handles(&self, event: &str) -> bool;

    /// Delivers an event's payload values in wire order.
    ///
    /// Only called after [`DomainDispatcher::handles`] returned `true`.
    fn dispatch(&mut self, event: &str, payload: &[Value]);
}

impl<D: DomainDispatcher + ?Sized> DomainDispatcher for Rc<RefCell<D>> {
    fn handles(&self, event: &str) -> bool {
        self.borrow().handles(event)
    }

    fn dispatch(&mut self, event: &str, payload: &[Value]) {
        self.borrow_mut().dispatch(event, payload);
    }
}

type EventHandler = Box<dyn FnMut(&[Value])>;

/// Dispatcher built from one closure per event name.
///
/// # Example
///
/// ```
/// use inspector_protocol::{DomainDispatcher, EventDispatcher};
///
/// let dispatcher = EventDispatcher::new().on("resumed", |_payload| {});
/// assert!(dispatcher.handles("resumed"));
/// assert!(!dispatcher.handles("paused"));
/// ```
#[derive(Default)]
pub struct EventDispatcher {
    handlers: HashMap<String, EventHandler>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler, replacing any previous handler for the event.
    #[must_use]
    pub fn on<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&[Value]) + 'static,
    {
        self.insert(event, handler);
        self
    }

    /// Adds a handler in place.
    pub fn insert<F>(&mut self, event: impl Into<String>, handler: F)
    where
        F: FnMut(&[Value]) + 'static,
    {
        self.handlers.insert(event.into(), Box::new(handler));
    }
}

impl DomainDispatcher for EventDispatcher {
    fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    fn dispatch(&mut self, event: &str, payload: &[Value]) {
        if let Some(handler) = self.handlers.get_mut(event) {
            handler(payload);
        }
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        events.sort_unstable();
        formatter
            .debug_struct("EventDispatcher")
            .field("events", &events)
            .finish()
    }
}

/// Routes events to the dispatcher registered for their domain.
#[derive(Default)]
pub struct EventRouter {
    dispatchers: HashMap<String, Box<dyn DomainDispatcher>>,
}

impl EventRouter {
    /// Creates a router with no dispatchers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a domain's dispatcher, returning the one it replaces.
    pub fn register(
        &mut self,
        domain: impl Into<String>,
        dispatcher: Box<dyn DomainDispatcher>,
    ) -> Option<Box<dyn DomainDispatcher>> {
        self.dispatchers.insert(domain.into(), dispatcher)
    }

    /// Removes a domain's dispatcher.
    pub fn unregister(&mut self, domain: &str) -> Option<Box<dyn DomainDispatcher>> {
        self.dispatchers.remove(domain)
    }

    /// Returns `true` if the domain has a dispatcher.
    #[must_use]
    pub fn is_registered(&self, domain: &str) -> bool {
        self.dispatchers.contains_key(domain)
    }

    /// Routes one event.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownDomain`] or
    /// [`ProtocolError::UnimplementedEvent`]; the event is dropped.
    pub fn route(&mut self, event: &EventMessage) -> Result<(), ProtocolError> {
        let Some(dispatcher) = self.dispatchers.get_mut(&event.domain) else {
            return Err(ProtocolError::unknown_domain(&event.domain));
        };
        if !dispatcher.handles(&event.event) {
            return Err(ProtocolError::unimplemented_event(
                &event.domain,
                &event.event,
            ));
        }

        debug!(
            target: ROUTER_TARGET,
            domain = %event.domain,
            event = %event.event,
            "routing event"
        );
        dispatcher.dispatch(&event.event, &event.payload());
        Ok(())
    }
}

impl fmt::Debug for EventRouter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut domains: Vec<&str> = self.dispatchers.keys().map(String::as_str).collect();
        domains.sort_unstable();
        formatter
            .debug_struct("EventRouter")
            .field("domains", &domains)
            .finish()
    }
}
