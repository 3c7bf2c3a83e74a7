//! Command registry and per-domain façades.
//!
//! The [`CommandRegistry`] holds every known [`CommandSpec`] keyed by domain
//! and command name. It is built once at startup, usually from a
//! [`Catalog`], and shared with the client behind an `Arc`. Duplicate
//! registrations for the same `(domain, command)` pair are rejected.
//!
//! A [`DomainFacade`] is the callable view of one domain: one
//! [`CommandHandle`] per registered command, each bound to its spec.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{Catalog, CatalogError};
use crate::client::{DispatchClient, Reply};
use crate::error::ProtocolError;
use crate::spec::CommandSpec;
use crate::transport::Transport;
use crate::wire::CallId;

/// Tracing target for registry operations.
pub(crate) const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Registry of command shapes keyed by domain and command name.
///
/// # Example
///
/// ```
/// use inspector_protocol::{ArgSpec, ArgType, CommandRegistry, CommandSpec};
///
/// let mut registry = CommandRegistry::new();
/// registry
///     .register(CommandSpec::new(
///         "DOM",
///         "removeNode",
///         [ArgSpec::new("nodeId", ArgType::Number)],
///     ))
///     .expect("registration succeeds");
/// assert!(registry.get("DOM", "removeNode").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    domains: HashMap<String, BTreeMap<String, Arc<CommandSpec>>>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated from the embedded Inspector catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the embedded catalog is corrupt or lists
    /// a command twice.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_catalog(Catalog::builtin()?)
    }

    /// Creates a registry populated from a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if the catalog lists a command
    /// twice.
    pub fn from_catalog(catalog: Catalog) -> Result<Self, RegistryError> {
        let version = catalog.version().to_owned();
        let mut registry = Self::new();
        for spec in catalog.into_commands() {
            registry.register(spec).map_err(RegistryError::Duplicate)?;
        }
        debug!(
            target: REGISTRY_TARGET,
            version = %version,
            commands = registry.len(),
            "command catalog loaded"
        );
        Ok(registry)
    }

    /// Registers a command shape.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::DuplicateCommand`] if the pair is already
    /// registered; the existing entry is kept.
    pub fn register(&mut self, spec: CommandSpec) -> Result<Arc<CommandSpec>, ProtocolError> {
        let commands = self.domains.entry(spec.domain().to_owned()).or_default();
        if commands.contains_key(spec.command()) {
            warn!(
                target: REGISTRY_TARGET,
                domain = spec.domain(),
                command = spec.command(),
                "rejecting duplicate command registration"
            );
            return Err(ProtocolError::duplicate_command(
                spec.domain(),
                spec.command(),
            ));
        }
        let spec = Arc::new(spec);
        commands.insert(spec.command().to_owned(), Arc::clone(&spec));
        Ok(spec)
    }

    /// Looks up one command.
    #[must_use]
    pub fn get(&self, domain: &str, command: &str) -> Option<&Arc<CommandSpec>> {
        self.domains.get(domain)?.get(command)
    }

    /// Builds the façade for a domain, or `None` if it has no commands.
    #[must_use]
    pub fn facade(&self, domain: &str) -> Option<DomainFacade> {
        let commands = self.domains.get(domain)?;
        Some(DomainFacade {
            domain: domain.to_owned(),
            commands: commands
                .iter()
                .map(|(name, spec)| {
                    (
                        name.clone(),
                        CommandHandle {
                            spec: Arc::clone(spec),
                        },
                    )
                })
                .collect(),
        })
    }

    /// Registered domain names, sorted.
    #[must_use]
    pub fn domains(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.domains.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Command shapes of one domain, sorted by command name.
    #[must_use]
    pub fn commands_in(&self, domain: &str) -> Vec<&Arc<CommandSpec>> {
        self.domains
            .get(domain)
            .map(|commands| commands.values().collect())
            .unwrap_or_default()
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` when no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors raised while building a registry from a catalog.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The catalog lists a command twice.
    #[error(transparent)]
    Duplicate(ProtocolError),
}

/// Callable view of one domain.
#[derive(Debug, Clone)]
pub struct DomainFacade {
    domain: String,
    commands: BTreeMap<String, CommandHandle>,
}

impl DomainFacade {
    /// Domain name.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Looks up the handle for one command.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&CommandHandle> {
        self.commands.get(name)
    }

    /// Handles for every command of the domain, sorted by name.
    pub fn commands(&self) -> impl Iterator<Item = &CommandHandle> {
        self.commands.values()
    }

    /// Calls a command by name without a completion.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownCommand`] if the domain has no such
    /// command, or any error [`DispatchClient::call`] returns. Every error is
    /// also reported to the client's sink.
    pub fn invoke<T: Transport>(
        &self,
        client: &mut DispatchClient<T>,
        name: &str,
        args: Vec<Value>,
    ) -> Result<CallId, ProtocolError> {
        self.invoke_with(client, name, args, |_, _| {})
    }

    /// Calls a command by name, running `on_complete` with the reply.
    ///
    /// # Errors
    ///
    /// As for [`DomainFacade::invoke`].
    pub fn invoke_with<T, F>(
        &self,
        client: &mut DispatchClient<T>,
        name: &str,
        args: Vec<Value>,
        on_complete: F,
    ) -> Result<CallId, ProtocolError>
    where
        T: Transport,
        F: FnOnce(&mut DispatchClient<T>, Reply) + 'static,
    {
        match self.commands.get(name) {
            Some(handle) => handle.call_with(client, args, on_complete),
            None => Err(client.reject(ProtocolError::unknown_command(&self.domain, name))),
        }
    }
}

/// One invocable command entry bound to its spec.
#[derive(Debug, Clone)]
pub struct CommandHandle {
    spec: Arc<CommandSpec>,
}

impl CommandHandle {
    /// The bound command shape.
    #[must_use]
    pub fn spec(&self) -> &Arc<CommandSpec> {
        &self.spec
    }

    /// Issues the command without a completion.
    ///
    /// # Errors
    ///
    /// As for [`DispatchClient::call`].
    pub fn call<T: Transport>(
        &self,
        client: &mut DispatchClient<T>,
        args: Vec<Value>,
    ) -> Result<CallId, ProtocolError> {
        client.call(&self.spec, args)
    }

    /// Issues the command, running `on_complete` with the reply.
    ///
    /// # Errors
    ///
    /// As for [`DispatchClient::call`].
    pub fn call_with<T, F>(
        &self,
        client: &mut DispatchClient<T>,
        args: Vec<Value>,
        on_complete: F,
    ) -> Result<CallId, ProtocolError>
    where
        T: Transport,
        F: FnOnce(&mut DispatchClient<T>, Reply) + 'static,
    {
        client.call_with(&self.spec, args, on_complete)
    }
}
