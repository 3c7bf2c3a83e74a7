//! Versioned command catalogs.
//!
//! A catalog is a JSON document listing every command the backend accepts:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "commands": [
//!     {"domain": "DOM", "command": "removeNode",
//!      "arguments": [{"name": "nodeId", "type": "number"}]}
//!   ]
//! }
//! ```
//!
//! The Inspector command table ships embedded in the crate; deployments may
//! point at an external file instead.

use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::CommandSpec;

const BUILTIN_CATALOG: &str = include_str!("../catalog/inspector.json");

/// Errors raised while loading a catalog.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog '{path}': {source}")]
    Read {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The catalog text is not a valid catalog document.
    #[error("failed to parse catalog: {0}")]
    Parse(#[source] Arc<serde_json::Error>),
}

/// A versioned table of command shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    version: String,
    commands: Vec<CommandSpec>,
}

impl Catalog {
    /// Creates a catalog from its parts.
    pub fn new(version: impl Into<String>, commands: Vec<CommandSpec>) -> Self {
        Self {
            version: version.into(),
            commands,
        }
    }

    /// The embedded Inspector catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the embedded document is corrupt.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parses a catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] on invalid JSON or shape.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(text).map_err(|source| CatalogError::Parse(Arc::new(source)))
    }

    /// Reads and parses a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Read`] if the file cannot be read and
    /// [`CatalogError::Parse`] if its contents are invalid.
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        Self::from_json(&text)
    }

    /// Catalog version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Command shapes in document order.
    #[must_use]
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// Consumes the catalog, yielding its command shapes.
    #[must_use]
    pub fn into_commands(self) -> Vec<CommandSpec> {
        self.commands
    }
}
