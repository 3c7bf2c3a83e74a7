//! Command shapes and argument validation.
//!
//! A [`CommandSpec`] names one command of one domain and lists its arguments
//! in declaration order, each tagged with an [`ArgType`]. Binding positional
//! values against a spec produces the ordered argument map that goes on the
//! wire, or the [`ProtocolError`] describing why the call is malformed.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Primitive type tag for a command argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON object, array, or null.
    Object,
    /// Untyped slot; accepts any value.
    #[default]
    #[serde(alias = "")]
    Any,
}

impl ArgType {
    /// Runtime tag of a value. Arrays and null report as [`ArgType::Object`].
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null | Value::Array(_) | Value::Object(_) => Self::Object,
        }
    }

    /// Returns `true` when `value` may fill a slot of this type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            expected => Self::of(value) == expected,
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// One declared argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSpec {
    name: String,
    #[serde(rename = "type", default)]
    ty: ArgType,
}

impl ArgSpec {
    /// Creates an argument declaration.
    pub fn new(name: impl Into<String>, ty: ArgType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Argument name as it appears on the wire.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Declared type.
    #[must_use]
    pub const fn ty(&self) -> ArgType {
        self.ty
    }
}

/// Shape of one command: its domain, name, and ordered arguments.
///
/// # Example
///
/// ```
/// use inspector_protocol::{ArgSpec, ArgType, CommandSpec};
/// use serde_json::json;
///
/// let spec = CommandSpec::new(
///     "DOM",
///     "setAttribute",
///     [
///         ArgSpec::new("elementId", ArgType::Number),
///         ArgSpec::new("name", ArgType::String),
///         ArgSpec::new("value", ArgType::String),
///     ],
/// );
/// let arguments = spec
///     .bind(vec![json!(7), json!("class"), json!("x")])
///     .expect("well-formed call");
/// let names: Vec<&str> = arguments.keys().map(String::as_str).collect();
/// assert_eq!(names, ["elementId", "name", "value"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    domain: String,
    command: String,
    #[serde(default)]
    arguments: Vec<ArgSpec>,
}

impl CommandSpec {
    /// Creates a command shape.
    pub fn new(
        domain: impl Into<String>,
        command: impl Into<String>,
        arguments: impl IntoIterator<Item = ArgSpec>,
    ) -> Self {
        Self {
            domain: domain.into(),
            command: command.into(),
            arguments: arguments.into_iter().collect(),
        }
    }

    /// Domain the command belongs to.
    #[must_use]
    pub const fn domain(&self) -> &str {
        self.domain.as_str()
    }

    /// Command name within the domain.
    #[must_use]
    pub const fn command(&self) -> &str {
        self.command.as_str()
    }

    /// Declared arguments in order.
    #[must_use]
    pub fn arguments(&self) -> &[ArgSpec] {
        &self.arguments
    }

    /// `Domain.command`, used in diagnostics.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.domain, self.command)
    }

    /// Renders the declared arguments as `name: type, ...`.
    #[must_use]
    pub fn signature(&self) -> String {
        let parts: Vec<String> = self
            .arguments
            .iter()
            .map(|arg| format!("{}: {}", arg.name, arg.ty))
            .collect();
        format!("({})", parts.join(", "))
    }

    /// Pairs positional values with the declared arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingArgument`] when fewer values than
    /// declared arguments are supplied, [`ProtocolError::InvalidArgumentType`]
    /// when a value does not match its slot, and
    /// [`ProtocolError::UnexpectedArgument`] when surplus values remain.
    pub fn bind(&self, values: Vec<Value>) -> Result<Map<String, Value>, ProtocolError> {
        let mut supplied = values.into_iter();
        let mut bound = Map::with_capacity(self.arguments.len());

        for arg in &self.arguments {
            let Some(value) = supplied.next() else {
                return Err(ProtocolError::missing_argument(
                    self.qualified_name(),
                    self.signature(),
                ));
            };
            if !arg.ty.accepts(&value) {
                return Err(ProtocolError::invalid_argument_type(
                    self.qualified_name(),
                    arg.name.as_str(),
                    arg.ty,
                    ArgType::of(&value),
                ));
            }
            bound.insert(arg.name.clone(), value);
        }

        let surplus = supplied.count();
        if surplus > 0 {
            return Err(ProtocolError::unexpected_argument(
                self.qualified_name(),
                surplus,
            ));
        }
        Ok(bound)
    }
}
